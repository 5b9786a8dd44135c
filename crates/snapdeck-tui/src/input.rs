//! Translation of terminal input into deck actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use snapdeck_core::Key;

/// Phase of a pointer drag emulating a touch gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    /// Arrow navigation handled by the engine
    Key(Key),
    /// Wheel notch in engine units
    Wheel { delta_x: f64, delta_y: f64 },
    /// Left-button drag, position in terminal cells
    Touch { phase: TouchPhase, column: u16, row: u16 },
    /// Jump back to the first slide
    Home,
    /// Leave the deck as if it had been traversed
    End,
    ToggleHelp,
    None,
}

pub fn handle_key_event(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::PageDown | KeyCode::Char(' ') => {
            Action::Key(Key::ArrowDown)
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::PageUp => Action::Key(Key::ArrowUp),
        KeyCode::Right | KeyCode::Char('l') => Action::Key(Key::ArrowRight),
        KeyCode::Left | KeyCode::Char('h') => Action::Key(Key::ArrowLeft),
        KeyCode::Home | KeyCode::Char('g') => Action::Home,
        KeyCode::End | KeyCode::Char('G') => Action::End,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

/// `wheel_delta` is the engine-unit delta of one wheel notch
pub fn handle_mouse_event(mouse: MouseEvent, wheel_delta: f64) -> Action {
    let touch = |phase| Action::Touch {
        phase,
        column: mouse.column,
        row: mouse.row,
    };

    match mouse.kind {
        MouseEventKind::ScrollDown => Action::Wheel {
            delta_x: 0.0,
            delta_y: wheel_delta,
        },
        MouseEventKind::ScrollUp => Action::Wheel {
            delta_x: 0.0,
            delta_y: -wheel_delta,
        },
        MouseEventKind::ScrollRight => Action::Wheel {
            delta_x: wheel_delta,
            delta_y: 0.0,
        },
        MouseEventKind::ScrollLeft => Action::Wheel {
            delta_x: -wheel_delta,
            delta_y: 0.0,
        },
        MouseEventKind::Down(MouseButton::Left) => touch(TouchPhase::Start),
        MouseEventKind::Drag(MouseButton::Left) => touch(TouchPhase::Move),
        MouseEventKind::Up(MouseButton::Left) => touch(TouchPhase::End),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(handle_key_event(key(KeyCode::Char('j'))), Action::Key(Key::ArrowDown));
        assert_eq!(handle_key_event(key(KeyCode::Up)), Action::Key(Key::ArrowUp));
        assert_eq!(handle_key_event(key(KeyCode::Char('l'))), Action::Key(Key::ArrowRight));
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(handle_key_event(key(KeyCode::Char('x'))), Action::None);
    }

    #[test]
    fn test_wheel_mapping() {
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::ScrollDown), 100.0),
            Action::Wheel { delta_x: 0.0, delta_y: 100.0 }
        );
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::ScrollLeft), 100.0),
            Action::Wheel { delta_x: -100.0, delta_y: 0.0 }
        );
    }

    #[test]
    fn test_drag_maps_to_touch() {
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left)), 100.0),
            Action::Touch { phase: TouchPhase::Move, column: 12, row: 7 }
        );
        assert_eq!(
            handle_mouse_event(mouse(MouseEventKind::Moved), 100.0),
            Action::None
        );
    }
}
