use std::sync::Arc;
use std::time::{Duration, Instant};

use snapdeck_core::geometry::WidthSource;
use snapdeck_core::{
    layout, AppConfig, EngineEvent, Panel, Result, SnapEngine, TouchPoint, WheelEvent,
};

use crate::backdrop::{Backdrop, BackdropDriver};
use crate::deck::{DeckFile, SlidePanel};
use crate::host::{Page, TerminalEnvironment};
use crate::input::{Action, TouchPhase};
use crate::scroll::{UiConfigExt, ValueAnimator};
use crate::theme::Theme;

/// Terminal rows are roughly twice as tall as columns are wide
const ROW_ASPECT: f64 = 2.0;

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub deck: DeckFile,
    pub engine: SnapEngine,
    pub env: TerminalEnvironment,
    /// One panel per slide, same order as the deck
    pub panels: Vec<SlidePanel>,
    /// Vertical position in slides, eased toward the current index
    pub slide_offset: ValueAnimator,
    /// Horizontal position of the active slide in engine units
    pub card_offset: ValueAnimator,
    pub backdrop: BackdropDriver,
    pub backdrop_state: Backdrop,
    pub theme: Theme,
    pub show_help: bool,
    pub should_quit: bool,
    pub status_message: Option<String>,
    shown_index: usize,
    remeasure: bool,
    started: Instant,
}

impl App {
    pub fn new(config: Arc<AppConfig>, deck: DeckFile) -> Result<Self> {
        let mut engine = SnapEngine::new(deck.items(), config.engine.clone())?;
        let mut env = TerminalEnvironment::new(config.engine.handoff.target.clone());

        let panels: Vec<SlidePanel> = deck
            .slides
            .iter()
            .map(|slide| SlidePanel::new(slide, config.ui.cell_width_units))
            .collect();
        for (slide, panel) in deck.slides.iter().zip(&panels) {
            if slide.is_horizontal() {
                env.set_content_width(&slide.id, panel.content_width());
            }
        }

        let backdrop = BackdropDriver::new(deck.slides.len(), config.ui.easing);
        engine.set_index_observer(backdrop.observer());
        engine.mount(Duration::ZERO, &env);

        tracing::info!(
            slides = deck.slides.len(),
            strategy = ?engine.strategy(),
            "deck loaded"
        );

        Ok(Self {
            slide_offset: ValueAnimator::new(config.ui.easing),
            card_offset: ValueAnimator::new(config.ui.easing),
            backdrop_state: Backdrop {
                zoom: 1.0,
                shade: 0.0,
            },
            theme: Theme::default(),
            show_help: false,
            should_quit: false,
            status_message: None,
            shown_index: 0,
            remeasure: false,
            started: Instant::now(),
            backdrop,
            panels,
            engine,
            env,
            deck,
            config,
        })
    }

    /// Host clock handed to the engine
    pub fn now(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn page(&self) -> Page {
        self.env.page()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn handle_action(&mut self, action: Action, now: Duration) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::Key(key) if self.env.page() == Page::After => {
                if key == snapdeck_core::Key::ArrowUp {
                    self.return_to_deck();
                }
            }
            Action::Key(key) => {
                self.engine.on_key(key, now, &mut self.env);
            }
            Action::Wheel { delta_y, .. } if self.env.page() == Page::After => {
                if delta_y < 0.0 {
                    self.return_to_deck();
                }
            }
            Action::Wheel { delta_x, delta_y } => {
                let event = WheelEvent {
                    delta_x,
                    delta_y,
                    timestamp: now,
                };
                self.engine.on_wheel(event, &mut self.env);
            }
            Action::Touch { .. } if self.env.page() == Page::After => {}
            Action::Touch { phase, column, row } => {
                let units = self.config.ui.cell_width_units;
                let point = TouchPoint::new(
                    column as f64 * units,
                    row as f64 * units * ROW_ASPECT,
                    now,
                );
                match phase {
                    TouchPhase::Start => {
                        self.engine.on_touch_start(point);
                    }
                    TouchPhase::Move => {
                        self.engine.on_touch_move(point, &mut self.env);
                    }
                    TouchPhase::End => self.engine.on_touch_end(now, &mut self.env),
                }
            }
            Action::Home => {
                self.return_to_deck();
                self.engine.seek(0, 0.0, now, &self.env);
            }
            Action::End => {
                self.return_to_deck();
                let last = self.deck.slides.len().saturating_sub(1);
                self.engine.seek(last, f64::MAX, now, &self.env);
            }
            Action::None => {}
        }
        self.sync(now);
    }

    /// Terminal resized; widths are re-measured once the next frame is laid out
    pub fn on_resize(&mut self, now: Duration) {
        self.engine.on_resize(now);
        self.remeasure = true;
    }

    /// Called while drawing with the width of the slide area
    pub fn set_viewport(&mut self, columns: u16) {
        let width = self.config.ui.cells_to_units(columns);
        if self.env.viewport_width() != Some(width) {
            self.env.set_viewport_width(width);
            self.remeasure = true;
        }
        if !std::mem::take(&mut self.remeasure) {
            return;
        }

        // Carousels know their own extent; report it for the active slide
        let index = self.engine.state().current_index;
        let Some(slide) = self.deck.slides.get(index) else {
            return;
        };
        if slide.scroll_width.is_some() {
            return;
        }
        if let Some(width) = self.panels.get(index).and_then(|p| p.measure(width)) {
            self.engine.push_measurement(&slide.id, width);
        }
    }

    /// Run engine timers and advance every animation
    pub fn update(&mut self, now: Duration) {
        self.engine.tick(now, &mut self.env);
        self.sync(now);
    }

    pub fn needs_fast_update(&self) -> bool {
        self.slide_offset.is_animating()
            || self.card_offset.is_animating()
            || self.backdrop.is_animating()
            || self.engine.next_deadline().is_some()
    }

    /// Horizontal offset of the active slide in terminal columns
    pub fn card_offset_cells(&self) -> u16 {
        self.config
            .ui
            .units_to_cells(self.card_offset.current())
            .round()
            .clamp(0.0, u16::MAX as f64) as u16
    }

    fn return_to_deck(&mut self) {
        if self.env.page() == Page::After {
            self.env.show_deck();
            self.engine.on_viewport_scroll(&mut self.env);
        }
    }

    fn sync(&mut self, now: Duration) {
        for event in self.engine.drain_events() {
            self.describe(&event);
        }

        let placement = layout(&self.engine);
        let state = self.engine.state().clone();

        if state.current_index != self.shown_index {
            self.shown_index = state.current_index;
            self.card_offset.set(state.horizontal_progress);
        }
        self.slide_offset
            .animate_to(state.current_index as f64, placement.transition, now);
        self.card_offset
            .animate_to(state.horizontal_progress, placement.transition, now);

        let props = self.engine.panel_props();
        for (index, panel) in self.panels.iter_mut().enumerate() {
            match props {
                Some(props) if index == state.current_index => panel.apply_props(&props),
                _ => panel.clear_props(),
            }
        }

        self.slide_offset.update(now);
        self.card_offset.update(now);
        self.backdrop_state = self.backdrop.update(now);
    }

    fn describe(&mut self, event: &EngineEvent) {
        let total = self.deck.slides.len();
        match event {
            EngineEvent::IndexChanged { to, .. } => {
                let title = self.deck.slides.get(*to).map_or("", |s| s.title.as_str());
                self.set_status(format!("{}/{} {}", to + 1, total, title));
            }
            EngineEvent::ControlReleased => self.set_status("End of deck"),
            EngineEvent::ControlResumed => self.set_status("Back in the deck"),
            EngineEvent::WidthResolved {
                item_id,
                source: WidthSource::Fallback,
                ..
            } => {
                tracing::warn!(item = %item_id, "slide width unknown, using fallback");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use snapdeck_core::config::StrategyChoice;
    use snapdeck_core::{EasingType, Key};

    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn app() -> App {
        let mut config = AppConfig::default();
        config.engine.input_strategy = StrategyChoice::Direct;
        config.ui.easing = EasingType::Linear;
        App::new(Arc::new(config), DeckFile::demo()).unwrap()
    }

    #[test]
    fn test_wheel_notch_advances_one_slide() {
        let mut app = app();
        app.set_viewport(80);
        app.handle_action(Action::Wheel { delta_x: 0.0, delta_y: 100.0 }, ms(0));
        app.update(ms(120));
        assert_eq!(app.engine.state().current_index, 1);
        assert!(app.slide_offset.is_animating());
        assert_eq!(app.status_message.as_deref(), Some("2/4 Services"));

        app.update(ms(1000));
        assert_eq!(app.slide_offset.current(), 1.0);
    }

    #[test]
    fn test_carousel_measured_from_terminal_width() {
        let mut app = app();
        app.set_viewport(80);
        app.handle_action(Action::Key(Key::ArrowDown), ms(0));
        // 5 cards * 30 columns * 8 units - 80 columns * 8 units
        assert_eq!(app.engine.max_scroll("services"), Some(560.0));
        assert!(app.panels[1].props().is_some());
        assert!(app.panels[0].props().is_none());
    }

    #[test]
    fn test_resize_reports_panel_width() {
        let mut app = app();
        app.set_viewport(80);
        app.handle_action(Action::Key(Key::ArrowDown), ms(0));
        app.on_resize(ms(700));
        assert_eq!(app.engine.max_scroll("services"), None);
        app.set_viewport(100);
        assert_eq!(app.engine.max_scroll("services"), Some(400.0));
    }

    #[test]
    fn test_release_switches_page_and_wheel_up_returns() {
        let mut app = app();
        app.set_viewport(80);
        app.handle_action(Action::End, ms(0));
        assert_eq!(app.engine.state().current_index, 3);

        app.handle_action(Action::Key(Key::ArrowDown), ms(10));
        assert!(app.engine.state().control_released);
        app.update(ms(200));
        assert_eq!(app.page(), Page::After);

        app.handle_action(Action::Wheel { delta_x: 0.0, delta_y: -100.0 }, ms(300));
        assert_eq!(app.page(), Page::Deck);
        assert!(!app.engine.state().control_released);
        assert_eq!(app.status_message.as_deref(), Some("Back in the deck"));
    }

    #[test]
    fn test_key_up_on_after_page_resyncs() {
        let mut app = app();
        app.set_viewport(80);
        app.handle_action(Action::End, ms(0));
        app.handle_action(Action::Key(Key::ArrowDown), ms(10));
        app.update(ms(200));
        assert_eq!(app.page(), Page::After);
        assert_eq!(app.status_message.as_deref(), Some("End of deck"));

        // Keys other than up stay on the after page
        app.handle_action(Action::Key(Key::ArrowDown), ms(250));
        assert_eq!(app.page(), Page::After);

        app.handle_action(Action::Key(Key::ArrowUp), ms(300));
        assert_eq!(app.page(), Page::Deck);
        assert!(!app.engine.state().control_released);
        assert!(app.engine.drain_events().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Back in the deck"));
    }

    #[test]
    fn test_drag_acts_as_touch() {
        let mut app = app();
        app.set_viewport(80);
        let drag = |phase, row| Action::Touch { phase, column: 10, row };
        app.handle_action(drag(TouchPhase::Start, 20), ms(0));
        app.handle_action(drag(TouchPhase::Move, 17), ms(30));
        app.handle_action(drag(TouchPhase::End, 17), ms(60));
        assert_eq!(app.engine.state().current_index, 1);
    }

    #[test]
    fn test_backdrop_follows_index() {
        let mut app = app();
        app.set_viewport(80);
        app.handle_action(Action::End, ms(0));
        app.update(ms(1000));
        assert!((app.backdrop_state.shade - 1.0).abs() < 1e-9);
    }
}
