use serde::{Deserialize, Serialize};

use super::sample::Direction;

/// Keys the engine listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Fixed-size step requested by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStep {
    Vertical(Direction),
    Horizontal(Direction),
}

pub fn key_step(key: Key) -> Option<KeyStep> {
    match key {
        Key::ArrowDown => Some(KeyStep::Vertical(Direction::Forward)),
        Key::ArrowUp => Some(KeyStep::Vertical(Direction::Backward)),
        Key::ArrowRight => Some(KeyStep::Horizontal(Direction::Forward)),
        Key::ArrowLeft => Some(KeyStep::Horizontal(Direction::Backward)),
        Key::Other => None,
    }
}
