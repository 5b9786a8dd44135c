//! Input normalizer: wheel, touch and keyboard events in, unified samples out.

pub mod keyboard;
pub mod sample;
pub mod strategy;
pub mod touch;
pub mod wheel;

pub use keyboard::{key_step, Key, KeyStep};
pub use sample::{Axis, Direction, GestureSample, InputSource};
pub use strategy::{Capabilities, InputStrategy, Platform};
pub use touch::{TouchPoint, TouchTracker};
pub use wheel::{normalize_wheel, MomentumDetector, WheelAction, WheelEvent, WheelHandler};

use serde::Serialize;

/// Whether the host should suppress native handling of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputDisposition {
    /// The engine consumed the event; call `preventDefault`
    Captured,
    /// Let the native document scroll
    PassThrough,
}

impl InputDisposition {
    #[inline]
    pub fn prevent_default(self) -> bool {
        self == InputDisposition::Captured
    }
}
