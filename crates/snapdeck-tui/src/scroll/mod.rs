//! Offset animation for the deck render layer.
//!
//! The engine only reports where the deck should be and how long the move
//! should take; this module eases the on-screen offsets toward that target.
//!
//! - `easing` - easing curves over `[0, 1]`
//! - `timing` - progress and interpolation helpers
//! - `config` - frame timing derived from `UiConfig`
//! - `animation` - `ValueAnimator`, one eased scalar driven by a host clock
//!
//! ```ignore
//! use snapdeck_tui::scroll::ValueAnimator;
//!
//! let mut offset = ValueAnimator::new(EasingType::Cubic);
//! offset.animate_to(1.0, Duration::from_millis(800), now);
//!
//! // Each frame
//! let y = offset.update(clock.elapsed());
//! ```

pub mod config;
pub mod easing;
pub mod timing;

pub mod animation;

pub use animation::ValueAnimator;
pub use config::UiConfigExt;
pub use easing::{EasingType, EasingTypeExt};
