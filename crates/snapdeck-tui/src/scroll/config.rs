//! Frame timing derived from the `[ui]` config section.

use std::time::Duration;

pub use snapdeck_core::{EasingType, UiConfig};

pub trait UiConfigExt {
    /// Poll interval while nothing is moving
    fn tick_rate(&self) -> Duration;

    /// Poll interval while an animation or engine timer is pending
    fn frame_duration(&self) -> Duration;

    /// Whether offsets are eased at all
    fn is_smooth(&self) -> bool;

    /// Engine units covered by `cells` terminal columns
    fn cells_to_units(&self, cells: u16) -> f64;

    /// Terminal columns covering `units` engine units
    fn units_to_cells(&self, units: f64) -> f64;
}

impl UiConfigExt for UiConfig {
    #[inline]
    fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    #[inline]
    fn frame_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16)
        } else {
            Duration::from_millis((1000 / self.animation_fps as u64).max(1))
        }
    }

    #[inline]
    fn is_smooth(&self) -> bool {
        self.easing != EasingType::None
    }

    fn cells_to_units(&self, cells: u16) -> f64 {
        cells as f64 * self.cell_width_units
    }

    fn units_to_cells(&self, units: f64) -> f64 {
        if self.cell_width_units > 0.0 {
            units / self.cell_width_units
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_duration() {
        let config = UiConfig {
            animation_fps: 50,
            ..Default::default()
        };
        assert_eq!(config.frame_duration(), Duration::from_millis(20));

        let config = UiConfig {
            animation_fps: 0,
            ..Default::default()
        };
        assert_eq!(config.frame_duration(), Duration::from_millis(16));
    }

    #[test]
    fn test_unit_conversion() {
        let config = UiConfig::default();
        assert_eq!(config.cells_to_units(10), 80.0);
        assert_eq!(config.units_to_cells(80.0), 10.0);
        assert!(config.is_smooth());
    }
}
