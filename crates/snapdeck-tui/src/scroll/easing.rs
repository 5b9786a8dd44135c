//! Easing curves mapping `[0, 1]` onto `[0, 1]`.

pub use snapdeck_core::EasingType;

pub trait EasingTypeExt {
    /// Eased value of `t`, clamped to `[0, 1]` first
    fn apply(&self, t: f64) -> f64;

    /// Ease between two values
    fn interpolate(&self, from: f64, to: f64, t: f64) -> f64 {
        super::timing::lerp(from, to, self.apply(t))
    }
}

impl EasingTypeExt for EasingType {
    #[inline]
    fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            EasingType::None => step(t),
            EasingType::Linear => t,
            EasingType::Cubic => 1.0 - (1.0 - t).powi(3),
            EasingType::Quintic => 1.0 - (1.0 - t).powi(5),
            EasingType::EaseOut => expo_out(t),
        }
    }
}

#[inline]
fn step(t: f64) -> f64 {
    if t < 1.0 {
        0.0
    } else {
        1.0
    }
}

/// 1 - 2^(-10t), pinned to exactly 1 at the end
#[inline]
fn expo_out(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [EasingType; 4] = [
        EasingType::Linear,
        EasingType::Cubic,
        EasingType::Quintic,
        EasingType::EaseOut,
    ];

    #[test]
    fn test_curves_pin_endpoints() {
        for easing in CURVES {
            assert!(easing.apply(0.0).abs() < 1e-9, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{:?} at 1", easing);
        }
        assert_eq!(EasingType::None.apply(0.99), 0.0);
        assert_eq!(EasingType::None.apply(1.0), 1.0);
    }

    #[test]
    fn test_curves_are_monotonic() {
        for easing in CURVES {
            let samples: Vec<f64> = (0..=20).map(|i| easing.apply(i as f64 / 20.0)).collect();
            assert!(samples.windows(2).all(|w| w[1] >= w[0]), "{:?}", easing);
        }
    }

    #[test]
    fn test_interpolate_handles_reverse_ranges() {
        let v = EasingType::Linear.interpolate(800.0, 0.0, 0.25);
        assert!((v - 600.0).abs() < 1e-9);
        assert_eq!(EasingType::Cubic.interpolate(3.0, 5.0, f64::NAN), 5.0);
    }
}
