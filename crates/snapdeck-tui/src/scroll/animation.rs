//! Eased scalar animation driven by the host clock.

use std::time::Duration;

use super::easing::{EasingType, EasingTypeExt};
use super::timing::{is_complete, progress};

#[derive(Debug, Clone)]
struct ActiveAnimation {
    start: Duration,
    from: f64,
    to: f64,
    duration: Duration,
}

/// One animated value, e.g. the deck's vertical slide offset.
///
/// `animate_to` retargets from wherever the value currently is, so a new
/// engine decision mid-flight continues smoothly instead of jumping.
#[derive(Debug, Clone)]
pub struct ValueAnimator {
    animation: Option<ActiveAnimation>,
    easing: EasingType,
    current: f64,
}

impl Default for ValueAnimator {
    fn default() -> Self {
        Self::new(EasingType::default())
    }
}

impl ValueAnimator {
    pub fn new(easing: EasingType) -> Self {
        Self {
            animation: None,
            easing,
            current: 0.0,
        }
    }

    pub fn set_easing(&mut self, easing: EasingType) {
        self.easing = easing;
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Final value once the running animation completes
    pub fn target(&self) -> f64 {
        self.animation.as_ref().map_or(self.current, |a| a.to)
    }

    /// Jump without animating
    pub fn set(&mut self, value: f64) {
        self.animation = None;
        self.current = value;
    }

    pub fn animate_to(&mut self, target: f64, duration: Duration, now: Duration) {
        if !target.is_finite() {
            return;
        }
        if (target - self.target()).abs() < f64::EPSILON && self.is_animating() {
            return;
        }
        if duration.is_zero() || self.easing == EasingType::None {
            self.set(target);
            return;
        }
        if (target - self.current).abs() < f64::EPSILON {
            self.animation = None;
            return;
        }
        self.animation = Some(ActiveAnimation {
            start: now,
            from: self.current,
            to: target,
            duration,
        });
    }

    /// Advance to `now` and return the interpolated value
    pub fn update(&mut self, now: Duration) -> f64 {
        if let Some(anim) = &self.animation {
            let elapsed = now.saturating_sub(anim.start);
            if is_complete(elapsed, anim.duration) {
                self.current = anim.to;
                self.animation = None;
            } else {
                let t = progress(elapsed, anim.duration);
                self.current = self.easing.interpolate(anim.from, anim.to, t);
            }
        }
        self.current
    }

    pub fn cancel(&mut self) {
        self.animation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_linear_animation() {
        let mut anim = ValueAnimator::new(EasingType::Linear);
        anim.animate_to(1.0, ms(800), ms(1000));
        assert!(anim.is_animating());
        assert_eq!(anim.target(), 1.0);
        assert!((anim.update(ms(1400)) - 0.5).abs() < 1e-9);
        assert_eq!(anim.update(ms(1800)), 1.0);
        assert!(!anim.is_animating());
    }

    #[test]
    fn test_retarget_mid_flight_starts_from_current() {
        let mut anim = ValueAnimator::new(EasingType::Linear);
        anim.animate_to(100.0, ms(100), ms(0));
        anim.update(ms(50));
        anim.animate_to(0.0, ms(100), ms(50));
        assert!((anim.update(ms(100)) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_easing_jumps() {
        let mut anim = ValueAnimator::new(EasingType::None);
        anim.animate_to(3.0, ms(800), ms(0));
        assert!(!anim.is_animating());
        assert_eq!(anim.current(), 3.0);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut anim = ValueAnimator::default();
        anim.animate_to(42.0, Duration::ZERO, ms(0));
        assert_eq!(anim.update(ms(0)), 42.0);
    }

    #[test]
    fn test_same_target_keeps_running_animation() {
        let mut anim = ValueAnimator::new(EasingType::Linear);
        anim.animate_to(10.0, ms(100), ms(0));
        anim.animate_to(10.0, ms(100), ms(90));
        assert!((anim.update(ms(50)) - 5.0).abs() < 1e-9);
    }
}
