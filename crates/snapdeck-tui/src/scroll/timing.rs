//! Progress and interpolation helpers on an injected clock.

use std::time::Duration;

/// Fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[inline]
pub fn is_complete(elapsed: Duration, duration: Duration) -> bool {
    elapsed >= duration
}

#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
