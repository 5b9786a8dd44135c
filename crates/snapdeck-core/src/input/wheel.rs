//! Wheel normalization and the two wheel-handling strategies.
//!
//! `Direct` accumulates every sample and relies on the quiet-period
//! debounce to end a gesture. `MomentumAware` additionally watches for the
//! long run of tiny, decaying deltas a momentum trackpad emits after the
//! fingers lift; once that tail is recognized the finalize deadline is
//! locked so the decaying samples cannot keep extending the gesture.

use std::time::Duration;

use crate::config::MomentumTuning;

use super::sample::{Axis, GestureSample, InputSource};
use super::strategy::InputStrategy;

/// Raw wheel event as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    pub timestamp: Duration,
}

impl WheelEvent {
    pub fn vertical(delta_y: f64, timestamp: Duration) -> Self {
        Self {
            delta_x: 0.0,
            delta_y,
            timestamp,
        }
    }

    pub fn horizontal(delta_x: f64, timestamp: Duration) -> Self {
        Self {
            delta_x,
            delta_y: 0.0,
            timestamp,
        }
    }
}

/// Convert a wheel event into a sample on its dominant axis.
///
/// Returns `None` for non-finite or all-zero deltas.
pub fn normalize_wheel(event: &WheelEvent, scroll_speed: f64) -> Option<GestureSample> {
    if !event.delta_x.is_finite() || !event.delta_y.is_finite() {
        return None;
    }
    if event.delta_x == 0.0 && event.delta_y == 0.0 {
        return None;
    }

    let (axis, raw) = if event.delta_y.abs() >= event.delta_x.abs() {
        (Axis::Vertical, event.delta_y)
    } else {
        (Axis::Horizontal, event.delta_x)
    };

    let sample = GestureSample {
        axis,
        delta: raw * scroll_speed,
        raw_magnitude: raw.abs(),
        timestamp: event.timestamp,
        source: InputSource::Wheel,
    };
    sample.is_well_formed().then_some(sample)
}

/// What the engine should do with an accepted wheel sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelAction {
    /// Add to the running sum and re-arm the quiet-period debounce
    Accumulate,
    /// Add to the running sum and lock the finalize deadline
    LockIn,
    /// Swallow the sample without touching the accumulator
    Drop,
}

/// Per-gesture momentum tail tracking
#[derive(Debug, Clone, Default)]
pub struct MomentumDetector {
    small_run: u32,
    locked: bool,
    absorbing: bool,
    last_timestamp: Option<Duration>,
}

impl MomentumDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(
        &mut self,
        sample: &GestureSample,
        tuning: &MomentumTuning,
        reset_gap: Duration,
    ) -> WheelAction {
        self.note_timestamp(sample.timestamp, reset_gap);

        let small = sample.raw_magnitude < tuning.small_delta;

        if self.absorbing {
            if small {
                return WheelAction::Drop;
            }
            // A full-size delta after a tail is a new deliberate gesture
            self.absorbing = false;
            self.small_run = 0;
        }

        if self.locked {
            return WheelAction::Drop;
        }

        if small {
            self.small_run += 1;
        } else {
            self.small_run = 0;
        }

        if self.small_run >= tuning.tail_min_events {
            tracing::trace!(run = self.small_run, "momentum tail detected, locking gesture");
            self.locked = true;
            WheelAction::LockIn
        } else {
            WheelAction::Accumulate
        }
    }

    /// Record arrival time only; a gap longer than `reset_gap` ends any tail
    pub fn note_timestamp(&mut self, timestamp: Duration, reset_gap: Duration) {
        if let Some(last) = self.last_timestamp {
            if timestamp.saturating_sub(last) > reset_gap {
                self.small_run = 0;
                self.locked = false;
                self.absorbing = false;
            }
        }
        self.last_timestamp = Some(timestamp);
    }

    /// The current gesture was finalized
    pub fn on_finalized(&mut self) {
        if self.locked {
            self.absorbing = true;
        }
        self.locked = false;
        self.small_run = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[cfg(test)]
    fn is_locked(&self) -> bool {
        self.locked
    }

    #[cfg(test)]
    fn is_absorbing(&self) -> bool {
        self.absorbing
    }
}

/// Wheel handling selected once from the input strategy
#[derive(Debug, Clone)]
pub enum WheelHandler {
    Direct,
    MomentumAware(MomentumDetector),
}

impl WheelHandler {
    pub fn for_strategy(strategy: InputStrategy) -> Self {
        match strategy {
            InputStrategy::Direct => WheelHandler::Direct,
            InputStrategy::TrackpadMomentumAware => {
                WheelHandler::MomentumAware(MomentumDetector::new())
            }
        }
    }

    pub fn observe(
        &mut self,
        sample: &GestureSample,
        tuning: &MomentumTuning,
        reset_gap: Duration,
    ) -> WheelAction {
        match self {
            WheelHandler::Direct => WheelAction::Accumulate,
            WheelHandler::MomentumAware(detector) => detector.observe(sample, tuning, reset_gap),
        }
    }

    /// Sample arrived while input is otherwise ignored (transition in flight)
    pub fn note_timestamp(&mut self, timestamp: Duration, reset_gap: Duration) {
        if let WheelHandler::MomentumAware(detector) = self {
            detector.note_timestamp(timestamp, reset_gap);
        }
    }

    pub fn on_finalized(&mut self) {
        if let WheelHandler::MomentumAware(detector) = self {
            detector.on_finalized();
        }
    }

    pub fn reset(&mut self) {
        if let WheelHandler::MomentumAware(detector) = self {
            detector.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn sample(raw: f64, t: u64) -> GestureSample {
        normalize_wheel(&WheelEvent::vertical(raw, ms(t)), 0.5).unwrap()
    }

    #[test]
    fn test_normalize_picks_dominant_axis() {
        let s = normalize_wheel(
            &WheelEvent {
                delta_x: 10.0,
                delta_y: -40.0,
                timestamp: ms(0),
            },
            0.5,
        )
        .unwrap();
        assert_eq!(s.axis, Axis::Vertical);
        assert!((s.delta + 20.0).abs() < 1e-9);

        let s = normalize_wheel(
            &WheelEvent {
                delta_x: 30.0,
                delta_y: 5.0,
                timestamp: ms(0),
            },
            0.5,
        )
        .unwrap();
        assert_eq!(s.axis, Axis::Horizontal);
        assert!((s.delta - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_drops_malformed() {
        assert!(normalize_wheel(&WheelEvent::vertical(f64::NAN, ms(0)), 0.5).is_none());
        assert!(normalize_wheel(&WheelEvent::vertical(0.0, ms(0)), 0.5).is_none());
        assert!(normalize_wheel(&WheelEvent::horizontal(f64::INFINITY, ms(0)), 0.5).is_none());
    }

    #[test]
    fn test_direct_always_accumulates() {
        let mut handler = WheelHandler::for_strategy(InputStrategy::Direct);
        let tuning = MomentumTuning::default();
        for t in 0..40 {
            assert_eq!(handler.observe(&sample(1.0, t * 10), &tuning, ms(180)), WheelAction::Accumulate);
        }
    }

    #[test]
    fn test_momentum_tail_locks_after_run() {
        let mut detector = MomentumDetector::new();
        let tuning = MomentumTuning::default();

        assert_eq!(detector.observe(&sample(60.0, 0), &tuning, ms(180)), WheelAction::Accumulate);
        let mut locked_at = None;
        for i in 1..=20u64 {
            let action = detector.observe(&sample(2.0, i * 16), &tuning, ms(180));
            if action == WheelAction::LockIn {
                locked_at = Some(i);
                break;
            }
            assert_eq!(action, WheelAction::Accumulate);
        }
        assert_eq!(locked_at, Some(tuning.tail_min_events as u64));

        // Further decaying samples never re-arm anything
        assert_eq!(detector.observe(&sample(1.0, 400), &tuning, ms(180)), WheelAction::Drop);
    }

    #[test]
    fn test_absorbs_tail_after_finalize_until_gap() {
        let mut detector = MomentumDetector::new();
        let tuning = MomentumTuning::default();
        for i in 0..tuning.tail_min_events as u64 {
            detector.observe(&sample(2.0, i * 16), &tuning, ms(180));
        }
        assert!(detector.is_locked());
        detector.on_finalized();
        assert!(detector.is_absorbing());

        assert_eq!(detector.observe(&sample(1.0, 300), &tuning, ms(180)), WheelAction::Drop);
        // Quiet gap ends the tail; small deltas are accepted again
        assert_eq!(detector.observe(&sample(1.0, 700), &tuning, ms(180)), WheelAction::Accumulate);
        assert!(!detector.is_absorbing());
    }

    #[test]
    fn test_large_delta_breaks_absorption() {
        let mut detector = MomentumDetector::new();
        let tuning = MomentumTuning::default();
        for i in 0..tuning.tail_min_events as u64 {
            detector.observe(&sample(2.0, i * 16), &tuning, ms(180));
        }
        detector.on_finalized();
        assert_eq!(detector.observe(&sample(80.0, 260), &tuning, ms(180)), WheelAction::Accumulate);
    }
}
