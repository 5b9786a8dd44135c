//! Gesture accumulation and tri-band classification.
//!
//! A fast flick, a deliberate slow pan and a decaying momentum tail need
//! different distance thresholds, so a finished gesture is first binned by
//! duration and only then compared against the band's threshold.

use std::time::Duration;

use crate::config::{GestureTuning, SnapThreshold};
use crate::input::{Axis, Direction, GestureSample, InputSource};

/// Running state of one interaction
#[derive(Debug, Clone)]
pub struct GestureAccumulator {
    active: bool,
    start: Duration,
    last: Duration,
    accumulated: f64,
    samples: u32,
    axis: Axis,
    source: InputSource,
    finalize_at: Option<Duration>,
    locked: bool,
}

impl Default for GestureAccumulator {
    fn default() -> Self {
        Self {
            active: false,
            start: Duration::ZERO,
            last: Duration::ZERO,
            accumulated: 0.0,
            samples: 0,
            axis: Axis::Vertical,
            source: InputSource::Wheel,
            finalize_at: None,
            locked: false,
        }
    }
}

/// Snapshot of a finished interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub accumulated: f64,
    pub elapsed: Duration,
    pub axis: Axis,
    pub source: InputSource,
    pub samples: u32,
    pub momentum_locked: bool,
}

impl Gesture {
    #[inline]
    pub fn distance(&self) -> f64 {
        self.accumulated.abs()
    }

    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        Direction::of(self.accumulated)
    }
}

impl GestureAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn source(&self) -> Option<InputSource> {
        self.active.then_some(self.source)
    }

    /// Whether `sample` belongs to the interaction in progress
    pub fn continues(&self, sample: &GestureSample, reset_gap: Duration) -> bool {
        self.active
            && sample.axis == self.axis
            && sample.source == self.source
            && sample.timestamp.saturating_sub(self.last) <= reset_gap
    }

    /// Add a sample in arrival order, starting a new interaction if needed.
    ///
    /// Returns true when the sample opened a new interaction.
    pub fn push(&mut self, sample: &GestureSample, reset_gap: Duration) -> bool {
        if !sample.is_well_formed() {
            return false;
        }

        let fresh = !self.continues(sample, reset_gap);
        if fresh {
            self.reset();
            self.active = true;
            self.start = sample.timestamp;
            self.axis = sample.axis;
            self.source = sample.source;
        }

        self.accumulated += sample.delta;
        self.samples += 1;
        self.last = sample.timestamp.max(self.last);
        fresh
    }

    /// Move the interaction start back, e.g. to the touchstart time
    pub fn set_origin(&mut self, origin: Duration) {
        if self.active && origin < self.start {
            self.start = origin;
        }
    }

    /// Debounce: replace the pending finalize deadline unless locked
    pub fn arm(&mut self, deadline: Duration) {
        if self.active && !self.locked {
            self.finalize_at = Some(deadline);
        }
    }

    /// Fix the finalize deadline; later samples cannot move it
    pub fn lock(&mut self, deadline: Duration) {
        if self.active && !self.locked {
            self.finalize_at = Some(deadline);
            self.locked = true;
        }
    }

    /// Due when the debounce deadline passed or the watchdog ceiling was hit
    pub fn is_due(&self, now: Duration, watchdog: Duration) -> bool {
        if !self.active {
            return false;
        }
        let debounce_due = self.finalize_at.is_some_and(|at| now >= at);
        let watchdog_due = now.saturating_sub(self.last) >= watchdog;
        debounce_due || watchdog_due
    }

    /// Earliest time `is_due` can become true
    pub fn next_deadline(&self, watchdog: Duration) -> Option<Duration> {
        if !self.active {
            return None;
        }
        let ceiling = self.last + watchdog;
        Some(self.finalize_at.map_or(ceiling, |at| at.min(ceiling)))
    }

    /// Finish the interaction; `end` overrides the last-sample time
    pub fn take(&mut self, end: Option<Duration>) -> Option<Gesture> {
        if !self.active {
            return None;
        }
        let end = end.unwrap_or(self.last).max(self.start);
        let gesture = Gesture {
            accumulated: self.accumulated,
            elapsed: end - self.start,
            axis: self.axis,
            source: self.source,
            samples: self.samples,
            momentum_locked: self.locked,
        };
        self.reset();
        Some(gesture)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Duration band of a finished gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedClass {
    Fast,
    Medium,
    Slow,
}

/// Instruction to move the deck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapDecision {
    pub direction: Direction,
    pub distance: f64,
    pub axis: Axis,
    pub speed: SpeedClass,
    pub transition: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    Snap(SnapDecision),
    /// Not enough travel; spring back to the current position
    RubberBand { speed: SpeedClass, distance: f64 },
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    threshold: SnapThreshold,
    tuning: GestureTuning,
}

impl GestureClassifier {
    pub fn new(threshold: SnapThreshold, tuning: GestureTuning) -> Self {
        Self { threshold, tuning }
    }

    pub fn speed_class(&self, elapsed: Duration) -> SpeedClass {
        let ms = elapsed.as_millis() as u64;
        if ms < self.tuning.fast_max_ms {
            SpeedClass::Fast
        } else if ms >= self.tuning.slow_min_ms {
            SpeedClass::Slow
        } else {
            SpeedClass::Medium
        }
    }

    /// Distance a gesture of this band must cover to snap
    pub fn threshold_for(&self, speed: SpeedClass) -> f64 {
        match speed {
            SpeedClass::Fast => self.tuning.fast_threshold,
            SpeedClass::Slow => self.threshold.min * self.tuning.slow_threshold_factor,
            SpeedClass::Medium => self.threshold.min,
        }
    }

    pub fn transition_for(&self, speed: SpeedClass) -> Duration {
        let ms = match speed {
            SpeedClass::Fast => self.tuning.fast_transition_ms,
            SpeedClass::Medium => self.tuning.medium_transition_ms,
            SpeedClass::Slow => self.tuning.slow_transition_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn classify(&self, gesture: &Gesture) -> Classification {
        let speed = self.speed_class(gesture.elapsed);
        let distance = gesture.distance();

        let Some(direction) = gesture.direction() else {
            return Classification::RubberBand { speed, distance };
        };

        let snaps = distance > self.threshold.max || distance >= self.threshold_for(speed);
        if !snaps {
            return Classification::RubberBand { speed, distance };
        }

        Classification::Snap(SnapDecision {
            direction,
            distance,
            axis: gesture.axis,
            speed,
            transition: self.transition_for(speed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn wheel(delta: f64, t: u64) -> GestureSample {
        GestureSample {
            axis: Axis::Vertical,
            delta,
            raw_magnitude: delta.abs(),
            timestamp: ms(t),
            source: InputSource::Wheel,
        }
    }

    fn gesture(accumulated: f64, elapsed: u64) -> Gesture {
        Gesture {
            accumulated,
            elapsed: ms(elapsed),
            axis: Axis::Vertical,
            source: InputSource::Wheel,
            samples: 1,
            momentum_locked: false,
        }
    }

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(SnapThreshold::default(), GestureTuning::default())
    }

    #[test]
    fn test_running_sum_in_arrival_order() {
        let mut acc = GestureAccumulator::new();
        assert!(acc.push(&wheel(10.0, 0), ms(180)));
        assert!(!acc.push(&wheel(-4.0, 20), ms(180)));
        assert!(!acc.push(&wheel(6.0, 40), ms(180)));
        let g = acc.take(None).unwrap();
        assert!((g.accumulated - 12.0).abs() < 1e-9);
        assert_eq!(g.elapsed, ms(40));
        assert_eq!(g.samples, 3);
        assert!(!acc.is_active());
    }

    #[test]
    fn test_gap_starts_new_interaction() {
        let mut acc = GestureAccumulator::new();
        acc.push(&wheel(50.0, 0), ms(180));
        assert!(acc.push(&wheel(5.0, 300), ms(180)));
        let g = acc.take(None).unwrap();
        assert!((g.accumulated - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_sample_does_not_corrupt() {
        let mut acc = GestureAccumulator::new();
        acc.push(&wheel(20.0, 0), ms(180));
        acc.push(&wheel(f64::NAN, 10), ms(180));
        let g = acc.take(None).unwrap();
        assert!((g.accumulated - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_debounce_rearm_and_lock() {
        let mut acc = GestureAccumulator::new();
        acc.push(&wheel(20.0, 0), ms(180));
        acc.arm(ms(120));
        acc.push(&wheel(20.0, 50), ms(180));
        acc.arm(ms(170));
        assert!(!acc.is_due(ms(150), ms(360)));
        assert!(acc.is_due(ms(170), ms(360)));

        acc.lock(ms(200));
        acc.arm(ms(500));
        assert!(acc.is_due(ms(200), ms(360)));
    }

    #[test]
    fn test_watchdog_forces_due() {
        let mut acc = GestureAccumulator::new();
        acc.push(&wheel(20.0, 0), ms(180));
        assert!(!acc.is_due(ms(200), ms(240)));
        assert!(acc.is_due(ms(240), ms(240)));
        assert_eq!(acc.next_deadline(ms(240)), Some(ms(240)));
    }

    #[test]
    fn test_speed_bands() {
        let c = classifier();
        assert_eq!(c.speed_class(ms(60)), SpeedClass::Fast);
        assert_eq!(c.speed_class(ms(200)), SpeedClass::Medium);
        assert_eq!(c.speed_class(ms(450)), SpeedClass::Slow);
    }

    #[test]
    fn test_fast_flick_low_threshold() {
        match classifier().classify(&gesture(35.0, 80)) {
            Classification::Snap(d) => {
                assert_eq!(d.direction, Direction::Forward);
                assert_eq!(d.speed, SpeedClass::Fast);
                assert_eq!(d.transition, ms(800));
            }
            other => panic!("expected snap, got {:?}", other),
        }
    }

    #[test]
    fn test_medium_below_min_rubber_bands() {
        assert!(matches!(
            classifier().classify(&gesture(80.0, 200)),
            Classification::RubberBand {
                speed: SpeedClass::Medium,
                ..
            }
        ));
    }

    #[test]
    fn test_slow_uses_reduced_threshold() {
        // 0.65 * 100 = 65
        assert!(matches!(
            classifier().classify(&gesture(-70.0, 500)),
            Classification::Snap(SnapDecision {
                direction: Direction::Backward,
                speed: SpeedClass::Slow,
                ..
            })
        ));
        assert!(matches!(
            classifier().classify(&gesture(60.0, 500)),
            Classification::RubberBand { .. }
        ));
    }

    #[test]
    fn test_over_max_always_snaps() {
        let tuning = GestureTuning {
            fast_threshold: 1000.0,
            ..Default::default()
        };
        let c = GestureClassifier::new(SnapThreshold::default(), tuning);
        assert!(matches!(c.classify(&gesture(450.0, 50)), Classification::Snap(_)));
    }

    #[test]
    fn test_zero_sum_rubber_bands() {
        assert!(matches!(
            classifier().classify(&gesture(0.0, 50)),
            Classification::RubberBand { .. }
        ));
    }
}
