use std::time::Duration;

use super::sample::{Axis, GestureSample, InputSource};

/// One touch coordinate sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
    pub timestamp: Duration,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64, timestamp: Duration) -> Self {
        Self { x, y, timestamp }
    }

    /// Some browsers report (0, 0) for synthetic or lost touches
    fn is_spurious(&self) -> bool {
        !self.x.is_finite() || !self.y.is_finite() || (self.x == 0.0 && self.y == 0.0)
    }
}

/// Tracks a single-finger touch interaction.
///
/// Deltas are taken against the previous sample rather than the start
/// point so the gesture integrates continuously.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    start: Option<TouchPoint>,
    previous: Option<TouchPoint>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking; returns false if the point was spurious
    pub fn begin(&mut self, point: TouchPoint) -> bool {
        if point.is_spurious() {
            return false;
        }
        self.start = Some(point);
        self.previous = Some(point);
        true
    }

    /// Convert a move into a sample scaled by `gain`
    pub fn movement(&mut self, point: TouchPoint, gain: f64) -> Option<GestureSample> {
        if point.is_spurious() {
            return None;
        }
        let previous = self.previous?;
        self.previous = Some(point);

        // Finger travelling up scrolls content forward
        let dy = previous.y - point.y;
        let dx = previous.x - point.x;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }

        let (axis, raw) = if dy.abs() >= dx.abs() {
            (Axis::Vertical, dy)
        } else {
            (Axis::Horizontal, dx)
        };

        let sample = GestureSample {
            axis,
            delta: raw * gain,
            raw_magnitude: raw.abs(),
            timestamp: point.timestamp,
            source: InputSource::Touch,
        };
        sample.is_well_formed().then_some(sample)
    }

    /// Finish the interaction, returning where it started
    pub fn end(&mut self) -> Option<TouchPoint> {
        self.previous = None;
        self.start.take()
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.previous = None;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.start.map(|p| p.timestamp)
    }
}
