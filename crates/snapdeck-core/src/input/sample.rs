use std::time::Duration;

/// Scroll axis of a normalized sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
    Horizontal,
}

/// Device family a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Wheel,
    Touch,
}

/// Travel direction through the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Down / right: towards the end of the deck
    Forward,
    /// Up / left: towards the start of the deck
    Backward,
}

impl Direction {
    /// Direction of a signed delta, `None` for zero or non-finite values
    pub fn of(delta: f64) -> Option<Self> {
        if !delta.is_finite() || delta == 0.0 {
            None
        } else if delta > 0.0 {
            Some(Direction::Forward)
        } else {
            Some(Direction::Backward)
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// Unified input sample handed to the gesture accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub axis: Axis,
    /// Scaled, signed delta in engine units
    pub delta: f64,
    /// Unscaled magnitude, used by momentum detection
    pub raw_magnitude: f64,
    pub timestamp: Duration,
    pub source: InputSource,
}

impl GestureSample {
    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        Direction::of(self.delta)
    }

    /// Reject samples that would poison the running sum
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.delta.is_finite() && self.raw_magnitude.is_finite()
    }
}
