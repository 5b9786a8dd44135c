//! Scroll state machine: the two-level deck position and control ownership.
//!
//! Every mutation goes through `set_index` / `set_progress`, which clamp, so
//! the position can never leave `[0, len - 1]` x `[0, max_scroll]`.

use std::time::Duration;

use serde::Serialize;

use crate::geometry::GeometryOracle;
use crate::input::Direction;
use crate::item::SnapItem;

/// Live cursor, exclusively owned by the state machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineState {
    pub current_index: usize,
    pub horizontal_progress: f64,
    pub control_released: bool,
    pub transition_duration_ms: u64,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            current_index: 0,
            horizontal_progress: 0.0,
            control_released: false,
            transition_duration_ms: 0,
        }
    }
}

/// Outcome of applying a move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Horizontal progress changed within the current item
    Progressed { from: f64, to: f64 },
    /// Moved one item forward or back
    Advanced { from: usize, to: usize },
    /// Ran off the end of the deck; native scroll takes over
    Released,
    /// At the start of the deck going backward; nothing to do
    Yielded,
    /// Already clamped at a horizontal edge
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ScrollStateMachine {
    items: Vec<SnapItem>,
    state: EngineState,
    tolerance: f64,
    /// Entered backward before the width was known; jump to the end once it is
    enter_at_end: bool,
}

impl ScrollStateMachine {
    pub fn new(items: Vec<SnapItem>, tolerance: f64) -> Self {
        Self {
            items,
            state: EngineState::default(),
            tolerance: tolerance.max(0.0),
            enter_at_end: false,
        }
    }

    #[inline]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    #[inline]
    pub fn items(&self) -> &[SnapItem] {
        &self.items
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_item(&self) -> Option<&SnapItem> {
        self.items.get(self.state.current_index)
    }

    #[inline]
    fn last_index(&self) -> usize {
        self.items.len().saturating_sub(1)
    }

    /// Scroll extent of the current item, `None` if it behaves as simple.
    ///
    /// A horizontal item whose width resolved to zero is treated as simple.
    pub fn horizontal_extent(&self, geometry: &GeometryOracle) -> Option<f64> {
        let item = self.current_item()?;
        if !item.is_horizontal() {
            return None;
        }
        let max = geometry.effective_max(&item.id);
        (max > 0.0).then_some(max)
    }

    pub fn at_forward_edge(&self, geometry: &GeometryOracle) -> bool {
        match self.horizontal_extent(geometry) {
            Some(max) => self.state.horizontal_progress >= max - self.tolerance,
            None => true,
        }
    }

    pub fn at_backward_edge(&self, geometry: &GeometryOracle) -> bool {
        match self.horizontal_extent(geometry) {
            Some(_) => self.state.horizontal_progress <= self.tolerance,
            None => true,
        }
    }

    /// Whether native scroll should handle input in `direction` untouched
    pub fn should_pass_through(&self, direction: Direction, geometry: &GeometryOracle) -> bool {
        if self.is_empty() {
            return true;
        }
        match direction {
            Direction::Forward => {
                self.state.current_index == self.last_index() && self.at_forward_edge(geometry)
            }
            Direction::Backward => {
                self.state.current_index == 0 && self.at_backward_edge(geometry)
            }
        }
    }

    /// Apply a vertical snap of `distance` units
    pub fn apply_snap(
        &mut self,
        direction: Direction,
        distance: f64,
        transition: Duration,
        geometry: &GeometryOracle,
    ) -> Step {
        if self.is_empty() || self.state.control_released {
            return Step::Unchanged;
        }
        let distance = if distance.is_finite() { distance.abs() } else { 0.0 };
        let extent = self.horizontal_extent(geometry);
        let progress = self.state.horizontal_progress;

        let step = match direction {
            Direction::Forward => match extent {
                Some(max) if progress < max - self.tolerance => {
                    self.move_progress(progress + distance, max)
                }
                _ if self.state.current_index < self.last_index() => {
                    self.move_index(self.state.current_index + 1, direction, geometry)
                }
                _ => {
                    self.state.control_released = true;
                    Step::Released
                }
            },
            Direction::Backward => match extent {
                Some(max) if progress > self.tolerance => {
                    self.move_progress(progress - distance, max)
                }
                _ if self.state.current_index > 0 => {
                    self.move_index(self.state.current_index - 1, direction, geometry)
                }
                _ => Step::Yielded,
            },
        };

        if !matches!(step, Step::Yielded | Step::Unchanged) {
            self.state.transition_duration_ms = transition.as_millis() as u64;
        }
        step
    }

    /// Move within the current horizontal item only, clamping at both edges
    pub fn step_horizontal(
        &mut self,
        direction: Direction,
        distance: f64,
        transition: Duration,
        geometry: &GeometryOracle,
    ) -> Step {
        if self.state.control_released {
            return Step::Unchanged;
        }
        let Some(max) = self.horizontal_extent(geometry) else {
            return Step::Unchanged;
        };
        let distance = if distance.is_finite() { distance.abs() } else { 0.0 };
        let target = self.state.horizontal_progress + direction.sign() * distance;
        let step = self.move_progress(target, max);
        if step != Step::Unchanged {
            self.state.transition_duration_ms = transition.as_millis() as u64;
        }
        step
    }

    /// Jump straight to a position, clamped
    pub fn seek(&mut self, index: usize, progress: f64, geometry: &GeometryOracle) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let from = self.state.current_index;
        self.set_index(index);
        self.enter_at_end = false;
        let max = self.horizontal_extent(geometry).unwrap_or(0.0);
        self.set_progress(progress, max);
        self.state.transition_duration_ms = 0;
        (from != self.state.current_index).then_some(from)
    }

    /// A width for the current item became known
    pub fn on_width_resolved(&mut self, geometry: &GeometryOracle) -> Option<Step> {
        let from = self.state.horizontal_progress;
        let max = self.horizontal_extent(geometry).unwrap_or(0.0);
        let target = if std::mem::take(&mut self.enter_at_end) {
            max
        } else {
            from
        };
        self.set_progress(target, max);
        let to = self.state.horizontal_progress;
        (to != from).then_some(Step::Progressed { from, to })
    }

    pub fn release(&mut self) {
        self.state.control_released = true;
    }

    pub fn resume(&mut self) {
        self.state.control_released = false;
    }

    fn move_progress(&mut self, target: f64, max: f64) -> Step {
        let from = self.state.horizontal_progress;
        self.enter_at_end = false;
        self.set_progress(target, max);
        let to = self.state.horizontal_progress;
        if to == from {
            Step::Unchanged
        } else {
            Step::Progressed { from, to }
        }
    }

    fn move_index(&mut self, to: usize, direction: Direction, geometry: &GeometryOracle) -> Step {
        let from = self.state.current_index;
        self.set_index(to);
        self.enter_at_end = false;

        let progress = match direction {
            Direction::Forward => 0.0,
            Direction::Backward => match self.current_item() {
                Some(item) if item.is_horizontal() => match geometry.max_scroll(&item.id) {
                    Some(max) => max,
                    None => {
                        self.enter_at_end = true;
                        0.0
                    }
                },
                _ => 0.0,
            },
        };
        let max = match self.current_item() {
            Some(item) if item.is_horizontal() => geometry.max_scroll(&item.id).unwrap_or(0.0),
            _ => 0.0,
        };
        self.set_progress(progress, max);

        Step::Advanced {
            from,
            to: self.state.current_index,
        }
    }

    fn set_index(&mut self, index: usize) {
        self.state.current_index = index.min(self.last_index());
    }

    fn set_progress(&mut self, value: f64, max: f64) {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        let value = if value.is_finite() { value } else { 0.0 };
        self.state.horizontal_progress = value.clamp(0.0, max);
    }
}
