//! The scroll-snap engine: wires the input normalizer, gesture classifier,
//! geometry oracle and state machine together.
//!
//! The engine is single-threaded and clock-agnostic. Hosts pass event
//! timestamps as `Duration`s since any fixed epoch and call `tick` whenever
//! `next_deadline` passes (or simply every frame) so debounced finalization,
//! measurement retries and the native-scroll handoff can fire.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::env::Environment;
use crate::geometry::{GeometryOracle, ResolvedWidth, WidthSource};
use crate::gesture::{Classification, GestureAccumulator, GestureClassifier, SnapDecision};
use crate::input::{
    key_step, normalize_wheel, Axis, Capabilities, Direction, GestureSample, InputDisposition,
    InputSource, InputStrategy, Key, KeyStep, TouchPoint, TouchTracker, WheelAction, WheelEvent,
    WheelHandler,
};
use crate::item::{validate_items, PanelProps, SnapItem};
use crate::machine::{EngineState, ScrollStateMachine, Step};
use crate::Result;

/// Notable things the engine did, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    IndexChanged { from: usize, to: usize },
    ProgressChanged { index: usize, from: f64, to: f64 },
    /// A gesture ended without enough travel
    RubberBand { distance: f64 },
    ControlReleased,
    ControlResumed,
    HandoffRequested { target: String },
    WidthResolved { item_id: String, width: f64, source: WidthSource },
}

pub struct SnapEngine {
    config: EngineConfig,
    capabilities: Capabilities,
    strategy: InputStrategy,
    machine: ScrollStateMachine,
    geometry: GeometryOracle,
    classifier: GestureClassifier,
    accumulator: GestureAccumulator,
    wheel: WheelHandler,
    touch: TouchTracker,
    transition_until: Option<Duration>,
    handoff_at: Option<Duration>,
    left_view_since_release: bool,
    events: Vec<EngineEvent>,
    index_observer: Option<Box<dyn FnMut(usize)>>,
}

impl fmt::Debug for SnapEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapEngine")
            .field("strategy", &self.strategy)
            .field("state", self.machine.state())
            .field("interaction_active", &self.is_interaction_active())
            .finish_non_exhaustive()
    }
}

impl SnapEngine {
    /// Create an engine for `items`, probing the host platform
    pub fn new(items: Vec<SnapItem>, config: EngineConfig) -> Result<Self> {
        Self::with_capabilities(items, config, Capabilities::detect())
    }

    pub fn with_capabilities(
        items: Vec<SnapItem>,
        config: EngineConfig,
        capabilities: Capabilities,
    ) -> Result<Self> {
        validate_items(&items)?;

        let capabilities = capabilities.with_pointer_override(config.pointer_capable);
        let strategy = capabilities.strategy(config.input_strategy);
        tracing::debug!(?strategy, items = items.len(), "creating snap engine");

        Ok(Self {
            machine: ScrollStateMachine::new(items, config.boundary_tolerance),
            geometry: GeometryOracle::new(config.geometry.clone()),
            classifier: GestureClassifier::new(config.snap_threshold, config.gesture.clone()),
            accumulator: GestureAccumulator::new(),
            wheel: WheelHandler::for_strategy(strategy),
            touch: TouchTracker::new(),
            transition_until: None,
            handoff_at: None,
            left_view_since_release: false,
            events: Vec::new(),
            index_observer: None,
            capabilities,
            strategy,
            config,
        })
    }

    /// Register the one-way index observer
    pub fn set_index_observer(&mut self, observer: impl FnMut(usize) + 'static) {
        self.index_observer = Some(Box::new(observer));
    }

    /// Start measuring the initial item; call once after mounting
    pub fn mount(&mut self, now: Duration, env: &dyn Environment) {
        self.activate_current(now, env);
    }

    #[inline]
    pub fn state(&self) -> &EngineState {
        self.machine.state()
    }

    #[inline]
    pub fn items(&self) -> &[SnapItem] {
        self.machine.items()
    }

    #[inline]
    pub fn strategy(&self) -> InputStrategy {
        self.strategy
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_item(&self) -> Option<&SnapItem> {
        self.machine.current_item()
    }

    /// Cached scroll extent of an item, `None` while unknown
    pub fn max_scroll(&self, item_id: &str) -> Option<f64> {
        self.geometry.max_scroll(item_id)
    }

    /// Extent used for the current item, zero when it behaves as simple
    pub fn current_extent(&self) -> f64 {
        self.machine.horizontal_extent(&self.geometry).unwrap_or(0.0)
    }

    pub fn is_interaction_active(&self) -> bool {
        self.accumulator.is_active() || self.touch.is_active()
    }

    pub fn is_transitioning(&self, now: Duration) -> bool {
        self.transition_until.is_some_and(|until| now < until)
    }

    /// Props for the active panel, `None` unless it is a horizontal item
    pub fn panel_props(&self) -> Option<PanelProps> {
        let item = self.machine.current_item()?;
        item.is_horizontal().then(|| PanelProps {
            horizontal_progress: self.machine.state().horizontal_progress,
            is_interaction_active: self.is_interaction_active(),
        })
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Earliest time `tick` has work to do
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.accumulator.next_deadline(self.watchdog()),
            self.geometry.next_deadline(),
            self.handoff_at,
            self.transition_until,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn on_wheel(&mut self, event: WheelEvent, env: &mut dyn Environment) -> InputDisposition {
        let now = event.timestamp;
        if self.machine.is_empty() {
            return InputDisposition::PassThrough;
        }

        let sample = normalize_wheel(&event, self.config.scroll_speed);

        if self.machine.state().control_released {
            let backward = sample
                .filter(|s| s.axis == Axis::Vertical)
                .and_then(|s| s.direction())
                == Some(Direction::Backward);
            self.check_reentry(backward, env);
            if self.machine.state().control_released {
                return InputDisposition::PassThrough;
            }
        }

        if self.touch.is_active() {
            tracing::trace!("wheel suppressed while touch is active");
            return InputDisposition::Captured;
        }

        let Some(sample) = sample else {
            return InputDisposition::Captured;
        };

        if self.is_transitioning(now) {
            self.wheel
                .note_timestamp(now, self.config.gesture.reset_gap());
            return InputDisposition::Captured;
        }

        if sample.axis == Axis::Horizontal && self.machine.horizontal_extent(&self.geometry).is_none() {
            return InputDisposition::PassThrough;
        }

        if let Some(disposition) = self.boundary_passthrough(&sample, now) {
            return disposition;
        }

        let reset_gap = self.config.gesture.reset_gap();
        match self.wheel.observe(&sample, &self.config.momentum, reset_gap) {
            WheelAction::Drop => {}
            WheelAction::Accumulate => {
                self.accumulator.push(&sample, reset_gap);
                self.accumulator.arm(now + self.config.gesture.wheel_quiet());
            }
            WheelAction::LockIn => {
                self.accumulator.push(&sample, reset_gap);
                self.accumulator.lock(now + self.config.gesture.wheel_quiet());
            }
        }
        InputDisposition::Captured
    }

    pub fn on_touch_start(&mut self, point: TouchPoint) -> InputDisposition {
        if self.machine.is_empty() {
            return InputDisposition::PassThrough;
        }
        if self.touch.begin(point) {
            self.accumulator.reset();
            self.wheel.reset();
        }
        // Never cancel touchstart; it would swallow taps
        InputDisposition::PassThrough
    }

    pub fn on_touch_move(&mut self, point: TouchPoint, env: &mut dyn Environment) -> InputDisposition {
        let now = point.timestamp;
        if self.machine.is_empty() {
            return InputDisposition::PassThrough;
        }
        let origin = self.touch.started_at();
        let Some(sample) = self.touch.movement(point, self.config.touch_multiplier()) else {
            return if self.machine.state().control_released {
                InputDisposition::PassThrough
            } else {
                InputDisposition::Captured
            };
        };

        if self.machine.state().control_released {
            let backward =
                sample.axis == Axis::Vertical && sample.direction() == Some(Direction::Backward);
            self.check_reentry(backward, env);
            if self.machine.state().control_released {
                return InputDisposition::PassThrough;
            }
        }

        if self.is_transitioning(now) {
            return InputDisposition::Captured;
        }

        if sample.axis == Axis::Horizontal && self.machine.horizontal_extent(&self.geometry).is_none() {
            return InputDisposition::PassThrough;
        }

        if let Some(disposition) = self.boundary_passthrough(&sample, now) {
            return disposition;
        }

        if self.accumulator.push(&sample, self.config.gesture.reset_gap()) {
            if let Some(origin) = origin {
                self.accumulator.set_origin(origin);
            }
        }
        self.accumulator.arm(now + self.config.gesture.touch_quiet());
        InputDisposition::Captured
    }

    pub fn on_touch_end(&mut self, timestamp: Duration, env: &mut dyn Environment) {
        if self.touch.end().is_none() {
            return;
        }
        if self.accumulator.source() == Some(InputSource::Touch) {
            self.finalize(timestamp, Some(timestamp), env);
        }
    }

    pub fn on_touch_cancel(&mut self) {
        self.touch.cancel();
        if self.accumulator.source() == Some(InputSource::Touch) {
            self.accumulator.reset();
        }
    }

    pub fn on_key(&mut self, key: Key, timestamp: Duration, env: &mut dyn Environment) -> InputDisposition {
        let now = timestamp;
        if self.machine.is_empty() {
            return InputDisposition::PassThrough;
        }
        let Some(step) = key_step(key) else {
            return InputDisposition::PassThrough;
        };

        if self.machine.state().control_released {
            self.check_reentry(step == KeyStep::Vertical(Direction::Backward), env);
            if self.machine.state().control_released {
                return InputDisposition::PassThrough;
            }
        }

        if self.is_transitioning(now) {
            return InputDisposition::Captured;
        }

        let transition = Duration::from_millis(self.config.gesture.keyboard_transition_ms);
        let distance = self.config.keyboard_step;

        match step {
            KeyStep::Vertical(direction) => {
                if self.machine.should_pass_through(direction, &self.geometry) {
                    if direction == Direction::Forward {
                        self.release(now);
                    }
                    return InputDisposition::PassThrough;
                }
                self.accumulator.reset();
                let step = self
                    .machine
                    .apply_snap(direction, distance, transition, &self.geometry);
                self.after_step(step, transition, now, env);
                InputDisposition::Captured
            }
            KeyStep::Horizontal(direction) => {
                if !self.capabilities.pointer_capable
                    || self.machine.horizontal_extent(&self.geometry).is_none()
                {
                    return InputDisposition::PassThrough;
                }
                let step = self
                    .machine
                    .step_horizontal(direction, distance, transition, &self.geometry);
                self.after_step(step, transition, now, env);
                InputDisposition::Captured
            }
        }
    }

    /// Viewport resized: every measured width is stale
    pub fn on_resize(&mut self, now: Duration) {
        let current = self.machine.current_item().cloned();
        self.geometry.invalidate_all(now, current.as_ref());
        tracing::debug!("viewport resized, scroll widths invalidated");
    }

    /// The native document scrolled; may re-arm a released engine
    pub fn on_viewport_scroll(&mut self, env: &mut dyn Environment) {
        self.check_reentry(false, env);
    }

    /// Authoritative width reported by a panel
    pub fn push_measurement(&mut self, item_id: &str, width: f64) {
        if !self.items().iter().any(|item| item.id == item_id) {
            tracing::debug!(item = %item_id, "ignoring measurement for unknown item");
            return;
        }
        let resolved = self.geometry.push_measurement(item_id, width);
        self.on_width(resolved);
    }

    /// Jump directly to a position, clamped to the deck
    pub fn seek(&mut self, index: usize, progress: f64, now: Duration, env: &dyn Environment) {
        self.accumulator.reset();
        let from = self.machine.seek(index, progress, &self.geometry);
        if let Some(from) = from {
            let to = self.machine.state().current_index;
            self.notify_index(from, to);
            self.activate_current(now, env);
            // Re-clamp against a width that may have resolved on activation
            let _ = self.machine.seek(to, progress, &self.geometry);
        }
    }

    /// Run everything that has become due
    pub fn tick(&mut self, now: Duration, env: &mut dyn Environment) {
        let current_id = self.machine.current_item().map(|item| item.id.clone());
        if let Some(resolved) = self.geometry.poll(now, current_id.as_deref(), env) {
            self.on_width(resolved);
        }

        if self.accumulator.is_due(now, self.watchdog()) {
            self.finalize(now, None, env);
        }

        if self.transition_until.is_some_and(|until| now >= until) {
            self.transition_until = None;
        }

        if self.handoff_at.is_some_and(|at| now >= at) {
            self.handoff_at = None;
            let target = self.config.handoff.target.clone();
            if self.machine.state().control_released && !env.is_element_visible(&target) {
                tracing::debug!(%target, "scrolling next section into view");
                env.scroll_into_view(&target);
                self.events.push(EngineEvent::HandoffRequested { target });
            }
        }

        if self.machine.state().control_released {
            self.check_reentry(false, env);
        }
    }

    /// Apply a classified decision as if a gesture had produced it
    pub fn apply_decision(&mut self, decision: SnapDecision, now: Duration, env: &dyn Environment) {
        let step = match decision.axis {
            Axis::Vertical => self.machine.apply_snap(
                decision.direction,
                decision.distance,
                decision.transition,
                &self.geometry,
            ),
            Axis::Horizontal => self.machine.step_horizontal(
                decision.direction,
                decision.distance,
                decision.transition,
                &self.geometry,
            ),
        };
        self.after_step(step, decision.transition, now, env);
    }

    fn watchdog(&self) -> Duration {
        let quiet = match self.accumulator.source() {
            Some(InputSource::Touch) => self.config.gesture.touch_quiet(),
            _ => self.config.gesture.wheel_quiet(),
        };
        self.config.gesture.watchdog(quiet)
    }

    /// Pass-through at either end of the deck for a fresh interaction.
    ///
    /// Running off the end releases control; running off the start just yields.
    fn boundary_passthrough(&mut self, sample: &GestureSample, now: Duration) -> Option<InputDisposition> {
        if sample.axis != Axis::Vertical
            || self.accumulator.continues(sample, self.config.gesture.reset_gap())
        {
            return None;
        }
        let direction = sample.direction()?;
        if !self.machine.should_pass_through(direction, &self.geometry) {
            return None;
        }
        if direction == Direction::Forward {
            self.release(now);
        }
        Some(InputDisposition::PassThrough)
    }

    fn finalize(&mut self, now: Duration, end: Option<Duration>, env: &dyn Environment) {
        let Some(gesture) = self.accumulator.take(end) else {
            return;
        };
        if gesture.source == InputSource::Wheel {
            self.wheel.on_finalized();
        }

        match self.classifier.classify(&gesture) {
            Classification::Snap(decision) => {
                tracing::debug!(
                    direction = ?decision.direction,
                    distance = decision.distance,
                    speed = ?decision.speed,
                    elapsed_ms = gesture.elapsed.as_millis() as u64,
                    momentum = gesture.momentum_locked,
                    "gesture snapped"
                );
                self.apply_decision(decision, now, env);
            }
            Classification::RubberBand { speed, distance } => {
                tracing::trace!(?speed, distance, "gesture below threshold");
                self.events.push(EngineEvent::RubberBand { distance });
            }
        }
    }

    fn after_step(&mut self, step: Step, transition: Duration, now: Duration, env: &dyn Environment) {
        match step {
            Step::Progressed { from, to } => {
                let index = self.machine.state().current_index;
                tracing::debug!(index, from, to, "horizontal progress");
                self.events.push(EngineEvent::ProgressChanged { index, from, to });
                self.transition_until = Some(now + transition);
            }
            Step::Advanced { from, to } => {
                self.notify_index(from, to);
                self.transition_until = Some(now + transition);
                self.activate_current(now, env);
            }
            Step::Released => self.release(now),
            Step::Yielded | Step::Unchanged => {}
        }
    }

    fn release(&mut self, now: Duration) {
        self.machine.release();
        self.accumulator.reset();
        self.left_view_since_release = false;
        self.handoff_at = Some(now + Duration::from_millis(self.config.handoff.delay_ms));
        tracing::info!(index = self.machine.state().current_index, "releasing scroll control");
        self.events.push(EngineEvent::ControlReleased);
    }

    /// Re-arm once the container left view and came back, or when the user
    /// heads back into a container that never left.
    fn check_reentry(&mut self, backward_input: bool, env: &dyn Environment) {
        if !self.machine.state().control_released {
            return;
        }
        if !env.is_container_in_view() {
            self.left_view_since_release = true;
            return;
        }
        if self.left_view_since_release || backward_input {
            self.machine.resume();
            self.left_view_since_release = false;
            self.handoff_at = None;
            self.accumulator.reset();
            self.wheel.reset();
            tracing::info!(index = self.machine.state().current_index, "resuming scroll control");
            self.events.push(EngineEvent::ControlResumed);
        }
    }

    fn activate_current(&mut self, now: Duration, env: &dyn Environment) {
        let Some(item) = self.machine.current_item().cloned() else {
            return;
        };
        if let Some(resolved) = self.geometry.activate(&item, now, env) {
            self.on_width(resolved);
        }
    }

    fn on_width(&mut self, resolved: ResolvedWidth) {
        let is_current = self
            .machine
            .current_item()
            .is_some_and(|item| item.id == resolved.item_id);
        if is_current {
            if let Some(Step::Progressed { from, to }) = self.machine.on_width_resolved(&self.geometry) {
                let index = self.machine.state().current_index;
                self.events.push(EngineEvent::ProgressChanged { index, from, to });
            }
        }
        self.events.push(EngineEvent::WidthResolved {
            item_id: resolved.item_id,
            width: resolved.width,
            source: resolved.source,
        });
    }

    fn notify_index(&mut self, from: usize, to: usize) {
        tracing::debug!(from, to, "index changed");
        self.events.push(EngineEvent::IndexChanged { from, to });
        if let Some(observer) = self.index_observer.as_mut() {
            observer(to);
        }
    }
}
