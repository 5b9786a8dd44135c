//! Recorded input traces and deterministic replay.
//!
//! A trace is a JSON document listing the deck, the scroll extents the
//! scripted environment should report, and timestamped input events:
//!
//! ```json
//! {
//!   "items": [{ "id": "intro" }, { "id": "work", "kind": "horizontal_scroll" }],
//!   "extents": [{ "item_id": "work", "scroll_width": 1200, "client_width": 400 }],
//!   "events": [
//!     { "t_ms": 0, "type": "wheel", "delta_y": 50 },
//!     { "t_ms": 300, "type": "key", "key": "arrow_down" }
//!   ]
//! }
//! ```
//!
//! Replay runs every timer that falls due between two events at its exact
//! deadline, so the result does not depend on how fast the replay runs.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::engine::{EngineEvent, SnapEngine};
use crate::env::ScriptedEnvironment;
use crate::input::{Capabilities, InputDisposition, Key, TouchPoint, WheelEvent};
use crate::item::SnapItem;
use crate::machine::EngineState;
use crate::{Error, Result};

/// Guard against a timer that never clears
const MAX_TIMER_STEPS: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub items: Vec<SnapItem>,
    #[serde(default)]
    pub extents: Vec<TraceExtent>,
    pub events: Vec<TraceEvent>,
}

/// Scroll extent the scripted environment reports for an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceExtent {
    pub item_id: String,
    pub scroll_width: f64,
    pub client_width: f64,
    /// Number of failed measurements before the extent appears
    #[serde(default)]
    pub available_after: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub t_ms: u64,
    #[serde(flatten)]
    pub input: TraceInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceInput {
    Wheel {
        #[serde(default)]
        delta_x: f64,
        #[serde(default)]
        delta_y: f64,
    },
    TouchStart {
        x: f64,
        y: f64,
    },
    TouchMove {
        x: f64,
        y: f64,
    },
    TouchEnd,
    TouchCancel,
    Key {
        key: Key,
    },
    /// Viewport resize, optionally with the extents valid afterwards
    Resize {
        #[serde(default)]
        extents: Vec<TraceExtent>,
    },
    ViewportScroll {
        container_in_view: bool,
    },
    Measure {
        item_id: String,
        width: f64,
    },
}

impl Trace {
    pub fn from_json(content: &str) -> Result<Self> {
        let trace: Trace = serde_json::from_str(content)?;
        if trace.events.windows(2).any(|w| w[1].t_ms < w[0].t_ms) {
            return Err(Error::Other("trace events are not in time order".to_string()));
        }
        Ok(trace)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Time of the last recorded event
    pub fn duration(&self) -> Duration {
        self.events
            .last()
            .map(|e| Duration::from_millis(e.t_ms))
            .unwrap_or_default()
    }
}

/// One engine event stamped with the time it was emitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayEntry {
    pub t_ms: u64,
    #[serde(flatten)]
    pub event: EngineEvent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub entries: Vec<ReplayEntry>,
    pub final_state: EngineState,
    pub captured: usize,
    pub passed_through: usize,
}

/// Drives an engine through a trace one event at a time
pub struct Replayer {
    engine: SnapEngine,
    env: ScriptedEnvironment,
    log: Vec<ReplayEntry>,
    captured: usize,
    passed_through: usize,
}

impl Replayer {
    pub fn new(trace: &Trace, config: EngineConfig, capabilities: Capabilities) -> Result<Self> {
        let mut env = ScriptedEnvironment::new();
        apply_extents(&mut env, &trace.extents);

        let mut engine = SnapEngine::with_capabilities(trace.items.clone(), config, capabilities)?;
        engine.mount(Duration::ZERO, &env);

        let mut replayer = Self {
            engine,
            env,
            log: Vec::new(),
            captured: 0,
            passed_through: 0,
        };
        replayer.drain(0);
        Ok(replayer)
    }

    pub fn engine(&self) -> &SnapEngine {
        &self.engine
    }

    pub fn env(&self) -> &ScriptedEnvironment {
        &self.env
    }

    /// Run every timer due at or before `t_ms`
    pub fn advance_to(&mut self, t_ms: u64) {
        let target = Duration::from_millis(t_ms);
        for _ in 0..MAX_TIMER_STEPS {
            match self.engine.next_deadline() {
                Some(deadline) if deadline <= target => {
                    self.engine.tick(deadline, &mut self.env);
                    self.drain(deadline.as_millis() as u64);
                }
                _ => return,
            }
        }
        tracing::warn!(t_ms, "timer steps exhausted during replay");
    }

    /// Feed one recorded event, returning how the engine disposed of it
    pub fn apply(&mut self, event: &TraceEvent) -> Option<InputDisposition> {
        self.advance_to(event.t_ms);
        let now = Duration::from_millis(event.t_ms);
        let env = &mut self.env;

        let disposition = match &event.input {
            TraceInput::Wheel { delta_x, delta_y } => Some(self.engine.on_wheel(
                WheelEvent {
                    delta_x: *delta_x,
                    delta_y: *delta_y,
                    timestamp: now,
                },
                env,
            )),
            TraceInput::TouchStart { x, y } => {
                Some(self.engine.on_touch_start(TouchPoint::new(*x, *y, now)))
            }
            TraceInput::TouchMove { x, y } => {
                Some(self.engine.on_touch_move(TouchPoint::new(*x, *y, now), env))
            }
            TraceInput::TouchEnd => {
                self.engine.on_touch_end(now, env);
                None
            }
            TraceInput::TouchCancel => {
                self.engine.on_touch_cancel();
                None
            }
            TraceInput::Key { key } => Some(self.engine.on_key(*key, now, env)),
            TraceInput::Resize { extents } => {
                apply_extents(env, extents);
                self.engine.on_resize(now);
                None
            }
            TraceInput::ViewportScroll { container_in_view } => {
                env.set_container_in_view(*container_in_view);
                self.engine.on_viewport_scroll(env);
                None
            }
            TraceInput::Measure { item_id, width } => {
                self.engine.push_measurement(item_id, *width);
                None
            }
        };

        match disposition {
            Some(InputDisposition::Captured) => self.captured += 1,
            Some(InputDisposition::PassThrough) => self.passed_through += 1,
            None => {}
        }
        tracing::trace!(t_ms = event.t_ms, ?disposition, "replayed event");

        self.engine.tick(now, &mut self.env);
        self.drain(event.t_ms);
        disposition
    }

    /// Run all remaining timers
    pub fn settle(&mut self) {
        self.advance_to(u64::MAX / 2);
    }

    pub fn finish(mut self) -> ReplayReport {
        self.settle();
        ReplayReport {
            final_state: self.engine.state().clone(),
            entries: self.log,
            captured: self.captured,
            passed_through: self.passed_through,
        }
    }

    fn drain(&mut self, t_ms: u64) {
        self.log.extend(
            self.engine
                .drain_events()
                .into_iter()
                .map(|event| ReplayEntry { t_ms, event }),
        );
    }
}

/// Replay a whole trace and report what happened
pub fn replay(trace: &Trace, config: EngineConfig, capabilities: Capabilities) -> Result<ReplayReport> {
    let mut replayer = Replayer::new(trace, config, capabilities)?;
    for event in &trace.events {
        replayer.apply(event);
    }
    Ok(replayer.finish())
}

fn apply_extents(env: &mut ScriptedEnvironment, extents: &[TraceExtent]) {
    for extent in extents {
        env.set_extent(
            &extent.item_id,
            extent.scroll_width,
            extent.client_width,
            extent.available_after,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyChoice;
    use crate::input::Platform;

    const TRACE: &str = r#"{
        "items": [
            { "id": "intro" },
            { "id": "work", "kind": "horizontal_scroll" },
            { "id": "contact" }
        ],
        "extents": [{ "item_id": "work", "scroll_width": 550, "client_width": 400 }],
        "events": [
            { "t_ms": 0, "type": "wheel", "delta_y": 80 },
            { "t_ms": 1000, "type": "key", "key": "arrow_down" },
            { "t_ms": 2000, "type": "key", "key": "arrow_down" },
            { "t_ms": 3000, "type": "key", "key": "arrow_down" },
            { "t_ms": 3700, "type": "wheel", "delta_y": 80 }
        ]
    }"#;

    fn config() -> EngineConfig {
        EngineConfig {
            scroll_speed: 0.5,
            input_strategy: StrategyChoice::Direct,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_trace() {
        let trace = Trace::from_json(TRACE).unwrap();
        assert_eq!(trace.items.len(), 3);
        assert!(trace.items[1].is_horizontal());
        assert_eq!(trace.duration(), Duration::from_millis(3700));
        assert!(matches!(trace.events[1].input, TraceInput::Key { key: Key::ArrowDown }));
    }

    #[test]
    fn test_rejects_unordered_events() {
        let json = r#"{
            "items": [{ "id": "a" }],
            "events": [
                { "t_ms": 50, "type": "touch_end" },
                { "t_ms": 10, "type": "touch_end" }
            ]
        }"#;
        assert!(matches!(Trace::from_json(json), Err(Error::Other(_))));
    }

    #[test]
    fn test_replay_runs_timers_between_events() {
        let trace = Trace::from_json(TRACE).unwrap();
        let report = replay(&trace, config(), Capabilities::for_platform(Platform::Linux)).unwrap();

        // Wheel flick finalizes at 120ms, before the first key press
        let first = report
            .entries
            .iter()
            .find(|e| matches!(e.event, EngineEvent::IndexChanged { .. }))
            .unwrap();
        assert_eq!(first.t_ms, 120);
        assert_eq!(first.event, EngineEvent::IndexChanged { from: 0, to: 1 });

        // Two key presses walk the horizontal slide, the third leaves it
        assert_eq!(report.final_state.current_index, 2);
        assert!(report.final_state.control_released);
        assert_eq!(report.passed_through, 1);
        assert_eq!(report.captured, 4);
        assert!(report
            .entries
            .iter()
            .any(|e| e.event == EngineEvent::ControlReleased && e.t_ms == 3700));
        assert!(report.entries.iter().any(|e| e.t_ms == 3800
            && matches!(e.event, EngineEvent::HandoffRequested { .. })));
    }

    #[test]
    fn test_entries_serialize_flat() {
        let entry = ReplayEntry {
            t_ms: 5,
            event: EngineEvent::IndexChanged { from: 0, to: 1 },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["t_ms"], 5);
        assert_eq!(json["type"], "index_changed");
        assert_eq!(json["to"], 1);
    }
}
