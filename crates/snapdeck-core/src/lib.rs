pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod item;
pub mod machine;
pub mod render;
pub mod trace;

pub use config::{AppConfig, EasingType, EngineConfig, UiConfig};
pub use engine::{EngineEvent, SnapEngine};
pub use env::{Environment, ScriptedEnvironment, ScrollExtent};
pub use error::{Error, Result};
pub use input::{Capabilities, InputDisposition, InputStrategy, Key, TouchPoint, WheelEvent};
pub use item::{ItemKind, Panel, PanelProps, SnapItem};
pub use machine::EngineState;
pub use render::{layout, DeckLayout, Placement};
