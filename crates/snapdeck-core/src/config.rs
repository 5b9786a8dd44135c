use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log file lives here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Tuning for the scroll-snap engine.
///
/// Every constant the engine uses lives here so it can be re-tuned per
/// device without touching the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Multiplier applied to raw wheel deltas
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: f64,
    /// Extra gain applied to touch deltas on top of `scroll_speed`
    #[serde(default = "default_touch_gain")]
    pub touch_gain: f64,
    /// Distance thresholds for the medium speed band
    #[serde(default)]
    pub snap_threshold: SnapThreshold,
    #[serde(default)]
    pub gesture: GestureTuning,
    #[serde(default)]
    pub momentum: MomentumTuning,
    #[serde(default)]
    pub geometry: GeometryTuning,
    /// Distance from a horizontal edge that still counts as "at the edge"
    #[serde(default = "default_boundary_tolerance")]
    pub boundary_tolerance: f64,
    /// Units moved per arrow key press
    #[serde(default = "default_keyboard_step")]
    pub keyboard_step: f64,
    /// Wheel handling strategy; "auto" probes the platform once
    #[serde(default)]
    pub input_strategy: StrategyChoice,
    /// Force pointer capability instead of probing (arrow left/right need it)
    #[serde(default)]
    pub pointer_capable: Option<bool>,
    #[serde(default)]
    pub handoff: HandoffConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scroll_speed: default_scroll_speed(),
            touch_gain: default_touch_gain(),
            snap_threshold: SnapThreshold::default(),
            gesture: GestureTuning::default(),
            momentum: MomentumTuning::default(),
            geometry: GeometryTuning::default(),
            boundary_tolerance: default_boundary_tolerance(),
            keyboard_step: default_keyboard_step(),
            input_strategy: StrategyChoice::default(),
            pointer_capable: None,
            handoff: HandoffConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Effective multiplier for touch deltas
    pub fn touch_multiplier(&self) -> f64 {
        self.scroll_speed * self.touch_gain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapThreshold {
    #[serde(default = "default_threshold_min")]
    pub min: f64,
    #[serde(default = "default_threshold_max")]
    pub max: f64,
}

impl Default for SnapThreshold {
    fn default() -> Self {
        Self {
            min: default_threshold_min(),
            max: default_threshold_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureTuning {
    /// A gap longer than this between samples starts a new interaction
    #[serde(default = "default_reset_gap_ms")]
    pub reset_gap_ms: u64,
    /// Quiet period after the last wheel sample before finalizing
    #[serde(default = "default_wheel_quiet_ms")]
    pub wheel_quiet_ms: u64,
    /// Quiet period after which a paused touch drag finalizes
    #[serde(default = "default_touch_quiet_ms")]
    pub touch_quiet_ms: u64,
    /// Gestures shorter than this are fast flicks
    #[serde(default = "default_fast_max_ms")]
    pub fast_max_ms: u64,
    /// Gestures at least this long are slow scrolls
    #[serde(default = "default_slow_min_ms")]
    pub slow_min_ms: u64,
    /// Distance needed by a fast flick
    #[serde(default = "default_fast_threshold")]
    pub fast_threshold: f64,
    /// Fraction of `snap_threshold.min` needed by a slow scroll
    #[serde(default = "default_slow_threshold_factor")]
    pub slow_threshold_factor: f64,
    #[serde(default = "default_fast_transition_ms")]
    pub fast_transition_ms: u64,
    #[serde(default = "default_medium_transition_ms")]
    pub medium_transition_ms: u64,
    #[serde(default = "default_slow_transition_ms")]
    pub slow_transition_ms: u64,
    #[serde(default = "default_keyboard_transition_ms")]
    pub keyboard_transition_ms: u64,
    /// Force-finalize after this many quiet periods without an ending event
    #[serde(default = "default_watchdog_factor")]
    pub watchdog_factor: f64,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            reset_gap_ms: default_reset_gap_ms(),
            wheel_quiet_ms: default_wheel_quiet_ms(),
            touch_quiet_ms: default_touch_quiet_ms(),
            fast_max_ms: default_fast_max_ms(),
            slow_min_ms: default_slow_min_ms(),
            fast_threshold: default_fast_threshold(),
            slow_threshold_factor: default_slow_threshold_factor(),
            fast_transition_ms: default_fast_transition_ms(),
            medium_transition_ms: default_medium_transition_ms(),
            slow_transition_ms: default_slow_transition_ms(),
            keyboard_transition_ms: default_keyboard_transition_ms(),
            watchdog_factor: default_watchdog_factor(),
        }
    }
}

impl GestureTuning {
    pub fn reset_gap(&self) -> Duration {
        Duration::from_millis(self.reset_gap_ms)
    }

    pub fn wheel_quiet(&self) -> Duration {
        Duration::from_millis(self.wheel_quiet_ms)
    }

    pub fn touch_quiet(&self) -> Duration {
        Duration::from_millis(self.touch_quiet_ms)
    }

    /// Ceiling after which an interaction with no ending event is force-finalized
    pub fn watchdog(&self, quiet: Duration) -> Duration {
        quiet.mul_f64(self.watchdog_factor.max(1.0))
    }
}

/// Trackpad momentum tail detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumTuning {
    /// Raw |delta| below this counts as a momentum-sized event
    #[serde(default = "default_small_delta")]
    pub small_delta: f64,
    /// Consecutive small events needed before the tail is recognized
    #[serde(default = "default_tail_min_events")]
    pub tail_min_events: u32,
}

impl Default for MomentumTuning {
    fn default() -> Self {
        Self {
            small_delta: default_small_delta(),
            tail_min_events: default_tail_min_events(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryTuning {
    /// Retry offsets from activation, in milliseconds
    #[serde(default = "default_retry_schedule_ms")]
    pub retry_schedule_ms: Vec<u64>,
    /// Measurements at or below this are treated as "not laid out yet"
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f64,
    /// Width used once every retry has failed
    #[serde(default = "default_fallback_width")]
    pub fallback_width: f64,
    /// Delay before re-measuring after a viewport resize
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
}

impl Default for GeometryTuning {
    fn default() -> Self {
        Self {
            retry_schedule_ms: default_retry_schedule_ms(),
            noise_floor: default_noise_floor(),
            fallback_width: default_fallback_width(),
            resize_debounce_ms: default_resize_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// Identifier of the section scrolled into view on release
    #[serde(default = "default_handoff_target")]
    pub target: String,
    /// Delay between release and the native scroll request
    #[serde(default = "default_handoff_delay_ms")]
    pub delay_ms: u64,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            target: default_handoff_target(),
            delay_ms: default_handoff_delay_ms(),
        }
    }
}

/// Wheel strategy selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyChoice {
    #[default]
    Auto,
    Direct,
    MomentumAware,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds when idle
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while a transition is animating
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Easing curve for slide transitions
    #[serde(default)]
    pub easing: EasingType,
    /// Engine units represented by one terminal column
    #[serde(default = "default_cell_width_units")]
    pub cell_width_units: f64,
    /// Synthetic deltaY for one terminal wheel notch
    #[serde(default = "default_terminal_wheel_delta")]
    pub terminal_wheel_delta: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            easing: EasingType::default(),
            cell_width_units: default_cell_width_units(),
            terminal_wheel_delta: default_terminal_wheel_delta(),
        }
    }
}

/// Easing curve used by the render layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    EaseOut,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapdeck")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_scroll_speed() -> f64 {
    0.45
}

fn default_touch_gain() -> f64 {
    8.0 // touch frames report much smaller deltas than wheel notches
}

fn default_threshold_min() -> f64 {
    100.0
}

fn default_threshold_max() -> f64 {
    400.0
}

fn default_reset_gap_ms() -> u64 {
    180
}

fn default_wheel_quiet_ms() -> u64 {
    120
}

fn default_touch_quiet_ms() -> u64 {
    80
}

fn default_fast_max_ms() -> u64 {
    120
}

fn default_slow_min_ms() -> u64 {
    300
}

fn default_fast_threshold() -> f64 {
    30.0
}

fn default_slow_threshold_factor() -> f64 {
    0.65
}

fn default_fast_transition_ms() -> u64 {
    800
}

fn default_medium_transition_ms() -> u64 {
    650
}

fn default_slow_transition_ms() -> u64 {
    700
}

fn default_keyboard_transition_ms() -> u64 {
    600
}

fn default_watchdog_factor() -> f64 {
    3.0
}

fn default_small_delta() -> f64 {
    4.0
}

fn default_tail_min_events() -> u32 {
    15
}

fn default_retry_schedule_ms() -> Vec<u64> {
    vec![100, 300, 500, 800, 1200, 2000]
}

fn default_noise_floor() -> f64 {
    10.0
}

fn default_fallback_width() -> f64 {
    500.0
}

fn default_resize_debounce_ms() -> u64 {
    150
}

fn default_boundary_tolerance() -> f64 {
    15.0
}

fn default_keyboard_step() -> f64 {
    100.0
}

fn default_handoff_target() -> String {
    "after-deck".to_string()
}

fn default_handoff_delay_ms() -> u64 {
    100
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_cell_width_units() -> f64 {
    8.0
}

fn default_terminal_wheel_delta() -> f64 {
    100.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Render configuration as pretty TOML
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/snapdeck/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("snapdeck")
            .join("config.toml")
    }

    /// Get the log file path used by the interactive deck
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("snapdeck.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_config() {
        let config = EngineConfig::default();
        assert_eq!(config.snap_threshold, SnapThreshold { min: 100.0, max: 400.0 });
        assert_eq!(config.gesture.reset_gap_ms, 180);
        assert_eq!(config.geometry.retry_schedule_ms, vec![100, 300, 500, 800, 1200, 2000]);
        assert_eq!(config.input_strategy, StrategyChoice::Auto);
        assert!((config.touch_multiplier() - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [engine]
            scroll_speed = 0.5
            input_strategy = "momentum_aware"

            [engine.snap_threshold]
            min = 80.0

            [ui]
            easing = "quintic"
            "#,
        )
        .unwrap();

        assert!((config.engine.scroll_speed - 0.5).abs() < 1e-9);
        assert_eq!(config.engine.input_strategy, StrategyChoice::MomentumAware);
        assert!((config.engine.snap_threshold.min - 80.0).abs() < 1e-9);
        assert!((config.engine.snap_threshold.max - 400.0).abs() < 1e-9);
        assert_eq!(config.ui.easing, EasingType::Quintic);
        assert_eq!(config.engine.handoff.target, "after-deck");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("engine = 3").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_watchdog_never_shorter_than_quiet() {
        let tuning = GestureTuning {
            watchdog_factor: 0.5,
            ..Default::default()
        };
        let quiet = Duration::from_millis(100);
        assert_eq!(tuning.watchdog(quiet), quiet);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.engine.keyboard_step, config.engine.keyboard_step);
    }
}
