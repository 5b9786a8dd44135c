//! One-time capability probe that picks the wheel strategy.

use crate::config::StrategyChoice;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Ios,
    Android,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "ios" => Platform::Ios,
            "android" => Platform::Android,
            _ => Platform::Other,
        }
    }

    /// Trackpads on this platform emit native momentum as wheel events
    pub fn emits_wheel_momentum(self) -> bool {
        matches!(self, Platform::MacOs)
    }

    fn is_touch_first(self) -> bool {
        matches!(self, Platform::Ios | Platform::Android)
    }
}

/// Wheel-handling algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStrategy {
    Direct,
    TrackpadMomentumAware,
}

/// What the host device can do, probed once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub platform: Platform,
    pub pointer_capable: bool,
}

impl Capabilities {
    pub fn detect() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            pointer_capable: !platform.is_touch_first(),
        }
    }

    /// Apply config overrides on top of the probe
    pub fn with_pointer_override(mut self, pointer_capable: Option<bool>) -> Self {
        if let Some(value) = pointer_capable {
            self.pointer_capable = value;
        }
        self
    }

    pub fn strategy(&self, choice: StrategyChoice) -> InputStrategy {
        match choice {
            StrategyChoice::Direct => InputStrategy::Direct,
            StrategyChoice::MomentumAware => InputStrategy::TrackpadMomentumAware,
            StrategyChoice::Auto if self.platform.emits_wheel_momentum() => {
                InputStrategy::TrackpadMomentumAware
            }
            StrategyChoice::Auto => InputStrategy::Direct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_probe() {
        let mac = Capabilities::for_platform(Platform::MacOs);
        assert_eq!(mac.strategy(StrategyChoice::Auto), InputStrategy::TrackpadMomentumAware);

        let linux = Capabilities::for_platform(Platform::Linux);
        assert_eq!(linux.strategy(StrategyChoice::Auto), InputStrategy::Direct);
        assert_eq!(
            linux.strategy(StrategyChoice::MomentumAware),
            InputStrategy::TrackpadMomentumAware
        );
    }

    #[test]
    fn test_pointer_capability() {
        assert!(!Capabilities::for_platform(Platform::Ios).pointer_capable);
        assert!(Capabilities::for_platform(Platform::Windows).pointer_capable);
        let forced = Capabilities::for_platform(Platform::Android).with_pointer_override(Some(true));
        assert!(forced.pointer_capable);
    }
}
