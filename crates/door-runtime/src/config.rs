//! Door configuration

use std::time::Duration;

/// Timed door configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoorConfig {
    /// Maximum time the door may stay open
    pub grace_period: Duration,
    /// Arm a timer thread on every `open()`
    pub arm_on_open: bool,
    /// Name given to timer threads
    pub timer_thread_name: String,
}

impl Default for DoorConfig {
    fn default() -> Self {
        DoorConfig {
            grace_period: Duration::from_secs(5),
            arm_on_open: true,
            timer_thread_name: "door-timer".to_string(),
        }
    }
}

impl DoorConfig {
    /// Default configuration with a custom grace period
    pub fn with_grace_period(grace_period: Duration) -> Self {
        DoorConfig {
            grace_period,
            ..Self::default()
        }
    }

    /// Configuration for doors whose timers are driven by hand:
    /// `open()` flips state but arms nothing.
    pub fn disarmed() -> Self {
        DoorConfig {
            arm_on_open: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DoorConfig::default();
        assert_eq!(config.grace_period, Duration::from_secs(5));
        assert!(config.arm_on_open);
        assert_eq!(config.timer_thread_name, "door-timer");
    }

    #[test]
    fn test_presets() {
        let config = DoorConfig::with_grace_period(Duration::ZERO);
        assert_eq!(config.grace_period, Duration::ZERO);
        assert!(config.arm_on_open);

        assert!(!DoorConfig::disarmed().arm_on_open);
    }
}
