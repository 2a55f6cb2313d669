//! Read-only typed settings for the facade
//!
//! The facade never persists configuration; whoever owns the settings store
//! builds a [`NavigationConfig`] and hands it to the builder.

use std::time::Duration;

use nav_reference::DeliverySystem;
use serde::{Deserialize, Serialize};

/// Startup-to-standby policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartupToStandby {
    /// Always drop into standby shortly after boot.
    Yes,
    #[default]
    No,
    /// Only when the boot was caused by a wakeup timer.
    ExceptTimerWakeup,
}

/// What kind of timer the previously programmed wakeup belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WakeupTimeType {
    #[default]
    None,
    RecordTimer,
    ZapTimer,
    PowerTimer,
    WakeupTimer,
}

/// Tuner priority preferences, one optional override per broadcast standard.
///
/// `None` means the standard either has no dedicated priority tuner or the
/// preference is disabled; the global default slot is used then.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TunerPriorityConfig {
    pub default_slot: i32,
    pub terrestrial: Option<i32>,
    pub cable: Option<i32>,
    pub satellite: Option<i32>,
    pub atsc: Option<i32>,
}

impl TunerPriorityConfig {
    pub fn override_for(&self, delivery: DeliverySystem) -> Option<i32> {
        match delivery {
            DeliverySystem::Terrestrial => self.terrestrial,
            DeliverySystem::Cable => self.cable,
            DeliverySystem::Satellite => self.satellite,
            DeliverySystem::Atsc => self.atsc,
        }
    }
}

/// Configuration for the navigation facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Enable CI-alternative substitution for group members that are not
    /// playable under the active CI assignment.
    pub use_ci_assignment: bool,

    /// Relay-switch delay: when leaving a relay-substituted service, defer
    /// the next zap by this long so the relay can release the tuner.
    /// `None` disables the delay policy.
    pub stream_relay_delay: Option<Duration>,

    /// Longer delay used for the very first relay-switch deferral after
    /// construction.
    pub first_stream_relay_delay: Duration,

    /// Delay before retrying a failed start when the previous service was
    /// network-streamed.
    pub retry_delay: Duration,

    /// Local stream-relay endpoint, consumed by the relay collaborator.
    pub stream_relay_address: String,
    pub stream_relay_port: u16,

    pub tuner_priority: TunerPriorityConfig,

    /// This boot was a UI restart rather than a cold start.
    pub restart_ui: bool,

    pub startup_to_standby: StartupToStandby,

    /// Delay before the deferred standby entry fires.
    pub standby_delay: Duration,

    pub wakeup_time_type: WakeupTimeType,

    /// The wakeup time (unix seconds) that was programmed before the last
    /// shutdown, if any.
    pub prev_wakeup_time: Option<u64>,

    /// Import the channel list from the remote fallback receiver at boot.
    pub remote_fallback_import: bool,
    /// Variant of the import that runs on UI restarts too, taking
    /// precedence over `remote_fallback_import`.
    pub remote_fallback_import_restart: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            use_ci_assignment: false,
            stream_relay_delay: None,
            first_stream_relay_delay: Duration::from_millis(2000),
            retry_delay: Duration::from_millis(500),
            stream_relay_address: String::from("127.0.0.1"),
            stream_relay_port: 17999,
            tuner_priority: TunerPriorityConfig::default(),
            restart_ui: false,
            startup_to_standby: StartupToStandby::No,
            standby_delay: Duration::from_secs(15),
            wakeup_time_type: WakeupTimeType::None,
            prev_wakeup_time: None,
            remote_fallback_import: false,
            remote_fallback_import_restart: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_every_policy() {
        let config = NavigationConfig::default();
        assert!(!config.use_ci_assignment);
        assert!(config.stream_relay_delay.is_none());
        assert_eq!(config.startup_to_standby, StartupToStandby::No);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.standby_delay, Duration::from_secs(15));
    }

    #[test]
    fn tuner_override_lookup() {
        let priorities = TunerPriorityConfig {
            default_slot: 0,
            terrestrial: Some(2),
            cable: None,
            satellite: Some(1),
            atsc: None,
        };
        assert_eq!(priorities.override_for(DeliverySystem::Terrestrial), Some(2));
        assert_eq!(priorities.override_for(DeliverySystem::Cable), None);
        assert_eq!(priorities.override_for(DeliverySystem::Satellite), Some(1));
        assert_eq!(priorities.override_for(DeliverySystem::Atsc), None);
    }

    #[test]
    fn overriding_defaults_keeps_the_rest() {
        let config = NavigationConfig {
            stream_relay_delay: Some(Duration::from_millis(1500)),
            use_ci_assignment: true,
            ..NavigationConfig::default()
        };
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.first_stream_relay_delay, Duration::from_millis(2000));
    }
}
