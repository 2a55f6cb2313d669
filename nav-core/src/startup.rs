//! One-time startup decisions
//!
//! Runs once during construction, before any play transition is possible:
//! classify the boot (timer wakeup vs UI restart), trigger the channel-list
//! import when configured, and arm the deferred standby entry when startup
//! policy or the wakeup classification demands it.

use std::sync::Arc;

use tracing::{debug, info};

use nav_backend::{ChannelListImporter, DeferredAction, Scheduler, SessionMonitor};

use crate::config::{NavigationConfig, StartupToStandby, WakeupTimeType};

/// Boot classification, read-only after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StartupReport {
    pub was_timer_wakeup: bool,
    pub is_restart_ui: bool,
    pub prev_wakeup_time: Option<u64>,
    /// The boot was caused by a user-programmed wakeup timer (as opposed to
    /// a record/zap timer); forwarded to the standby notification.
    pub wakeup_timer_enabled: bool,
}

pub(crate) fn run(
    config: &NavigationConfig,
    was_timer_wakeup: bool,
    importer: Option<&Arc<dyn ChannelListImporter>>,
    scheduler: &Arc<dyn Scheduler>,
    session: Option<&Arc<dyn SessionMonitor>>,
) -> StartupReport {
    let wakeup_timer_enabled = was_timer_wakeup
        && config.wakeup_time_type == WakeupTimeType::WakeupTimer
        && config.prev_wakeup_time.is_some();

    if config.remote_fallback_import_restart {
        if let Some(importer) = importer {
            info!("importing channel list from remote fallback receiver");
            importer.import_channels();
        }
    }

    if config.restart_ui {
        debug!("UI restart detected, skipping startup standby policy");
    } else {
        if config.remote_fallback_import && !config.remote_fallback_import_restart {
            if let Some(importer) = importer {
                info!("importing channel list from remote fallback receiver");
                importer.import_channels();
            }
        }

        if wants_startup_standby(config, was_timer_wakeup) {
            let shutting_down = session.is_some_and(|s| s.shutdown_in_progress());
            if shutting_down {
                debug!("shutdown already in progress, not arming startup standby");
            } else {
                info!(delay = ?config.standby_delay, "arming deferred standby entry");
                scheduler.schedule(config.standby_delay, DeferredAction::EnterStandby);
            }
        }
    }

    StartupReport {
        was_timer_wakeup,
        is_restart_ui: config.restart_ui,
        prev_wakeup_time: config.prev_wakeup_time,
        wakeup_timer_enabled,
    }
}

/// Standby is entered right after boot either unconditionally (policy says
/// yes) or because the box was woken by a timer whose type wants the UI
/// asleep until the timer fires.
fn wants_startup_standby(config: &NavigationConfig, was_timer_wakeup: bool) -> bool {
    if config.startup_to_standby == StartupToStandby::Yes {
        return true;
    }
    was_timer_wakeup
        && config.prev_wakeup_time.is_some()
        && (matches!(
            config.wakeup_time_type,
            WakeupTimeType::RecordTimer | WakeupTimeType::ZapTimer
        ) || (config.wakeup_time_type == WakeupTimeType::WakeupTimer
            && config.startup_to_standby == StartupToStandby::ExceptTimerWakeup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct RecordingScheduler {
        scheduled: Mutex<Vec<(Duration, DeferredAction)>>,
    }

    impl RecordingScheduler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                scheduled: Mutex::new(Vec::new()),
            })
        }
        fn standby_armed(&self) -> bool {
            self.scheduled
                .lock()
                .iter()
                .any(|(_, action)| *action == DeferredAction::EnterStandby)
        }
    }

    impl Scheduler for RecordingScheduler {
        fn schedule(&self, delay: Duration, action: DeferredAction) {
            self.scheduled.lock().push((delay, action));
        }
    }

    struct CountingImporter {
        imports: Mutex<u32>,
    }

    impl ChannelListImporter for CountingImporter {
        fn import_channels(&self) {
            *self.imports.lock() += 1;
        }
    }

    struct ShuttingDown;

    impl SessionMonitor for ShuttingDown {
        fn in_standby(&self) -> bool {
            false
        }
        fn shutdown_in_progress(&self) -> bool {
            true
        }
    }

    fn scheduler_arc(s: &Arc<RecordingScheduler>) -> Arc<dyn Scheduler> {
        Arc::clone(s) as Arc<dyn Scheduler>
    }

    #[test]
    fn plain_boot_arms_nothing() {
        let scheduler = RecordingScheduler::new();
        let report = run(
            &NavigationConfig::default(),
            false,
            None,
            &scheduler_arc(&scheduler),
            None,
        );
        assert!(!scheduler.standby_armed());
        assert!(!report.was_timer_wakeup);
        assert!(!report.wakeup_timer_enabled);
    }

    #[test]
    fn startup_to_standby_yes_arms_the_timer() {
        let scheduler = RecordingScheduler::new();
        let config = NavigationConfig {
            startup_to_standby: StartupToStandby::Yes,
            ..NavigationConfig::default()
        };
        run(&config, false, None, &scheduler_arc(&scheduler), None);
        assert!(scheduler.standby_armed());
        assert_eq!(
            scheduler.scheduled.lock()[0].0,
            Duration::from_secs(15),
            "standby is deferred by the configured delay"
        );
    }

    #[test]
    fn record_timer_wakeup_goes_to_standby() {
        let scheduler = RecordingScheduler::new();
        let config = NavigationConfig {
            wakeup_time_type: WakeupTimeType::RecordTimer,
            prev_wakeup_time: Some(1_700_000_000),
            ..NavigationConfig::default()
        };
        let report = run(&config, true, None, &scheduler_arc(&scheduler), None);
        assert!(scheduler.standby_armed());
        assert!(report.was_timer_wakeup);
        assert!(!report.wakeup_timer_enabled);
    }

    #[test]
    fn wakeup_timer_classification() {
        let scheduler = RecordingScheduler::new();
        let config = NavigationConfig {
            wakeup_time_type: WakeupTimeType::WakeupTimer,
            prev_wakeup_time: Some(1_700_000_000),
            ..NavigationConfig::default()
        };
        let report = run(&config, true, None, &scheduler_arc(&scheduler), None);
        assert!(report.wakeup_timer_enabled);
        // Policy "no" plus a wakeup timer does not force standby.
        assert!(!scheduler.standby_armed());
    }

    #[test]
    fn wakeup_timer_with_except_policy_arms_standby() {
        let scheduler = RecordingScheduler::new();
        let config = NavigationConfig {
            wakeup_time_type: WakeupTimeType::WakeupTimer,
            prev_wakeup_time: Some(1_700_000_000),
            startup_to_standby: StartupToStandby::ExceptTimerWakeup,
            ..NavigationConfig::default()
        };
        run(&config, true, None, &scheduler_arc(&scheduler), None);
        assert!(scheduler.standby_armed());
    }

    #[test]
    fn shutdown_in_progress_blocks_standby() {
        let scheduler = RecordingScheduler::new();
        let config = NavigationConfig {
            startup_to_standby: StartupToStandby::Yes,
            ..NavigationConfig::default()
        };
        let session: Arc<dyn SessionMonitor> = Arc::new(ShuttingDown);
        run(
            &config,
            false,
            None,
            &scheduler_arc(&scheduler),
            Some(&session),
        );
        assert!(!scheduler.standby_armed());
    }

    #[test]
    fn restart_ui_skips_standby_but_still_imports_on_restart_variant() {
        let scheduler = RecordingScheduler::new();
        let importer = Arc::new(CountingImporter {
            imports: Mutex::new(0),
        });
        let importer_dyn: Arc<dyn ChannelListImporter> = Arc::clone(&importer) as _;
        let config = NavigationConfig {
            restart_ui: true,
            startup_to_standby: StartupToStandby::Yes,
            remote_fallback_import_restart: true,
            ..NavigationConfig::default()
        };
        let report = run(
            &config,
            false,
            Some(&importer_dyn),
            &scheduler_arc(&scheduler),
            None,
        );
        assert!(!scheduler.standby_armed());
        assert!(report.is_restart_ui);
        assert_eq!(*importer.imports.lock(), 1);
    }

    #[test]
    fn steady_import_variant_runs_only_without_the_restart_variant() {
        let scheduler = RecordingScheduler::new();
        let importer = Arc::new(CountingImporter {
            imports: Mutex::new(0),
        });
        let importer_dyn: Arc<dyn ChannelListImporter> = Arc::clone(&importer) as _;
        let config = NavigationConfig {
            remote_fallback_import: true,
            remote_fallback_import_restart: true,
            ..NavigationConfig::default()
        };
        run(
            &config,
            false,
            Some(&importer_dyn),
            &scheduler_arc(&scheduler),
            None,
        );
        // The restart variant ran once and suppressed the steady variant.
        assert_eq!(*importer.imports.lock(), 1);
    }
}
