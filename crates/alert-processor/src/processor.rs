//! The alert-processing state machine.

use crate::alert::{Alert, AlertPayload, NotificationSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Half-hour ticks in one day.
pub const ONE_DAY: u32 = 48;
/// Half-hour ticks in three days.
pub const THREE_DAYS: u32 = 144;

/// Pump run-time thresholds, in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// PP should not run less than this (default: 0.5)
    pub pp_short_limit: f32,
    /// PP should not run longer than this (default: 3.0)
    pub pp_long_limit: f32,
    /// WP should not run less than this (default: 20.0)
    pub wp_short_limit: f32,
    /// WP should not run longer than this (default: 40.0)
    pub wp_long_limit: f32,
    /// WP should not start before this much PP run time has accumulated (default: 10.0)
    pub wp_too_soon_limit: f32,
    /// WP should have started by the time this much PP run time accumulates (default: 30.0)
    pub wp_overdue_limit: f32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            pp_short_limit: 0.5,
            pp_long_limit: 3.0,
            wp_short_limit: 20.0,
            wp_long_limit: 40.0,
            wp_too_soon_limit: 10.0,
            wp_overdue_limit: 30.0,
        }
    }
}

/// Converts pump on/off events and a periodic tick into rate-limited alerts.
///
/// Each holdoff counter is a two-state latch: at or above its ceiling the
/// alert class is armed; below, it is cooling and an eligible condition is a
/// silent no-op, not a queued alert. Firing resets the counter to 0 and only
/// repeated `tick()` calls re-arm it.
///
/// All methods are O(1), non-blocking, and expected to be called from a
/// single logical execution context.
pub struct AlertProcessor<S: NotificationSink> {
    config: AlertConfig,
    sink: S,
    /// Sum of PP run minutes since the last WP activation.
    pp_accumulated_on_time: f32,
    /// Diagnostic tick counter, read by nothing in the alert logic.
    time_between_pp_events: u32,
    pp_alert_holdoff: u32,
    wp_alert_holdoff: u32,
    inter_pump_alert_holdoff: u32,
    /// Ticks since PP last turned on; saturates at one day.
    inter_pp_run_time: u32,
    pp_not_run_alert_holdoff: u32,
}

impl<S: NotificationSink> AlertProcessor<S> {
    /// Create a processor with every alert class armed.
    pub fn new(config: AlertConfig, sink: S) -> Self {
        info!("creating alert processor with config: {:?}", config);
        let mut processor = Self {
            config,
            sink,
            pp_accumulated_on_time: 0.0,
            time_between_pp_events: 0,
            pp_alert_holdoff: 0,
            wp_alert_holdoff: 0,
            inter_pump_alert_holdoff: 0,
            inter_pp_run_time: 0,
            pp_not_run_alert_holdoff: 0,
        };
        processor.reset();
        processor
    }

    /// Reset to the freshly-started state: accumulators at zero, every
    /// holdoff at its ceiling so the first occurrence of each condition is
    /// eligible to alert.
    pub fn reset(&mut self) {
        self.pp_accumulated_on_time = 0.0;
        self.time_between_pp_events = 0;
        self.pp_alert_holdoff = ONE_DAY;
        self.wp_alert_holdoff = ONE_DAY;
        self.inter_pump_alert_holdoff = ONE_DAY;
        self.inter_pp_run_time = ONE_DAY;
        self.pp_not_run_alert_holdoff = THREE_DAYS;
    }

    /// Advance all tick counters by one half-hour tick, saturating at their
    /// ceilings, and evaluate the idle-PP rule.
    ///
    /// Once `inter_pp_run_time` has sat at its ceiling for a full tick, the
    /// PP has not started for at least a day; that raises the idle alert,
    /// gated by its three-day holdoff. At most one alert fires per tick.
    pub fn tick(&mut self) {
        if self.time_between_pp_events < ONE_DAY {
            self.time_between_pp_events += 1;
        }

        if self.pp_alert_holdoff < ONE_DAY {
            self.pp_alert_holdoff += 1;
        }

        if self.wp_alert_holdoff < ONE_DAY {
            self.wp_alert_holdoff += 1;
        }

        if self.inter_pump_alert_holdoff < ONE_DAY {
            self.inter_pump_alert_holdoff += 1;
        }

        if self.pp_not_run_alert_holdoff < THREE_DAYS {
            self.pp_not_run_alert_holdoff += 1;
        }

        if self.inter_pp_run_time < ONE_DAY {
            self.inter_pp_run_time += 1;
        } else {
            if self.pp_not_run_alert_holdoff >= THREE_DAYS {
                warn!(
                    idle_ticks = self.inter_pp_run_time,
                    "PP has not run for at least a day"
                );
                self.publish(Alert::PpNotRun {
                    idle_ticks: self.inter_pp_run_time,
                });
                self.pp_not_run_alert_holdoff = 0;
            }
            // saturating "has it been a day" flag, not a growing counter
            self.inter_pp_run_time = ONE_DAY;
        }
    }

    /// PP confirmed on. Never alerts.
    pub fn pp_on(&mut self) {
        debug!("PP on");
        self.inter_pp_run_time = 0;
    }

    /// PP confirmed off after running for `run_minutes`.
    pub fn pp_off(&mut self, run_minutes: f32) {
        debug!(run_minutes, "PP off");

        // single-run duration check, short before long, mutually exclusive
        if self.pp_alert_holdoff >= ONE_DAY {
            if run_minutes < self.config.pp_short_limit {
                self.publish(Alert::PpOnTooShort {
                    minutes: run_minutes,
                });
                self.pp_alert_holdoff = 0;
            } else if run_minutes > self.config.pp_long_limit {
                self.publish(Alert::PpOnTooLong {
                    minutes: run_minutes,
                });
                self.pp_alert_holdoff = 0;
            }
        }

        // The comparison is against the pre-addition value: the overdue-WP
        // alert fires only once the running total was already at the clamp
        // from a previous call, and reports that clamped value.
        if self.pp_accumulated_on_time < self.config.wp_overdue_limit {
            self.pp_accumulated_on_time += run_minutes;
        } else {
            if self.inter_pump_alert_holdoff >= ONE_DAY {
                self.publish(Alert::WpNotComeOn {
                    accumulated_minutes: self.pp_accumulated_on_time,
                });
                self.inter_pump_alert_holdoff = 0;
            }
            self.pp_accumulated_on_time = self.config.wp_overdue_limit;
        }
    }

    /// WP confirmed on. Starts a new PP/WP cycle.
    pub fn wp_on(&mut self) {
        debug!("WP on");

        if self.inter_pump_alert_holdoff >= ONE_DAY
            && self.pp_accumulated_on_time < self.config.wp_too_soon_limit
        {
            self.publish(Alert::WpOnTooSoon {
                accumulated_minutes: self.pp_accumulated_on_time,
            });
            self.inter_pump_alert_holdoff = 0;
        }

        self.pp_accumulated_on_time = 0.0;
    }

    /// WP confirmed off after running for `run_minutes`.
    pub fn wp_off(&mut self, run_minutes: f32) {
        debug!(run_minutes, "WP off");

        if self.wp_alert_holdoff >= ONE_DAY {
            if run_minutes < self.config.wp_short_limit {
                self.publish(Alert::WpOnTooShort {
                    minutes: run_minutes,
                });
                self.wp_alert_holdoff = 0;
            } else if run_minutes > self.config.wp_long_limit {
                self.publish(Alert::WpOnTooLong {
                    minutes: run_minutes,
                });
                self.wp_alert_holdoff = 0;
            }
        }
    }

    /// Hand an alert to the sink. Best effort: delivery failures are not
    /// observed and the caller's holdoff reset happens regardless.
    fn publish(&self, alert: Alert) {
        let payload = AlertPayload::new(&alert);
        match serde_json::to_string(&payload) {
            Ok(body) => {
                info!(channel = alert.channel(), msg = %payload.msg, "publishing alert");
                self.sink.send(alert.channel(), &body);
            }
            Err(e) => error!("failed to encode alert payload: {}", e),
        }
    }

    // Inspection-only accessors, used for test verification.

    pub fn pp_accumulated_on_time(&self) -> f32 {
        self.pp_accumulated_on_time
    }

    pub fn time_between_pp_events(&self) -> u32 {
        self.time_between_pp_events
    }

    pub fn pp_alert_holdoff(&self) -> u32 {
        self.pp_alert_holdoff
    }

    pub fn wp_alert_holdoff(&self) -> u32 {
        self.wp_alert_holdoff
    }

    pub fn inter_pump_alert_holdoff(&self) -> u32 {
        self.inter_pump_alert_holdoff
    }

    pub fn inter_pp_run_time(&self) -> u32 {
        self.inter_pp_run_time
    }

    pub fn pp_not_run_alert_holdoff(&self) -> u32 {
        self.pp_not_run_alert_holdoff
    }
}
