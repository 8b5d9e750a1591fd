//! Alert classification and payload construction.

use chrono::Utc;
use serde::Serialize;

/// Downstream delivery abstraction: one named channel, one text payload.
///
/// Sends are best effort. The processor never observes delivery failures and
/// never retries; implementations must not block the caller.
pub trait NotificationSink {
    fn send(&self, channel: &str, payload: &str);
}

/// The seven alert classes raised by the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A single PP run exceeded the long-run limit.
    PpOnTooLong { minutes: f32 },
    /// A single PP run fell below the short-run limit.
    PpOnTooShort { minutes: f32 },
    /// A single WP run exceeded the long-run limit.
    WpOnTooLong { minutes: f32 },
    /// A single WP run fell below the short-run limit.
    WpOnTooShort { minutes: f32 },
    /// WP failed to start although accumulated PP run time hit its ceiling.
    WpNotComeOn { accumulated_minutes: f32 },
    /// WP started before enough PP run time had accumulated.
    WpOnTooSoon { accumulated_minutes: f32 },
    /// PP has not started for at least one day.
    PpNotRun { idle_ticks: u32 },
}

impl Alert {
    /// Stable wire identifier for downstream routing and filtering.
    pub fn channel(&self) -> &'static str {
        match self {
            Alert::PpOnTooLong { .. } => "wsmAlertPPOnTooLong",
            Alert::PpOnTooShort { .. } => "wsmAlertPPOnTooShort",
            Alert::WpOnTooLong { .. } => "wsmAlertWPOnTooLong",
            Alert::WpOnTooShort { .. } => "wsmAlertWPOnTooShort",
            Alert::WpNotComeOn { .. } => "wsmAlertWPNotComeOn",
            Alert::WpOnTooSoon { .. } => "wsmAlertWPOnTooSoon",
            Alert::PpNotRun { .. } => "wsmAlertPPNotRun",
        }
    }

    /// Human-readable message embedding the relevant numeric value.
    pub fn message(&self) -> String {
        match self {
            Alert::PpOnTooLong { minutes } | Alert::PpOnTooShort { minutes } => {
                format!("PP on for {} minutes.", minutes)
            }
            Alert::WpOnTooLong { minutes } | Alert::WpOnTooShort { minutes } => {
                format!("WP on for {} minutes.", minutes)
            }
            Alert::WpNotComeOn { accumulated_minutes } => format!(
                "WP did not come on after PP run for > {} minutes.",
                accumulated_minutes
            ),
            Alert::WpOnTooSoon { accumulated_minutes } => format!(
                "WP came on after PP run for only {} minutes.",
                accumulated_minutes
            ),
            Alert::PpNotRun { .. } => "PP did not run for at least the last day.".to_string(),
        }
    }
}

/// Flat payload published for every alert.
#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload {
    /// Unix timestamp of alert generation.
    pub etime: i64,
    /// One of the seven message templates.
    pub msg: String,
}

impl AlertPayload {
    /// Build the payload for an alert, stamped with the current time.
    pub fn new(alert: &Alert) -> Self {
        Self {
            etime: Utc::now().timestamp(),
            msg: alert.message(),
        }
    }
}
