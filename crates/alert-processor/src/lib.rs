//! Well Pump Alert Processing
//!
//! Converts confirmed pump on/off events and a periodic half-hour tick into
//! a bounded set of classified alerts, each rate-limited by its own holdoff
//! counter.

mod alert;
mod processor;

pub use alert::{Alert, AlertPayload, NotificationSink};
pub use processor::{AlertConfig, AlertProcessor, ONE_DAY, THREE_DAYS};
