//! Pump State Sensing
//!
//! Confirms raw pump sense levels into debounced on/off transitions and
//! computes each completed run's duration in minutes.

mod sensor;

pub use sensor::{DebounceConfig, PumpEvent, PumpKind, PumpSensor};
