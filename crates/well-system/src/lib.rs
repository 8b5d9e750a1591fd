//! Well System Monitor
//!
//! Wires the pump sensors, the half-hour scheduler tick, and the alert
//! processor into a single event loop: one logical execution context makes
//! every call into the processor.

mod config;

pub use config::{ConfigError, MonitorConfig};

use alert_processor::{AlertProcessor, NotificationSink};
use cloud_notify::{MqttSink, NotifyError};
use pump_monitor::{PumpEvent, PumpKind, PumpSensor};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// A raw pump sense sample, as read by the hardware front end.
#[derive(Debug, Clone, Copy)]
pub struct PumpSample {
    pub pump: PumpKind,
    pub level_on: bool,
    pub timestamp_ms: u64,
}

/// Owns the alert processor and both pump sensors.
pub struct WellSystem<S: NotificationSink> {
    processor: AlertProcessor<S>,
    pp_sensor: PumpSensor,
    wp_sensor: PumpSensor,
    tick_interval: Duration,
}

impl<S: NotificationSink> WellSystem<S> {
    pub fn new(config: &MonitorConfig, sink: S) -> Self {
        Self {
            processor: AlertProcessor::new(config.alerts.clone(), sink),
            pp_sensor: PumpSensor::new(PumpKind::Pressure, config.debounce.clone()),
            wp_sensor: PumpSensor::new(PumpKind::Well, config.debounce.clone()),
            tick_interval: Duration::from_secs(config.tick_interval_secs),
        }
    }

    /// Feed one raw sample through debouncing into the alert processor.
    pub fn handle_sample(&mut self, sample: PumpSample) {
        let sensor = match sample.pump {
            PumpKind::Pressure => &mut self.pp_sensor,
            PumpKind::Well => &mut self.wp_sensor,
        };
        let Some(event) = sensor.sample(sample.level_on, sample.timestamp_ms) else {
            return;
        };
        match (sample.pump, event) {
            (PumpKind::Pressure, PumpEvent::TurnedOn) => self.processor.pp_on(),
            (PumpKind::Pressure, PumpEvent::TurnedOff { run_minutes }) => {
                self.processor.pp_off(run_minutes)
            }
            (PumpKind::Well, PumpEvent::TurnedOn) => self.processor.wp_on(),
            (PumpKind::Well, PumpEvent::TurnedOff { run_minutes }) => {
                self.processor.wp_off(run_minutes)
            }
        }
    }

    /// Run until the sample channel closes.
    ///
    /// The first tick lands one full interval after start, so a freshly
    /// reset processor does not evaluate the idle-PP rule immediately.
    pub async fn run(&mut self, mut samples: mpsc::Receiver<PumpSample>) {
        info!("starting well system event loop");
        let mut ticker = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("scheduler tick");
                    self.processor.tick();
                }
                sample = samples.recv() => match sample {
                    Some(sample) => self.handle_sample(sample),
                    None => break,
                },
            }
        }
        info!("sample channel closed, stopping");
    }

    /// The owned alert processor, for inspection.
    pub fn processor(&self) -> &AlertProcessor<S> {
        &self.processor
    }
}

/// Connect the MQTT sink and build a ready-to-run system.
pub async fn bootstrap(config: &MonitorConfig) -> Result<WellSystem<MqttSink>, NotifyError> {
    let sink = MqttSink::connect(config.mqtt.clone()).await?;
    Ok(WellSystem::new(config, sink))
}

/// Initialize logging for the monitor process.
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
