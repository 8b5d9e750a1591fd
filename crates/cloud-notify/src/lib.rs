//! Cloud Notification Sink
//!
//! MQTT-based delivery of alert payloads:
//! - One topic per alert channel
//! - Non-blocking, best-effort publishes
//! - Background event loop with reconnect backoff

use alert_processor::NotificationSink;
use rumqttc::{AsyncClient, Event, MqttOptions, QoS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Notification error types.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Connection failed: {0}")]
    Connection(String),
}

/// MQTT sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// MQTT broker host
    pub broker_host: String,
    /// MQTT port
    pub broker_port: u16,
    /// Site identifier, used in the client id and topic path
    pub site_id: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            site_id: "unknown".to_string(),
        }
    }
}

/// Topic an alert channel is published under.
fn alert_topic(site_id: &str, channel: &str) -> String {
    format!("wells/{}/alerts/{}", site_id, channel)
}

/// Fire-and-forget MQTT notification sink.
///
/// Publish failures are logged and dropped. The alert processor's holdoff
/// reset has already happened by the time a send is attempted, so a lost
/// alert stays lost.
pub struct MqttSink {
    config: MqttConfig,
    client: AsyncClient,
}

impl MqttSink {
    /// Connect to the broker and spawn the background event loop.
    pub async fn connect(config: MqttConfig) -> Result<Self, NotifyError> {
        let mut options = MqttOptions::new(
            format!("wsm-{}", config.site_id),
            &config.broker_host,
            config.broker_port,
        );
        options.set_keep_alive(std::time::Duration::from_secs(30));

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(incoming)) => {
                        debug!("MQTT incoming: {:?}", incoming);
                    }
                    Err(e) => {
                        error!("MQTT error: {}", e);
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    }
                    _ => {}
                }
            }
        });

        info!("Connected to MQTT broker: {}", config.broker_host);
        Ok(Self { config, client })
    }
}

impl NotificationSink for MqttSink {
    fn send(&self, channel: &str, payload: &str) {
        let topic = alert_topic(&self.config.site_id, channel);
        if let Err(e) = self
            .client
            .try_publish(&topic, QoS::AtLeastOnce, false, payload.to_owned())
        {
            warn!("alert publish to {} failed: {}", topic, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_topic_layout() {
        assert_eq!(
            alert_topic("north-field", "wsmAlertPPOnTooShort"),
            "wells/north-field/alerts/wsmAlertPPOnTooShort"
        );
    }

    #[test]
    fn test_default_config() {
        let config = MqttConfig::default();
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.broker_host, "localhost");
    }
}
