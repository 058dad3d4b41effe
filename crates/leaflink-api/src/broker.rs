//! Broker link with auto-reconnect.
//!
//! Connects to the MQTT broker for one device and streams parsed inbound
//! messages through a [`tokio::sync::broadcast`] channel. Reconnection is
//! the transport's fixed retry pause -- no coordinator-level backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use leaflink_api::broker::{BrokerConfig, BrokerEvent, BrokerLink, TopicSet};
//! use tokio_util::sync::CancellationToken;
//!
//! let topics = TopicSet::for_device("flowey", "abc-123");
//! let cancel = CancellationToken::new();
//!
//! let id = leaflink_api::broker::client_id("flowey", "instance-1");
//! let link = BrokerLink::connect(&config, topics.clone(), &topics.sensors, &id, cancel.clone())?;
//! let mut rx = link.subscribe();
//!
//! link.publish_command().await?;
//! while let Ok(event) = rx.recv().await {
//!     if let BrokerEvent::Sensors(report) = event { /* ... */ }
//! }
//!
//! link.shutdown().await;
//! ```

use std::time::Duration;

use rand::Rng;
use rumqttc::{AsyncClient, Event, MqttOptions, NetworkOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Fixed command token the device firmware understands.
const GET_SENSORS: &str = "GET_SENSORS";

// ── SensorReport ─────────────────────────────────────────────────────

/// A parsed telemetry payload from the device's sensors topic.
///
/// The firmware publishes all four fields in every message; a message
/// that fails to parse is dropped whole, so consumers never observe a
/// partially-updated reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReport {
    /// Soil moisture, percent.
    pub soil: f64,
    /// Air temperature, degrees Celsius.
    pub temp: f64,
    /// Relative humidity, percent.
    pub humid: f64,
    /// Light intensity, lux.
    pub light: f64,
}

// ── TopicSet ─────────────────────────────────────────────────────────

/// The three topics a device communicates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSet {
    /// Device → client telemetry (JSON `SensorReport`).
    pub sensors: String,
    /// Client → device commands (plain text).
    pub command: String,
    /// Device → client liveness signal (content ignored).
    pub status: String,
}

impl TopicSet {
    /// Derive the topic names for a device uuid under a namespace.
    pub fn for_device(namespace: &str, uuid: &str) -> Self {
        Self {
            sensors: format!("/{namespace}/{uuid}/sensors"),
            command: format!("/{namespace}/{uuid}/command"),
            status: format!("/{namespace}/{uuid}/status"),
        }
    }
}

// ── BrokerConfig ─────────────────────────────────────────────────────

/// Connection settings for the broker.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Broker URL (`mqtt://host:port` or `mqtts://host:port`).
    pub url: Url,
    pub username: String,
    pub password: String,
    /// TCP connect timeout. Default: 4s.
    pub connect_timeout: Duration,
    /// Pause before the transport retries a dropped connection. Default: 5s.
    pub reconnect_period: Duration,
    /// MQTT keep-alive interval. Default: 30s.
    pub keep_alive: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("mqtt://localhost:1883").expect("static URL"),
            username: String::new(),
            password: String::new(),
            connect_timeout: Duration::from_secs(4),
            reconnect_period: Duration::from_secs(5),
            keep_alive: Duration::from_secs(30),
        }
    }
}

/// Build a broker client id: a fixed prefix, the persisted client-instance
/// id, and a random hex suffix so two live sessions for the same device
/// never collide.
pub fn client_id(namespace: &str, instance_id: &str) -> String {
    let suffix: u64 = rand::thread_rng().r#gen();
    format!("mqtt_{namespace}_{instance_id}_{suffix:x}")
}

// ── BrokerEvent ──────────────────────────────────────────────────────

/// Inbound events from the broker pump task.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerEvent {
    /// CONNACK received; the link has (re)issued its subscription.
    Connected,
    /// SUBACK received; messages can now arrive.
    Subscribed,
    /// A telemetry payload parsed from the sensors topic.
    Sensors(SensorReport),
    /// Any message on the status topic. Content is not inspected.
    Status,
    /// The transport dropped; it will retry after the reconnect pause.
    Disconnected,
}

// ── BrokerLink ───────────────────────────────────────────────────────

/// Handle to one live broker connection for one device.
///
/// Owns the MQTT client and the spawned pump task. Dropping the handle
/// does not tear the connection down -- call [`shutdown`](Self::shutdown).
pub struct BrokerLink {
    client: AsyncClient,
    command_topic: String,
    event_tx: broadcast::Sender<BrokerEvent>,
    cancel: CancellationToken,
}

impl BrokerLink {
    /// Connect to the broker and spawn the pump task.
    ///
    /// Returns immediately once the task is spawned; the connect itself is
    /// asynchronous. `subscribe_topic` is the single topic this link
    /// listens on (sensors for telemetry sessions, status for pairing).
    pub fn connect(
        config: &BrokerConfig,
        topics: TopicSet,
        subscribe_topic: &str,
        client_id: &str,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let host = config
            .url
            .host_str()
            .ok_or_else(|| Error::BrokerConnect(format!("no host in {}", config.url)))?;
        let port = config.url.port().unwrap_or(1883);

        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(config.keep_alive);
        options.set_clean_session(true);
        if !config.username.is_empty() {
            options.set_credentials(&config.username, &config.password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);

        let mut net_options = NetworkOptions::new();
        net_options.set_connection_timeout(config.connect_timeout.as_secs());
        eventloop.set_network_options(net_options);

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let pump_tx = event_tx.clone();
        let pump_cancel = cancel.clone();
        let pump_client = client.clone();
        let sub_topic = subscribe_topic.to_string();
        let reconnect_period = config.reconnect_period;
        let pump_topics = topics.clone();
        tokio::spawn(async move {
            pump_loop(
                &mut eventloop,
                &pump_client,
                &pump_topics,
                &sub_topic,
                &pump_tx,
                reconnect_period,
                pump_cancel,
            )
            .await;
        });

        Ok(Self {
            client,
            command_topic: topics.command,
            event_tx,
            cancel,
        })
    }

    /// Get a new broadcast receiver for inbound events.
    pub fn subscribe(&self) -> broadcast::Receiver<BrokerEvent> {
        self.event_tx.subscribe()
    }

    /// Publish the sensor-request command on the device's command topic.
    pub async fn publish_command(&self) -> Result<(), Error> {
        self.client
            .publish(&self.command_topic, QoS::AtMostOnce, false, GET_SENSORS)
            .await
            .map_err(|e| Error::BrokerPublish(e.to_string()))
    }

    /// Force-close the connection: cancel the pump task and send the MQTT
    /// disconnect without waiting for a graceful drain.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let _ = self.client.try_disconnect();
    }
}

// ── Pump task ────────────────────────────────────────────────────────

/// Drive the MQTT event loop: translate packets to [`BrokerEvent`]s,
/// re-subscribe on every CONNACK (clean sessions don't keep subscriptions
/// across reconnects), and pause for the fixed reconnect period on error.
async fn pump_loop(
    eventloop: &mut rumqttc::EventLoop,
    client: &AsyncClient,
    topics: &TopicSet,
    subscribe_topic: &str,
    event_tx: &broadcast::Sender<BrokerEvent>,
    reconnect_period: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            polled = eventloop.poll() => {
                match polled {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        tracing::debug!(topic = %subscribe_topic, "broker connected, subscribing");
                        if let Err(e) = client.subscribe(subscribe_topic, QoS::AtMostOnce).await {
                            tracing::warn!(error = %e, "subscribe failed");
                        }
                        let _ = event_tx.send(BrokerEvent::Connected);
                    }
                    Ok(Event::Incoming(Packet::SubAck(_))) => {
                        tracing::debug!(topic = %subscribe_topic, "subscription acknowledged");
                        let _ = event_tx.send(BrokerEvent::Subscribed);
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        if let Some(event) = route_publish(topics, &publish.topic, &publish.payload) {
                            // Ignore send errors -- no active subscribers right now
                            let _ = event_tx.send(event);
                        }
                    }
                    Ok(_) => {
                        // Outgoing packets, pings -- nothing to surface
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "broker connection error");
                        let _ = event_tx.send(BrokerEvent::Disconnected);

                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            () = tokio::time::sleep(reconnect_period) => {}
                        }
                    }
                }
            }
        }
    }

    tracing::debug!("broker pump exiting");
}

/// Map an inbound publish to a [`BrokerEvent`].
///
/// Malformed sensor payloads are logged and dropped -- they must never
/// crash the handler or reach the telemetry cache. Status messages count
/// by arrival alone; their content is ignored.
fn route_publish(topics: &TopicSet, topic: &str, payload: &[u8]) -> Option<BrokerEvent> {
    if topic == topics.sensors {
        match serde_json::from_slice::<SensorReport>(payload) {
            Ok(report) => Some(BrokerEvent::Sensors(report)),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    payload = %String::from_utf8_lossy(payload),
                    "dropping malformed telemetry payload"
                );
                None
            }
        }
    } else if topic == topics.status {
        Some(BrokerEvent::Status)
    } else {
        tracing::trace!(topic = %topic, "message on unhandled topic");
        None
    }
}

// ── Tests ────────────────────────────────────────────────────────────
