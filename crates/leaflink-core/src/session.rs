// ── Session management ──
//
// One live broker session per device. The manager owns the identity →
// session arena; each session owns its broker link, telemetry cache,
// pending request slot, and the spawned inbound pump task.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use leaflink_api::broker;
use leaflink_api::{BrokerEvent, BrokerLink};

use crate::cache::TelemetryCache;
use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::model::{DeviceId, TelemetrySnapshot};
use crate::request::PendingSlot;

// ── SessionState ─────────────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// `Ready` means both the connection and the subscription are
/// acknowledged; it is re-derived after every reconnect because clean
/// sessions drop subscriptions with the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    /// Connected, subscription issued but not yet acknowledged.
    Subscribed,
    /// Subscription acknowledged; telemetry can arrive.
    Ready,
    /// Terminal. The session was closed and its slot freed.
    Closed,
}

/// Which topic a session listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Sensors topic; the normal telemetry session.
    Telemetry,
    /// Status topic; used while waiting for a freshly paired device to
    /// come online.
    Status,
}

// ── PlantSession ─────────────────────────────────────────────────────

/// State shared between the session handle and its pump task.
struct SessionShared {
    device: DeviceId,
    cache: TelemetryCache,
    pending: PendingSlot,
    state_tx: watch::Sender<SessionState>,
    online_tx: watch::Sender<bool>,
}

/// A live session for one device.
///
/// Created through [`SessionManager::open`]; shared as `Arc<PlantSession>`.
pub struct PlantSession {
    shared: Arc<SessionShared>,
    link: BrokerLink,
    cancel: CancellationToken,
}

impl PlantSession {
    fn open(
        config: &CoordinatorConfig,
        device: DeviceId,
        kind: SessionKind,
    ) -> Result<Self, CoreError> {
        let topics = device.topics(&config.namespace);
        let subscribe_topic = match kind {
            SessionKind::Telemetry => topics.sensors.clone(),
            SessionKind::Status => topics.status.clone(),
        };
        let client_id = broker::client_id(&config.namespace, &config.instance_id);

        let (state_tx, _) = watch::channel(SessionState::Connecting);
        let (online_tx, _) = watch::channel(false);
        let cancel = CancellationToken::new();

        let link = BrokerLink::connect(
            &config.broker,
            topics,
            &subscribe_topic,
            &client_id,
            cancel.clone(),
        )?;

        let shared = Arc::new(SessionShared {
            device,
            cache: TelemetryCache::new(),
            pending: PendingSlot::new(),
            state_tx,
            online_tx,
        });

        let pump_shared = Arc::clone(&shared);
        let pump_rx = link.subscribe();
        let pump_cancel = cancel.clone();
        tokio::spawn(pump_task(pump_shared, pump_rx, pump_cancel));

        Ok(Self {
            shared,
            link,
            cancel,
        })
    }

    pub fn device(&self) -> &DeviceId {
        &self.shared.device
    }

    /// Subscribe to session state changes.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.shared.state_tx.subscribe()
    }

    /// Latched "device seen online" flag; flips to `true` on the first
    /// status message and stays there.
    pub fn online(&self) -> watch::Receiver<bool> {
        self.shared.online_tx.subscribe()
    }

    pub fn cache(&self) -> &TelemetryCache {
        &self.shared.cache
    }

    /// Request a fresh sensor reading and wait for it.
    ///
    /// Joins the in-flight request when one exists. Completes when a
    /// reply lands or the reply window expires, whichever is first, and
    /// returns whatever the cache holds at that point. This never fails:
    /// a publish error just resolves the request immediately.
    pub async fn request_sensors(&self) -> Option<TelemetrySnapshot> {
        let rx = self.shared.pending.arm();

        if let Err(e) = self.link.publish_command().await {
            debug!(device = %self.shared.device, error = %e, "sensor request publish failed");
            self.shared.pending.resolve();
        }

        self.shared.pending.wait(rx).await;
        self.shared.cache.read()
    }

    /// Force-close: cancel the pump, drop the broker connection, and
    /// wake any request waiters.
    async fn shutdown(&self) {
        self.cancel.cancel();
        self.link.shutdown().await;
        self.shared.pending.resolve();
        let _ = self.shared.state_tx.send(SessionState::Closed);
        debug!(device = %self.shared.device, "session closed");
    }
}

// ── Inbound pump ─────────────────────────────────────────────────────

async fn pump_task(
    shared: Arc<SessionShared>,
    mut rx: tokio::sync::broadcast::Receiver<BrokerEvent>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = rx.recv() => {
                match event {
                    Ok(event) => apply_event(&shared, &event),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(device = %shared.device, skipped = n, "session pump lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Apply one inbound broker event to the session's shared state.
fn apply_event(shared: &SessionShared, event: &BrokerEvent) {
    match event {
        BrokerEvent::Connected => {
            let _ = shared.state_tx.send(SessionState::Subscribed);
        }
        BrokerEvent::Subscribed => {
            let _ = shared.state_tx.send(SessionState::Ready);
        }
        BrokerEvent::Sensors(report) => {
            shared.cache.update(TelemetrySnapshot::from(*report));
            shared.pending.resolve();
        }
        BrokerEvent::Status => {
            shared.online_tx.send_replace(true);
        }
        BrokerEvent::Disconnected => {
            let _ = shared.state_tx.send(SessionState::Connecting);
        }
    }
}

// ── SessionManager ───────────────────────────────────────────────────

/// Owns the device → session arena.
///
/// At most one live session per device id; `open` is idempotent and
/// returns the existing handle.
pub struct SessionManager {
    config: CoordinatorConfig,
    sessions: DashMap<DeviceId, Arc<PlantSession>>,
}

impl SessionManager {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Open a session for the device, or return the existing one.
    ///
    /// Non-blocking: the broker connection proceeds in the background;
    /// observe readiness through [`PlantSession::state`].
    pub fn open(&self, id: &DeviceId, kind: SessionKind) -> Result<Arc<PlantSession>, CoreError> {
        match self.sessions.entry(id.clone()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                debug!(device = %id, ?kind, "opening session");
                let session = Arc::new(PlantSession::open(&self.config, id.clone(), kind)?);
                entry.insert(Arc::clone(&session));
                Ok(session)
            }
        }
    }

    /// Close the device's session and free its slot. No-op when no
    /// session is open.
    pub async fn close(&self, id: &DeviceId) {
        if let Some((_, session)) = self.sessions.remove(id) {
            session.shutdown().await;
        }
    }

    /// Tear down every open session.
    pub async fn close_all(&self) {
        let ids: Vec<DeviceId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.close(&id).await;
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use leaflink_api::SensorReport;

    fn test_config() -> CoordinatorConfig {
        CoordinatorConfig {
            server_url: url::Url::parse("http://localhost:9999/").unwrap(),
            broker: leaflink_api::BrokerConfig::default(),
            namespace: CoordinatorConfig::DEFAULT_NAMESPACE.to_string(),
            auth_token: None,
            instance_id: "test-instance".to_string(),
        }
    }

    fn test_shared() -> SessionShared {
        let (state_tx, _) = watch::channel(SessionState::Connecting);
        let (online_tx, _) = watch::channel(false);
        SessionShared {
            device: DeviceId::new("abc"),
            cache: TelemetryCache::new(),
            pending: PendingSlot::new(),
            state_tx,
            online_tx,
        }
    }

    const REPORT: SensorReport = SensorReport {
        soil: 45.0,
        temp: 22.0,
        humid: 55.0,
        light: 2500.0,
    };

    #[tokio::test]
    async fn open_is_idempotent() {
        let manager = SessionManager::new(test_config());
        let id = DeviceId::new("abc");

        let a = manager.open(&id, SessionKind::Telemetry).unwrap();
        let b = manager.open(&id, SessionKind::Telemetry).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.session_count(), 1);

        manager.close_all().await;
    }

    #[tokio::test]
    async fn close_frees_the_slot() {
        let manager = SessionManager::new(test_config());
        let id = DeviceId::new("abc");

        let a = manager.open(&id, SessionKind::Telemetry).unwrap();
        manager.close(&id).await;
        assert_eq!(manager.session_count(), 0);
        assert_eq!(*a.state().borrow(), SessionState::Closed);

        let b = manager.open(&id, SessionKind::Telemetry).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        manager.close_all().await;
    }

    #[tokio::test]
    async fn sensor_event_updates_cache_and_resolves_request() {
        let shared = test_shared();
        let mut rx = shared.pending.arm();

        apply_event(&shared, &BrokerEvent::Sensors(REPORT));

        assert_eq!(shared.cache.read().unwrap().soil, 45.0);
        rx.wait_for(|done| *done).await.unwrap();
        assert!(!shared.pending.is_armed());
    }

    #[tokio::test]
    async fn one_reply_resolves_every_waiter() {
        let shared = test_shared();
        let mut rx1 = shared.pending.arm();
        let mut rx2 = shared.pending.arm();

        apply_event(&shared, &BrokerEvent::Sensors(REPORT));

        rx1.wait_for(|done| *done).await.unwrap();
        rx2.wait_for(|done| *done).await.unwrap();
    }

    #[test]
    fn status_latches_online() {
        let shared = test_shared();
        assert!(!*shared.online_tx.subscribe().borrow());

        apply_event(&shared, &BrokerEvent::Status);
        apply_event(&shared, &BrokerEvent::Status);
        assert!(*shared.online_tx.subscribe().borrow());
    }

    #[test]
    fn state_follows_connection_lifecycle() {
        let shared = test_shared();

        apply_event(&shared, &BrokerEvent::Connected);
        assert_eq!(*shared.state_tx.subscribe().borrow(), SessionState::Subscribed);

        apply_event(&shared, &BrokerEvent::Subscribed);
        assert_eq!(*shared.state_tx.subscribe().borrow(), SessionState::Ready);

        // A drop means readiness must be re-earned.
        apply_event(&shared, &BrokerEvent::Disconnected);
        assert_eq!(*shared.state_tx.subscribe().borrow(), SessionState::Connecting);
    }
}
