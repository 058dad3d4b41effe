// ── Telemetry cache ──
//
// Single-writer snapshot store. The session's inbound pump is the only
// writer; every update replaces the whole snapshot. Readers either take
// a copy of the current value or subscribe for change notifications.

use tokio::sync::watch;

use crate::model::TelemetrySnapshot;

/// Latest-value cache for one device's sensor readings.
#[derive(Debug)]
pub struct TelemetryCache {
    tx: watch::Sender<Option<TelemetrySnapshot>>,
}

impl TelemetryCache {
    /// An empty cache: no reading has arrived yet.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the cached snapshot wholesale and notify subscribers.
    pub fn update(&self, snapshot: TelemetrySnapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    /// Copy of the current snapshot, `None` before the first reading.
    pub fn read(&self) -> Option<TelemetrySnapshot> {
        *self.tx.borrow()
    }

    /// Subscribe to snapshot changes. The receiver immediately sees the
    /// current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<TelemetrySnapshot>> {
        self.tx.subscribe()
    }
}

impl Default for TelemetryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert_eq!(TelemetryCache::new().read(), None);
    }

    #[test]
    fn update_replaces_whole_snapshot() {
        let cache = TelemetryCache::new();
        cache.update(TelemetrySnapshot {
            soil: 45.0,
            temp: 22.0,
            humid: 55.0,
            light: 2500.0,
        });
        cache.update(TelemetrySnapshot {
            soil: 10.0,
            ..Default::default()
        });

        let snap = cache.read().unwrap();
        assert_eq!(snap.soil, 10.0);
        // Fields are never carried over from the previous snapshot.
        assert_eq!(snap.temp, 0.0);
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let cache = TelemetryCache::new();
        let mut rx = cache.subscribe();

        cache.update(TelemetrySnapshot::default());
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());
    }
}
