// ── Request/reply bridge ──
//
// Sensor data requests are fire-and-forget publishes; replies come back
// on the pub/sub sensors topic with no correlation id. All concurrent
// requests for one device therefore share a single pending slot: the
// first reply (or the first expiring timer) resolves every waiter at
// once. A request never fails -- on timeout it completes with whatever
// the cache holds, which may be nothing.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;

/// How long a sensor request waits for a reply before giving up.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(20);

/// The single shared wait slot for one device's in-flight request.
#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<watch::Sender<bool>>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the in-flight request, creating one if none is pending.
    /// Returns a receiver that flips to `true` when the slot resolves.
    pub fn arm(&self) -> watch::Receiver<bool> {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(tx) => tx.subscribe(),
            None => {
                let (tx, rx) = watch::channel(false);
                *slot = Some(tx);
                rx
            }
        }
    }

    /// Resolve the slot, waking every waiter. No-op when nothing is
    /// pending.
    pub fn resolve(&self) {
        let tx = self.inner.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(tx) = tx {
            let _ = tx.send(true);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Wait until the slot resolves or the timer expires, whichever is
    /// first. On expiry, the slot is cleared only if it still holds this
    /// waiter's generation; a newer request keeps its own timer.
    pub async fn wait(&self, mut rx: watch::Receiver<bool>) {
        let done = tokio::time::timeout(REPLY_TIMEOUT, rx.wait_for(|done| *done));
        // An Err from wait_for means the sender is gone (session torn
        // down); the request completes with no data either way.
        if done.await.is_err() {
            self.expire(&rx);
        }
    }

    fn expire(&self, rx: &watch::Receiver<bool>) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = slot.as_ref() {
            if tx.subscribe().same_channel(rx) {
                if let Some(tx) = slot.take() {
                    let _ = tx.send(true);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn concurrent_waiters_share_one_channel() {
        let slot = PendingSlot::new();
        let rx1 = slot.arm();
        let rx2 = slot.arm();
        assert!(rx1.same_channel(&rx2));
    }

    #[test]
    fn resolve_clears_the_slot() {
        let slot = PendingSlot::new();
        let _rx = slot.arm();
        assert!(slot.is_armed());
        slot.resolve();
        assert!(!slot.is_armed());

        // Next request gets a fresh channel.
        let rx2 = slot.arm();
        assert!(!_rx.same_channel(&rx2));
    }

    #[tokio::test(start_paused = true)]
    async fn reply_wakes_every_waiter() {
        let slot = Arc::new(PendingSlot::new());
        let a = {
            let slot = Arc::clone(&slot);
            let rx = slot.arm();
            tokio::spawn(async move { slot.wait(rx).await })
        };
        let b = {
            let slot = Arc::clone(&slot);
            let rx = slot.arm();
            tokio::spawn(async move { slot.wait(rx).await })
        };
        tokio::task::yield_now().await;

        slot.resolve();
        a.await.unwrap();
        b.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_wakes_every_waiter() {
        let slot = Arc::new(PendingSlot::new());
        let rx1 = slot.arm();
        let rx2 = slot.arm();
        let a = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.wait(rx1).await })
        };
        let b = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move { slot.wait(rx2).await })
        };
        tokio::task::yield_now().await;

        tokio::time::advance(REPLY_TIMEOUT + Duration::from_millis(1)).await;
        a.await.unwrap();
        b.await.unwrap();
        assert!(!slot.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_expiry_leaves_newer_request_alone() {
        let slot = PendingSlot::new();
        let stale = slot.arm();
        slot.resolve();

        // A new request armed after the old one resolved.
        let fresh = slot.arm();
        slot.expire(&stale);
        assert!(slot.is_armed(), "fresh slot must survive a stale expiry");
        drop(fresh);
    }
}
