// ── Change notification ──
//
// Notifiers are called synchronously from inside a refresh cycle, so they
// must not block. Delivery is best effort.

use tokio::sync::broadcast;

use crate::model::RegistryEvent;

const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Receiver of registry change events.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &RegistryEvent);
}

impl<F> Notifier for F
where
    F: Fn(&RegistryEvent) + Send + Sync,
{
    fn notify(&self, event: &RegistryEvent) {
        self(event);
    }
}

/// Fans events out to any number of async subscribers.
///
/// Slow subscribers lag (and skip events) rather than slowing a refresh.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<RegistryEvent>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, event: &RegistryEvent) {
        // No receivers is not an error.
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn event() -> RegistryEvent {
        RegistryEvent::NewDeviceDiscovered { ids: vec![] }
    }

    #[test]
    fn closures_are_notifiers() {
        let seen = Mutex::new(Vec::new());
        let notifier = |e: &RegistryEvent| seen.lock().unwrap().push(e.name());
        notifier.notify(&event());
        assert_eq!(*seen.lock().unwrap(), vec!["new_device_discovered"]);
    }

    #[test]
    fn broadcast_without_receivers_is_silent() {
        let n = BroadcastNotifier::new();
        n.notify(&event());
        assert_eq!(n.receiver_count(), 0);
    }

    #[tokio::test]
    async fn broadcast_delivers_to_subscribers() {
        let n = BroadcastNotifier::new();
        let mut rx = n.subscribe();
        n.notify(&event());
        assert_eq!(rx.recv().await.unwrap(), event());
    }
}
