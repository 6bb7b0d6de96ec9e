//! Subscriber registry and broadcast router.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::{debug, info, warn};
use tokio::sync::mpsc;

/// Size of the per-subscriber send buffer. A full buffer applies
/// backpressure to the router; it never drops events.
const SUBSCRIBER_BUFFER_SIZE: usize = 64;

/// Identity of one viewer connection. Never reused; a reconnect is a new
/// subscriber.
pub type SubscriberId = u64;

/// Registry of live viewer connections plus the producer side of the
/// broadcast event queue.
///
/// Registration and removal are safe from any task, including from the
/// router's own eviction path while a delivery pass is in progress.
pub struct ChatHub {
    subscribers: DashMap<SubscriberId, mpsc::Sender<String>>,
    next_id: AtomicU64,
    event_tx: mpsc::UnboundedSender<String>,
}

impl ChatHub {
    /// Create the hub and its paired router. The router must be driven for
    /// published events to reach subscribers.
    pub fn new() -> (Arc<Self>, BroadcastRouter) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let hub = Arc::new(Self {
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(0),
            event_tx,
        });
        let router = BroadcastRouter {
            hub: Arc::clone(&hub),
            event_rx,
        };
        (hub, router)
    }

    /// Register a new viewer connection.
    ///
    /// Returns the subscriber id and the receiving end of its delivery
    /// channel.
    pub fn register(&self) -> (SubscriberId, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER_SIZE);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, tx);
        info!("registered subscriber {id}");
        (id, rx)
    }

    /// Remove a subscriber. Idempotent: a second call, or a concurrent call
    /// from the eviction path and the read loop, is a no-op.
    pub fn unregister(&self, id: SubscriberId) {
        if self.subscribers.remove(&id).is_some() {
            info!("unregistered subscriber {id}");
        }
    }

    /// Queue a payload for delivery to every current subscriber.
    ///
    /// The event queue is unbounded, so publishing never blocks and never
    /// drops; it is callable from synchronous contexts such as the streaming
    /// delta callback.
    pub fn publish(&self, payload: impl Into<String>) {
        if self.event_tx.send(payload.into()).is_err() {
            warn!("broadcast router is gone, discarding event");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver one payload to every subscriber, evicting any whose channel
    /// has closed.
    async fn deliver(&self, payload: &str) {
        // Copy the sender set out first: the registry is never locked across
        // a slow send, and eviction mid-pass cannot corrupt the iteration.
        let targets: Vec<(SubscriberId, mpsc::Sender<String>)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        for (id, tx) in targets {
            if tx.send(payload.to_owned()).await.is_err() {
                debug!("subscriber {id} went away, evicting");
                self.unregister(id);
            }
        }
    }
}

/// Single-consumer distribution loop.
///
/// Per-subscriber failures evict that subscriber and the loop continues; the
/// only exit is queue closure at process shutdown. The serve loop supervises
/// the task and treats an early exit as fatal.
pub struct BroadcastRouter {
    hub: Arc<ChatHub>,
    event_rx: mpsc::UnboundedReceiver<String>,
}

impl BroadcastRouter {
    pub async fn run(mut self) {
        while let Some(payload) = self.event_rx.recv().await {
            debug!(
                "broadcasting {} bytes to {} subscribers",
                payload.len(),
                self.hub.subscriber_count()
            );
            self.hub.deliver(&payload).await;
        }
        info!("broadcast router stopped");
    }
}
