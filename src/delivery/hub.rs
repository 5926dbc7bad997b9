//! Fan-out of `ChangeEvent`s to subscribed clients.
//!
//! Each subscriber owns an unbounded receiver. `publish` never waits on a
//! subscriber: it pushes into every live channel and forgets the ones whose
//! receiving side is gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};

use crate::article::ChangeEvent;

struct Subscriber {
    id: u64,
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

#[derive(Default)]
pub struct Hub {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    /// Signalled after every publish that reached at least one subscriber
    wake: Arc<Notify>,
}

/// Receiving end of a subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event (`None` once the hub is gone).
    #[cfg(test)]
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Next queued event, if any.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(Subscriber { id, tx });
        crate::debug!("hub"; "subscriber {} added", id);
        Subscription { id, rx }
    }

    /// Deliver `event` to every live subscriber. Returns how many received it.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let delivered = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|sub| {
                let alive = sub.tx.send(event.clone()).is_ok();
                if !alive {
                    crate::debug!("hub"; "subscriber {} dropped", sub.id);
                }
                alive
            });
            subscribers.len()
        };

        if delivered > 0 {
            self.wake.notify_one();
        }
        delivered
    }

    /// Live subscribers (closed ones are not counted).
    pub fn len(&self) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|sub| !sub.tx.is_closed());
        subscribers.len()
    }

    /// Handle to wait on for "something was published".
    pub fn wake_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }
}
