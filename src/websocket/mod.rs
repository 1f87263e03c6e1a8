//! Realtime chat relay.
//!
//! One global room: every connected client sees every broadcast. The
//! channel performs no authentication — any connected party can claim any
//! `sender`/`userName`, faithfully to the system this replaces. The
//! registry below is the explicit set of active connection handles; it is
//! only iterated for broadcast.

use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

use crate::metrics::ACTIVE_CHAT_CONNECTIONS;

pub mod message_types;
pub mod session;

/// Unique identifier for a WebSocket subscriber.
///
/// Each connection gets one when it registers, which allows precise
/// cleanup when the connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriber {
    id: SubscriberId,
    sender: UnboundedSender<String>,
}

/// Connection registry for WebSocket subscribers.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<Vec<Subscriber>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    ///
    /// Returns the subscriber id (used for cleanup) and the channel on
    /// which this subscriber receives broadcast frames.
    pub async fn add_subscriber(&self) -> (SubscriberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let subscriber_id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        guard.push(Subscriber {
            id: subscriber_id,
            sender: tx,
        });
        ACTIVE_CHAT_CONNECTIONS.set(guard.len() as i64);

        tracing::debug!(
            "added subscriber {:?}, total connections: {}",
            subscriber_id,
            guard.len()
        );

        (subscriber_id, rx)
    }

    /// Remove a subscriber. Must be called when a connection closes,
    /// otherwise its entry only disappears on the next broadcast sweep.
    pub async fn remove_subscriber(&self, subscriber_id: SubscriberId) {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|s| s.id != subscriber_id);
        let after = guard.len();
        ACTIVE_CHAT_CONNECTIONS.set(after as i64);

        if before != after {
            tracing::debug!(
                "removed subscriber {:?}, remaining connections: {}",
                subscriber_id,
                after
            );
        }
    }

    /// Deliver one frame to all current subscribers — the sender included.
    /// Dead senders (closed receivers) are dropped along the way.
    pub async fn broadcast(&self, msg: String) {
        let mut guard = self.inner.write().await;
        let before = guard.len();

        guard.retain(|subscriber| subscriber.sender.send(msg.clone()).is_ok());

        let after = guard.len();
        ACTIVE_CHAT_CONNECTIONS.set(after as i64);
        if before != after {
            tracing::debug!(
                "broadcast cleaned up {} dead senders, {} active",
                before - after,
                after
            );
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_receives_each_broadcast_exactly_once() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.add_subscriber().await;
        let (_id_b, mut rx_b) = registry.add_subscriber().await;

        registry.broadcast("one".into()).await;
        registry.broadcast("two".into()).await;

        for rx in [&mut rx_a, &mut rx_b] {
            assert_eq!(rx.recv().await.unwrap(), "one");
            assert_eq!(rx.recv().await.unwrap(), "two");
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn removed_subscribers_stop_receiving() {
        let registry = ConnectionRegistry::new();
        let (id_a, mut rx_a) = registry.add_subscriber().await;
        let (_id_b, mut rx_b) = registry.add_subscriber().await;

        registry.remove_subscriber(id_a).await;
        registry.broadcast("after-removal".into()).await;

        assert!(rx_a.recv().await.is_none());
        assert_eq!(rx_b.recv().await.unwrap(), "after-removal");
        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test]
    async fn dead_receivers_are_swept_during_broadcast() {
        let registry = ConnectionRegistry::new();
        let (_id_a, rx_a) = registry.add_subscriber().await;
        let (_id_b, mut rx_b) = registry.add_subscriber().await;
        drop(rx_a);

        registry.broadcast("still-delivered".into()).await;

        assert_eq!(registry.connection_count().await, 1);
        assert_eq!(rx_b.recv().await.unwrap(), "still-delivered");
    }

    #[tokio::test]
    async fn late_subscribers_only_see_later_broadcasts() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.add_subscriber().await;

        registry.broadcast("early".into()).await;

        let (_id_b, mut rx_b) = registry.add_subscriber().await;
        registry.broadcast("late".into()).await;

        assert_eq!(rx_a.recv().await.unwrap(), "early");
        assert_eq!(rx_a.recv().await.unwrap(), "late");
        assert_eq!(rx_b.recv().await.unwrap(), "late");
        assert!(rx_b.try_recv().is_err());
    }
}
