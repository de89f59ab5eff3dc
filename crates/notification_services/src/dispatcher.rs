use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::types::LiveEvent;

const CHANNEL_CAPACITY: usize = 64;

/// Addressed-delivery registry: one broadcast channel per connected user.
///
/// Sessions subscribe on connect; publishing to a user with no live session
/// is a no-op (the persisted notification row is the durable record).
#[derive(Clone, Default)]
pub struct Dispatcher {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<LiveEvent>>>>,
}

impl Dispatcher {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribes a session to the given user's channel, creating the
    /// channel if this is the user's first live session.
    pub async fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<LiveEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Delivers an event to the user's live sessions, if any. Best-effort
    /// and at-most-once: a user with no receivers simply misses the push,
    /// and their dead channel is pruned from the registry.
    pub async fn publish(&self, user_id: Uuid, event: LiveEvent) {
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&user_id) {
                Some(sender) => sender.send(event).is_ok(),
                None => return,
            }
        };

        if !delivered {
            let mut channels = self.channels.write().await;
            if let Some(sender) = channels.get(&user_id) {
                if sender.receiver_count() == 0 {
                    channels.remove(&user_id);
                }
            }
            log::debug!("no live session for user {}, push skipped", user_id);
        }
    }

    /// Number of users with at least one registered channel.
    pub async fn connected_users(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> LiveEvent {
        LiveEvent::BookingCreated {
            booking_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();

        let mut rx = dispatcher.subscribe(user).await;
        dispatcher.publish(user, sample_event()).await;

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, LiveEvent::BookingCreated { .. }));
    }

    #[tokio::test]
    async fn publish_without_subscriber_is_a_noop() {
        let dispatcher = Dispatcher::new();
        dispatcher.publish(Uuid::new_v4(), sample_event()).await;
        assert_eq!(dispatcher.connected_users().await, 0);
    }

    #[tokio::test]
    async fn events_are_addressed_not_broadcast() {
        let dispatcher = Dispatcher::new();
        let target = Uuid::new_v4();
        let bystander = Uuid::new_v4();

        let mut target_rx = dispatcher.subscribe(target).await;
        let mut bystander_rx = dispatcher.subscribe(bystander).await;

        dispatcher.publish(target, sample_event()).await;

        assert!(target_rx.recv().await.is_ok());
        assert!(bystander_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dead_channel_is_pruned_on_publish() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();

        let rx = dispatcher.subscribe(user).await;
        drop(rx);
        assert_eq!(dispatcher.connected_users().await, 1);

        dispatcher.publish(user, sample_event()).await;
        assert_eq!(dispatcher.connected_users().await, 0);
    }

    #[tokio::test]
    async fn all_sessions_of_one_user_receive_the_event() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();

        let mut first = dispatcher.subscribe(user).await;
        let mut second = dispatcher.subscribe(user).await;

        dispatcher.publish(user, sample_event()).await;

        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }
}
