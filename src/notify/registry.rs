//! In-process client registry backed by tokio mpsc channels.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use super::{ClientChannel, ClientId};
use crate::error::{CacheError, Result};
use crate::models::ClientMessage;

#[derive(Debug)]
struct ClientSlot {
    sender: mpsc::UnboundedSender<ClientMessage>,
    controlled: bool,
}

/// Open page clients. A client stays registered until its receiver is dropped.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, ClientSlot>>,
    next_id: AtomicU64,
    /// Set once `claim` ran; later clients start out controlled
    claimed: AtomicBool,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new client and returns the receiving end of its channel.
    ///
    /// Clients whose receiver is already gone are dropped on the way in.
    pub async fn register(&self) -> (ClientId, mpsc::UnboundedReceiver<ClientMessage>) {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let (sender, receiver) = mpsc::unbounded_channel();
        let controlled = self.claimed.load(Ordering::SeqCst);

        let mut clients = self.clients.write().await;
        clients.retain(|_, slot| !slot.sender.is_closed());
        clients.insert(id, ClientSlot { sender, controlled });
        debug!(client = %id, controlled, open = clients.len(), "client registered");

        (id, receiver)
    }

    /// Registers a client whose entry is removed as soon as the subscription drops.
    pub async fn subscribe(self: &Arc<Self>) -> ClientSubscription {
        let (id, receiver) = self.register().await;
        ClientSubscription {
            id,
            receiver,
            registry: Arc::clone(self),
        }
    }

    pub async fn unregister(&self, id: &ClientId) -> bool {
        let removed = self.clients.write().await.remove(id).is_some();
        if removed {
            debug!(client = %id, "client unregistered");
        }
        removed
    }

    pub async fn is_controlled(&self, id: &ClientId) -> bool {
        self.clients
            .read()
            .await
            .get(id)
            .is_some_and(|slot| slot.controlled)
    }

    /// Number of registered clients, including ones not yet pruned.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn prune_closed(&self) {
        self.clients
            .write()
            .await
            .retain(|_, slot| !slot.sender.is_closed());
    }
}

// == Client Subscription ==
/// Receiving end of one registered client.
#[derive(Debug)]
pub struct ClientSubscription {
    id: ClientId,
    receiver: mpsc::UnboundedReceiver<ClientMessage>,
    registry: Arc<ClientRegistry>,
}

impl ClientSubscription {
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Next message for this client; `None` once the registry is gone.
    pub async fn recv(&mut self) -> Option<ClientMessage> {
        self.receiver.recv().await
    }
}

impl Drop for ClientSubscription {
    fn drop(&mut self) {
        self.receiver.close();

        if let Ok(mut clients) = self.registry.clients.try_write() {
            clients.remove(&self.id);
            debug!(client = %self.id, "client unregistered");
            return;
        }

        // Lock is busy: finish on a task. Without a runtime the closed sender
        // is swept by the next register, claim or match_all.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let registry = Arc::clone(&self.registry);
            let id = self.id;
            handle.spawn(async move {
                registry.unregister(&id).await;
            });
        }
    }
}

#[async_trait]
impl ClientChannel for ClientRegistry {
    async fn claim(&self) -> Result<usize> {
        self.prune_closed().await;
        self.claimed.store(true, Ordering::SeqCst);

        let mut clients = self.clients.write().await;
        for slot in clients.values_mut() {
            slot.controlled = true;
        }
        Ok(clients.len())
    }

    async fn match_all(&self) -> Result<Vec<ClientId>> {
        self.prune_closed().await;

        let mut ids: Vec<ClientId> = self
            .clients
            .read()
            .await
            .iter()
            .filter(|(_, slot)| slot.controlled)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn post_message(&self, client: &ClientId, message: &ClientMessage) -> Result<()> {
        let clients = self.clients.read().await;
        let slot = clients
            .get(client)
            .ok_or_else(|| CacheError::Notify(format!("{} is not registered", client)))?;

        slot.sender
            .send(*message)
            .map_err(|_| CacheError::Notify(format!("{} has disconnected", client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_assigns_unique_ids() {
        let registry = ClientRegistry::new();
        let (a, _rx_a) = registry.register().await;
        let (b, _rx_b) = registry.register().await;

        assert_ne!(a, b);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_match_all_only_returns_controlled() {
        let registry = ClientRegistry::new();
        let (_a, _rx_a) = registry.register().await;
        assert!(registry.match_all().await.unwrap().is_empty());

        assert_eq!(registry.claim().await.unwrap(), 1);
        assert_eq!(registry.match_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clients_after_claim_start_controlled() {
        let registry = ClientRegistry::new();
        registry.claim().await.unwrap();

        let (id, _rx) = registry.register().await;
        assert!(registry.is_controlled(&id).await);
    }

    #[tokio::test]
    async fn test_post_message_delivers() {
        let registry = ClientRegistry::new();
        let (id, mut rx) = registry.register().await;

        registry
            .post_message(&id, &ClientMessage::SyncOfflineSubmissions)
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(ClientMessage::SyncOfflineSubmissions));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let registry = ClientRegistry::new();
        registry.claim().await.unwrap();
        let (_id, rx) = registry.register().await;
        drop(rx);

        assert!(registry.match_all().await.unwrap().is_empty());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_post_to_unknown_client_fails() {
        let registry = ClientRegistry::new();
        let result = registry
            .post_message(&ClientId(42), &ClientMessage::SyncOfflineSubmissions)
            .await;
        assert!(matches!(result, Err(CacheError::Notify(_))));
    }

    #[tokio::test]
    async fn test_register_sweeps_dropped_receivers() {
        let registry = ClientRegistry::new();
        registry.claim().await.unwrap();

        for _ in 0..1000 {
            let (_id, rx) = registry.register().await;
            drop(rx);
        }

        // Only the most recent one is left until the next register
        assert_eq!(registry.len().await, 1);
        let (_id, _rx) = registry.register().await;
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_dropped_subscription_unregisters() {
        let registry = Arc::new(ClientRegistry::new());
        registry.claim().await.unwrap();

        for _ in 0..1000 {
            drop(registry.subscribe().await);
        }

        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_subscription_dropped_while_locked_unregisters_later() {
        let registry = Arc::new(ClientRegistry::new());
        let subscription = registry.subscribe().await;
        let id = subscription.id();

        {
            let _busy = registry.clients.read().await;
            drop(subscription);
        }

        for _ in 0..50 {
            if registry.is_empty().await {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("{} was never unregistered", id);
    }

    #[tokio::test]
    async fn test_subscription_receives_posts() {
        let registry = Arc::new(ClientRegistry::new());
        let mut subscription = registry.subscribe().await;

        registry
            .post_message(&subscription.id(), &ClientMessage::SyncOfflineSubmissions)
            .await
            .unwrap();

        assert_eq!(subscription.recv().await, Some(ClientMessage::SyncOfflineSubmissions));
    }

    #[test]
    fn test_subscription_drop_outside_runtime() {
        let registry = Arc::new(ClientRegistry::new());
        let subscription = tokio_test::block_on(registry.subscribe());
        assert_eq!(tokio_test::block_on(registry.len()), 1);

        drop(subscription);

        assert!(tokio_test::block_on(registry.is_empty()));
    }
}
