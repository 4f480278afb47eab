//! Connection setup and teardown.
//!
//! Disconnect runs release → unbridge → notify under one lock acquisition,
//! so a request racing the disconnect sees either the full old state or
//! the fully cleaned state.

use super::Broker;
use crate::domain::{ConnectionId, Mailbox, PairingCode};
use crate::error::BrokerError;

impl Broker {
    /// Admits a new connection and returns its identity.
    ///
    /// The connection is unreachable by code until it registers.
    pub async fn connect(&self, mailbox: Mailbox) -> ConnectionId {
        let connection = ConnectionId::new();
        self.lock().await.mailboxes.insert(connection, mailbox);
        tracing::info!(%connection, "client connected");
        connection
    }

    /// Removes every trace of `connection`.
    ///
    /// The registered code is released; if it was paired, the pair is
    /// removed and the peer receives `peerDisconnected`. Calling this for
    /// an unknown connection is a no-op.
    pub async fn disconnect(&self, connection: ConnectionId) {
        let mut state = self.lock().await;
        state.mailboxes.remove(&connection);
        let released = state.registry.release(connection);
        let peer = released.as_ref().and_then(|code| state.teardown_pair(code));
        tracing::info!(
            %connection,
            code = released.as_ref().map(PairingCode::as_str),
            peer = peer.as_ref().map(PairingCode::as_str),
            "client disconnected"
        );
    }

    /// Closes the caller's active pair on request.
    ///
    /// The peer receives `peerDisconnected`; both stay registered.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::NotRegistered`] if the caller holds no code,
    /// or [`BrokerError::NotPaired`] if it has no pair.
    pub async fn close_pair(&self, connection: ConnectionId) -> Result<(), BrokerError> {
        let mut state = self.lock().await;
        let code = state
            .registry
            .code_of(connection)
            .cloned()
            .ok_or(BrokerError::NotRegistered)?;
        state
            .teardown_pair(&code)
            .map(|_| ())
            .ok_or(BrokerError::NotPaired)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::super::test_support::{TestClient, bridged_pair, code};
    use super::*;
    use crate::domain::ServerEvent;

    #[tokio::test]
    async fn disconnect_notifies_peer_once_and_clears_pair() {
        let broker = Broker::default();
        let (a, mut b) = bridged_pair(&broker, "111111111", "222222222").await;

        broker.disconnect(a.id).await;

        assert_eq!(b.drain(), vec![ServerEvent::PeerDisconnected]);
        assert_eq!(broker.peer_of(&code("222222222")).await, None);
        assert_eq!(broker.peer_of(&code("111111111")).await, None);
        assert!(!broker.references(a.id).await);
        assert!(broker.is_consistent().await);

        // Repeating the disconnect does not notify again.
        broker.disconnect(a.id).await;
        assert!(b.drain().is_empty());
    }

    #[tokio::test]
    async fn disconnect_of_unregistered_connection_leaves_nothing() {
        let broker = Broker::default();
        let client = TestClient::connect(&broker).await;
        assert!(broker.references(client.id).await);

        broker.disconnect(client.id).await;
        assert!(!broker.references(client.id).await);
        assert_eq!(broker.stats().await.connections, 0);
    }

    #[tokio::test]
    async fn both_sides_disconnecting_leaves_empty_broker() {
        let broker = Broker::default();
        let (a, b) = bridged_pair(&broker, "1", "2").await;
        broker.disconnect(b.id).await;
        broker.disconnect(a.id).await;

        let stats = broker.stats().await;
        assert_eq!(stats.connections, 0);
        assert_eq!(stats.registered_codes, 0);
        assert_eq!(stats.active_pairs, 0);
    }

    #[tokio::test]
    async fn close_pair_keeps_registrations() {
        let broker = Broker::default();
        let (a, mut b) = bridged_pair(&broker, "1", "2").await;

        assert!(broker.close_pair(a.id).await.is_ok());
        assert_eq!(b.drain(), vec![ServerEvent::PeerDisconnected]);
        assert_eq!(broker.lookup(&code("1")).await, Some(a.id));
        assert_eq!(broker.peer_of(&code("2")).await, None);

        assert!(matches!(
            broker.close_pair(a.id).await,
            Err(BrokerError::NotPaired)
        ));
    }

    #[tokio::test]
    async fn close_pair_requires_registration() {
        let broker = Broker::default();
        let client = TestClient::connect(&broker).await;

        assert!(matches!(
            broker.close_pair(client.id).await,
            Err(BrokerError::NotRegistered)
        ));
    }

    #[tokio::test]
    async fn relay_after_peer_disconnect_is_not_delivered() {
        let broker = Broker::default();
        let (a, mut b) = bridged_pair(&broker, "1", "2").await;
        broker.disconnect(a.id).await;
        b.drain();

        let result = broker.relay_signal(b.id, json!({"late": true}), None).await;
        assert!(matches!(result, Err(BrokerError::NotPaired)));
    }

    #[tokio::test]
    async fn concurrent_disconnects_keep_state_symmetric() {
        let broker = Arc::new(Broker::default());
        let mut clients = Vec::new();
        for n in 0..20 {
            let (a, b) = bridged_pair(&broker, &format!("a{n}"), &format!("b{n}")).await;
            clients.push(a);
            clients.push(b);
        }

        let mut handles = Vec::new();
        for client in clients.iter().step_by(2) {
            let broker = Arc::clone(&broker);
            let id = client.id;
            handles.push(tokio::spawn(async move { broker.disconnect(id).await }));
        }
        for handle in handles {
            assert!(handle.await.is_ok());
        }

        assert!(broker.is_consistent().await);
        let stats = broker.stats().await;
        assert_eq!(stats.active_pairs, 0);
        assert_eq!(stats.registered_codes, 20);
        for client in clients.iter_mut().skip(1).step_by(2) {
            assert_eq!(client.drain(), vec![ServerEvent::PeerDisconnected]);
        }
    }
}
