//! The broker: shared state plus the registration path.
//!
//! [`Broker`] owns the [`ConnectionRegistry`], the [`PairTable`] and every
//! connection's [`Mailbox`] behind one [`tokio::sync::Mutex`]. Each
//! operation locks once, applies all of its state changes, enqueues every
//! resulting notification, and unlocks, so no other connection can observe
//! an intermediate state. Nothing awaits I/O while the lock is held.
//!
//! Pairing, relay, and lifecycle operations live in sibling modules as
//! further `impl Broker` blocks.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::CodeConflictPolicy;
use crate::domain::{
    ConnectionId, ConnectionRegistry, Mailbox, PairTable, PairingCode, ServerEvent,
};
use crate::error::BrokerError;

/// Counters describing the broker at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrokerStats {
    /// Live WebSocket connections.
    pub connections: usize,
    /// Codes currently registered.
    pub registered_codes: usize,
    /// Active pairs.
    pub active_pairs: usize,
}

/// Everything guarded by the broker lock.
#[derive(Debug, Default)]
pub(crate) struct BrokerState {
    pub(crate) registry: ConnectionRegistry,
    pub(crate) pairs: PairTable,
    pub(crate) mailboxes: HashMap<ConnectionId, Mailbox>,
}

impl BrokerState {
    /// Enqueues `event` for `connection`; dropped if it is gone.
    pub(crate) fn send(&self, connection: ConnectionId, event: ServerEvent) -> bool {
        let name = event.name();
        let delivered = self
            .mailboxes
            .get(&connection)
            .is_some_and(|mailbox| mailbox.deliver(event));
        if !delivered {
            tracing::debug!(%connection, event = name, "dropping event for closed connection");
        }
        delivered
    }

    /// Removes the pair containing `code` and tells the peer's live
    /// connection, if any. Returns the former peer code.
    pub(crate) fn teardown_pair(&mut self, code: &PairingCode) -> Option<PairingCode> {
        let peer = self.pairs.unbridge(code)?;
        tracing::info!(%code, %peer, "pair closed");
        if let Some(peer_connection) = self.registry.lookup(&peer) {
            self.send(peer_connection, ServerEvent::PeerDisconnected);
        }
        Some(peer)
    }
}

/// Signaling and session-pairing broker.
///
/// Shared by every connection task through an `Arc<Broker>`.
#[derive(Debug)]
pub struct Broker {
    state: Mutex<BrokerState>,
    conflict_policy: CodeConflictPolicy,
}

impl Broker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new(conflict_policy: CodeConflictPolicy) -> Self {
        Self {
            state: Mutex::new(BrokerState::default()),
            conflict_policy,
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().await
    }

    /// Policy applied when a code is registered twice.
    #[must_use]
    pub const fn conflict_policy(&self) -> CodeConflictPolicy {
        self.conflict_policy
    }

    /// Binds `code` to `connection` and acknowledges with `registered`.
    ///
    /// A previous code held by the connection is released and its pair,
    /// if any, torn down. Under [`CodeConflictPolicy::Overwrite`] a
    /// different connection holding `code` loses it: its pair is torn
    /// down and it receives `codeRevoked`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::CodeInUse`] under
    /// [`CodeConflictPolicy::Reject`] if another live connection holds
    /// `code`.
    pub async fn register(
        &self,
        connection: ConnectionId,
        code: PairingCode,
    ) -> Result<(), BrokerError> {
        let mut state = self.lock().await;

        if self.conflict_policy == CodeConflictPolicy::Reject
            && state
                .registry
                .lookup(&code)
                .is_some_and(|holder| holder != connection)
        {
            return Err(BrokerError::CodeInUse(code.to_string()));
        }

        // Tear pairs down before the registry changes: `teardown_pair`
        // resolves the peer through the current code → connection map.
        let released = state
            .registry
            .code_of(connection)
            .filter(|held| **held != code)
            .cloned();
        if let Some(released) = &released {
            state.teardown_pair(released);
        }
        let holder_was_paired = state
            .registry
            .lookup(&code)
            .is_some_and(|holder| holder != connection)
            && state.teardown_pair(&code).is_some();

        let outcome = state.registry.register(connection, code.clone());
        if let Some(displaced) = outcome.displaced {
            tracing::warn!(%code, %displaced, %connection, "code taken over by new registrant");
            if holder_was_paired {
                state.send(displaced, ServerEvent::PeerDisconnected);
            }
            state.send(displaced, ServerEvent::CodeRevoked { code: code.clone() });
        }

        tracing::info!(%connection, %code, "code registered");
        state.send(connection, ServerEvent::Registered { code });
        Ok(())
    }

    /// Returns the connection holding `code`.
    pub async fn lookup(&self, code: &PairingCode) -> Option<ConnectionId> {
        self.lock().await.registry.lookup(code)
    }

    /// Returns the code registered by `connection`.
    pub async fn code_of(&self, connection: ConnectionId) -> Option<PairingCode> {
        self.lock().await.registry.code_of(connection).cloned()
    }

    /// Returns the code `code` is paired with.
    pub async fn peer_of(&self, code: &PairingCode) -> Option<PairingCode> {
        self.lock().await.pairs.peer_of(code).cloned()
    }

    /// Returns `true` if any registry entry or mailbox still refers to
    /// `connection`.
    pub async fn references(&self, connection: ConnectionId) -> bool {
        let state = self.lock().await;
        state.registry.references(connection) || state.mailboxes.contains_key(&connection)
    }

    /// Returns `true` if the pair table is symmetric and every paired code
    /// is registered.
    pub async fn is_consistent(&self) -> bool {
        let state = self.lock().await;
        state.pairs.is_symmetric()
            && state
                .pairs
                .codes()
                .all(|code| state.registry.lookup(code).is_some())
    }

    /// Takes a snapshot of the broker counters.
    pub async fn stats(&self) -> BrokerStats {
        let state = self.lock().await;
        BrokerStats {
            connections: state.mailboxes.len(),
            registered_codes: state.registry.len(),
            active_pairs: state.pairs.len(),
        }
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(CodeConflictPolicy::default())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod test_support {
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;

    pub(crate) fn code(raw: &str) -> PairingCode {
        let Ok(code) = PairingCode::parse(raw) else {
            panic!("invalid test code {raw}");
        };
        code
    }

    pub(crate) struct TestClient {
        pub(crate) id: ConnectionId,
        pub(crate) rx: UnboundedReceiver<ServerEvent>,
    }

    impl TestClient {
        pub(crate) async fn connect(broker: &Broker) -> Self {
            let (mailbox, rx) = Mailbox::channel();
            let id = broker.connect(mailbox).await;
            Self { id, rx }
        }

        pub(crate) async fn registered(broker: &Broker, raw: &str) -> Self {
            let mut client = Self::connect(broker).await;
            if broker.register(client.id, code(raw)).await.is_err() {
                panic!("registration of {raw} failed");
            }
            assert_eq!(
                client.drain(),
                vec![ServerEvent::Registered { code: code(raw) }]
            );
            client
        }

        pub(crate) fn drain(&mut self) -> Vec<ServerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    /// Registers two clients and runs request + accept between them.
    pub(crate) async fn bridged_pair(
        broker: &Broker,
        requester: &str,
        accepter: &str,
    ) -> (TestClient, TestClient) {
        let mut a = TestClient::registered(broker, requester).await;
        let mut b = TestClient::registered(broker, accepter).await;
        if broker.request_pairing(a.id, code(accepter), None).await.is_err() {
            panic!("pairing request failed");
        }
        if broker.respond_to_pairing(b.id, a.id, true).await.is_err() {
            panic!("pairing accept failed");
        }
        a.drain();
        b.drain();
        (a, b)
    }
}
