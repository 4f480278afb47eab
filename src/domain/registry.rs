//! Bidirectional code ↔ connection index.
//!
//! [`ConnectionRegistry`] keeps `code → connection` and `connection → code`
//! in lockstep so reverse lookups never need a scan. It is a plain data
//! structure; the [`crate::service::Broker`] lock serializes all access.

use std::collections::HashMap;

use super::{ConnectionId, PairingCode};

/// Side effects of a [`ConnectionRegistry::register`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Code the registering connection held before, if it was different.
    pub released: Option<PairingCode>,
    /// Other connection that held the requested code and lost it.
    pub displaced: Option<ConnectionId>,
}

/// Maps each live connection to at most one code and each code to at
/// most one connection.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_code: HashMap<PairingCode, ConnectionId>,
    by_connection: HashMap<ConnectionId, PairingCode>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `code` to `connection`, overwriting both directions.
    ///
    /// The connection's previous code (if different) is released, and a
    /// different connection holding `code` loses it. Registering the code
    /// a connection already holds is a no-op.
    pub fn register(&mut self, connection: ConnectionId, code: PairingCode) -> Registration {
        let mut outcome = Registration::default();

        if let Some(current) = self.by_connection.get(&connection) {
            if *current == code {
                return outcome;
            }
            if let Some(old) = self.by_connection.remove(&connection) {
                self.by_code.remove(&old);
                outcome.released = Some(old);
            }
        }

        if let Some(holder) = self.by_code.insert(code.clone(), connection)
            && holder != connection
        {
            self.by_connection.remove(&holder);
            outcome.displaced = Some(holder);
        }
        self.by_connection.insert(connection, code);

        outcome
    }

    /// Returns the connection currently holding `code`.
    #[must_use]
    pub fn lookup(&self, code: &PairingCode) -> Option<ConnectionId> {
        self.by_code.get(code).copied()
    }

    /// Returns the code registered by `connection`, if any.
    #[must_use]
    pub fn code_of(&self, connection: ConnectionId) -> Option<&PairingCode> {
        self.by_connection.get(&connection)
    }

    /// Removes every entry referencing `connection` and returns the code
    /// it held.
    pub fn release(&mut self, connection: ConnectionId) -> Option<PairingCode> {
        let code = self.by_connection.remove(&connection)?;
        self.by_code.remove(&code);
        Some(code)
    }

    /// Number of registered codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Returns `true` if no code is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Returns `true` if any entry, in either direction, mentions `connection`.
    #[must_use]
    pub fn references(&self, connection: ConnectionId) -> bool {
        self.by_connection.contains_key(&connection)
            || self.by_code.values().any(|c| *c == connection)
    }
}
