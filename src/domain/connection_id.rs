//! Transport-assigned connection identity.
//!
//! [`ConnectionId`] is a newtype around [`uuid::Uuid`] (v4). The broker
//! assigns one per accepted WebSocket; clients never choose it, they only
//! echo it back (e.g. when answering a pairing request).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of one live client connection.
///
/// Unique per connection and never reused. It keys the connection's
/// mailbox and the id→code side of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `ConnectionId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for ConnectionId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let uuid = uuid::Uuid::new_v4();
        let id = ConnectionId::from_uuid(uuid);
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn parses_from_client_echo() {
        let id = ConnectionId::new();
        let echoed = format!("\"{id}\"");
        let Ok(parsed) = serde_json::from_str::<ConnectionId>(&echoed) else {
            panic!("deserialization failed");
        };
        assert_eq!(parsed, id);
        assert_eq!(*parsed.as_uuid(), *id.as_uuid());
    }
}
