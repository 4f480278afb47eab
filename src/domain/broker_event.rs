//! Events the broker pushes to a client.
//!
//! Every [`ServerEvent`] is serialized as one WebSocket frame of the form
//! `{"type": "<camelCaseName>", "payload": {...}}`. Payloads relayed on
//! behalf of a peer (`signal`, `controlEvent`) are carried as opaque
//! [`serde_json::Value`]s and never inspected.

use serde::{Deserialize, Serialize};

use super::{ConnectionId, PairingCode, Role};

/// Broker → client event vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Acknowledges a `register` command.
    Registered {
        /// Code now bound to the connection.
        code: PairingCode,
    },

    /// The connection's code was taken over by another registrant.
    CodeRevoked {
        /// Code the connection no longer holds.
        code: PairingCode,
    },

    /// Another client asks to pair with this one.
    PairingRequested {
        /// Code of the requesting client.
        sender_code: PairingCode,
        /// Connection reference to echo back in `pairingResponse`.
        sender_connection: ConnectionId,
    },

    /// A pairing was accepted; the pair is now active.
    PairingAccepted {
        /// Code of the other side.
        peer_code: PairingCode,
        /// Role this client holds.
        role: Role,
    },

    /// The target declined the pairing request.
    PairingRejected,

    /// A pairing command could not be carried out.
    PairingError {
        /// Human-readable reason.
        reason: String,
        /// Numeric error code (see [`crate::error::BrokerError::error_code`]).
        code: u32,
    },

    /// Opaque handshake payload relayed from another client.
    Signal {
        /// Payload exactly as the sender submitted it.
        payload: serde_json::Value,
        /// Connection that sent the payload.
        from: ConnectionId,
        /// Registered code of the sender, if it had one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_code: Option<PairingCode>,
    },

    /// Opaque control-input event relayed from the paired peer.
    ControlEvent {
        /// Event exactly as the sender submitted it.
        event: serde_json::Value,
    },

    /// The paired peer disconnected or closed the pair.
    PeerDisconnected,

    /// A single client frame was rejected; the connection stays open.
    Error {
        /// Numeric error code.
        code: u32,
        /// Human-readable message.
        message: String,
    },
}

impl ServerEvent {
    /// Returns the wire name of the event (the `type` field).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::CodeRevoked { .. } => "codeRevoked",
            Self::PairingRequested { .. } => "pairingRequested",
            Self::PairingAccepted { .. } => "pairingAccepted",
            Self::PairingRejected => "pairingRejected",
            Self::PairingError { .. } => "pairingError",
            Self::Signal { .. } => "signal",
            Self::ControlEvent { .. } => "controlEvent",
            Self::PeerDisconnected => "peerDisconnected",
            Self::Error { .. } => "error",
        }
    }
}
