//! Client → broker frames.
//!
//! Every frame is `{"type": "<camelCaseName>", "payload": {...}}`. Field
//! names are camelCase; the `*Number` / `senderSocketId` spellings used
//! by earlier browser clients are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::domain::{ConnectionId, PairingCode};
use crate::error::BrokerError;

/// Commands a client can send over the broker WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Bind a code to this connection.
    Register {
        /// Code to register.
        #[serde(alias = "requestNumber")]
        code: PairingCode,
    },

    /// Ask the holder of `target_code` to pair.
    RequestPairing {
        /// Code of the client to pair with.
        #[serde(alias = "targetNumber")]
        target_code: PairingCode,
        /// The caller's own code; checked against its registration.
        #[serde(default, alias = "senderNumber", skip_serializing_if = "Option::is_none")]
        sender_code: Option<PairingCode>,
    },

    /// Answer a `pairingRequested` event.
    PairingResponse {
        /// `true` to accept, `false` to reject.
        accepted: bool,
        /// `senderConnection` from the `pairingRequested` being answered.
        #[serde(alias = "senderSocketId")]
        sender_connection: ConnectionId,
    },

    /// Opaque handshake payload for the peer.
    Signal {
        /// Forwarded unmodified.
        payload: serde_json::Value,
        /// Explicit destination; required before a pair exists.
        #[serde(default, alias = "targetNumber", skip_serializing_if = "Option::is_none")]
        target_code: Option<PairingCode>,
    },

    /// Opaque control-input event for the paired peer.
    ControlEvent {
        /// Forwarded unmodified.
        event: serde_json::Value,
        /// Must name the peer when present.
        #[serde(default, alias = "targetNumber", skip_serializing_if = "Option::is_none")]
        target_code: Option<PairingCode>,
    },

    /// End the current pair without disconnecting.
    ClosePair,
}

impl ClientMessage {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::MalformedMessage`] if the frame is not valid
    /// JSON, names an unknown event, or has a malformed payload (including
    /// an empty code).
    pub fn decode(frame: &str) -> Result<Self, BrokerError> {
        serde_json::from_str(frame).map_err(|e| BrokerError::MalformedMessage(e.to_string()))
    }

    /// Returns the wire name of the command (the `type` field).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::RequestPairing { .. } => "requestPairing",
            Self::PairingResponse { .. } => "pairingResponse",
            Self::Signal { .. } => "signal",
            Self::ControlEvent { .. } => "controlEvent",
            Self::ClosePair => "closePair",
        }
    }
}
