//! Pairing handshake: request, then accept or reject.
//!
//! The broker keeps no record of pending requests. A request is forwarded
//! to the target's connection as `pairingRequested`, and the target's
//! answer names the requester's connection directly. Unanswered requests
//! never expire.

use super::Broker;
use crate::domain::{ConnectionId, PairingCode, Role, ServerEvent};
use crate::error::BrokerError;

impl Broker {
    /// Forwards a pairing request from `connection` to the holder of
    /// `target`.
    ///
    /// The sender is identified by its registered code. `claimed_sender`
    /// is the code the client put in the request, if any, and must match.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::NotRegistered`] if `connection` has no code.
    /// - [`BrokerError::SenderMismatch`] if `claimed_sender` is not the
    ///   caller's code.
    /// - [`BrokerError::SelfPairing`] if `target` is the caller's own code.
    /// - [`BrokerError::TargetNotFound`] if nobody holds `target`.
    pub async fn request_pairing(
        &self,
        connection: ConnectionId,
        target: PairingCode,
        claimed_sender: Option<PairingCode>,
    ) -> Result<(), BrokerError> {
        let state = self.lock().await;

        let sender_code = state
            .registry
            .code_of(connection)
            .cloned()
            .ok_or(BrokerError::NotRegistered)?;
        if let Some(claimed) = claimed_sender
            && claimed != sender_code
        {
            return Err(BrokerError::SenderMismatch {
                claimed: claimed.to_string(),
                registered: sender_code.to_string(),
            });
        }
        if target == sender_code {
            return Err(BrokerError::SelfPairing(target.to_string()));
        }
        let target_connection = state
            .registry
            .lookup(&target)
            .ok_or_else(|| BrokerError::TargetNotFound(target.to_string()))?;

        tracing::info!(sender = %sender_code, %target, "pairing requested");
        state.send(
            target_connection,
            ServerEvent::PairingRequested {
                sender_code,
                sender_connection: connection,
            },
        );
        Ok(())
    }

    /// Applies `connection`'s answer to the request sent by `requester`.
    ///
    /// On accept both codes are bridged; the requester is told it is the
    /// [`Role::Controller`] and the accepter that it is
    /// [`Role::Controlled`]. On reject only the requester is told, and
    /// nothing is recorded.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::NotRegistered`] if `connection` has no code.
    /// - [`BrokerError::RequesterGone`] if `requester` disconnected or no
    ///   longer holds a code.
    /// - [`BrokerError::AlreadyPaired`] / [`BrokerError::SelfPairing`] if
    ///   the bridge cannot be created; the requester receives the same
    ///   error as `pairingError`.
    pub async fn respond_to_pairing(
        &self,
        connection: ConnectionId,
        requester: ConnectionId,
        accepted: bool,
    ) -> Result<(), BrokerError> {
        let mut state = self.lock().await;

        let accepter_code = state
            .registry
            .code_of(connection)
            .cloned()
            .ok_or(BrokerError::NotRegistered)?;
        let requester_code = state
            .registry
            .code_of(requester)
            .cloned()
            .ok_or(BrokerError::RequesterGone)?;

        if !accepted {
            tracing::info!(requester = %requester_code, target = %accepter_code, "pairing rejected");
            state.send(requester, ServerEvent::PairingRejected);
            return Ok(());
        }

        if let Err(err) = state.pairs.bridge(&requester_code, &accepter_code) {
            tracing::warn!(
                requester = %requester_code,
                target = %accepter_code,
                error = %err,
                "pairing accept could not be applied"
            );
            state.send(requester, err.to_event());
            return Err(err);
        }

        tracing::info!(
            controller = %requester_code,
            controlled = %accepter_code,
            "pairing accepted"
        );
        state.send(
            requester,
            ServerEvent::PairingAccepted {
                peer_code: accepter_code,
                role: Role::Controller,
            },
        );
        state.send(
            connection,
            ServerEvent::PairingAccepted {
                peer_code: requester_code,
                role: Role::Controlled,
            },
        );
        Ok(())
    }
}
