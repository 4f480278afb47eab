//! Active-pair table: which two codes are bridged and in which roles.
//!
//! Entries always come in symmetric pairs. [`PairTable::bridge`] writes
//! both halves and [`PairTable::unbridge`] removes both halves in the same
//! call, so no caller holding the broker lock can see a one-sided pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::PairingCode;
use crate::error::BrokerError;

/// Role a code holds inside an active pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The original requester; drives the remote session.
    Controller,
    /// The accepter; its side is being controlled.
    Controlled,
}

impl Role {
    /// Returns the role held by the other side of the pair.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Controller => Self::Controlled,
            Self::Controlled => Self::Controller,
        }
    }
}

#[derive(Debug, Clone)]
struct PairEntry {
    peer: PairingCode,
    role: Role,
}

/// Symmetric `code → (peer, role)` relation for bridged codes.
#[derive(Debug, Default)]
pub struct PairTable {
    entries: HashMap<PairingCode, PairEntry>,
}

impl PairTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridges `controller` and `controlled`.
    ///
    /// Re-bridging two codes that are already paired with each other
    /// refreshes their roles.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::SelfPairing`] if both codes are equal, or
    /// [`BrokerError::AlreadyPaired`] if either code is bridged to a third
    /// code. The table is unchanged on error.
    pub fn bridge(
        &mut self,
        controller: &PairingCode,
        controlled: &PairingCode,
    ) -> Result<(), BrokerError> {
        if controller == controlled {
            return Err(BrokerError::SelfPairing(controller.to_string()));
        }
        for (code, other) in [(controller, controlled), (controlled, controller)] {
            if let Some(entry) = self.entries.get(code)
                && entry.peer != *other
            {
                return Err(BrokerError::AlreadyPaired(code.to_string()));
            }
        }

        self.entries.insert(
            controller.clone(),
            PairEntry {
                peer: controlled.clone(),
                role: Role::Controller,
            },
        );
        self.entries.insert(
            controlled.clone(),
            PairEntry {
                peer: controller.clone(),
                role: Role::Controlled,
            },
        );
        Ok(())
    }

    /// Returns the code bridged to `code`.
    #[must_use]
    pub fn peer_of(&self, code: &PairingCode) -> Option<&PairingCode> {
        self.entries.get(code).map(|e| &e.peer)
    }

    /// Returns the role `code` holds in its pair.
    #[must_use]
    pub fn role_of(&self, code: &PairingCode) -> Option<Role> {
        self.entries.get(code).map(|e| e.role)
    }

    /// Removes the pair containing `code` and returns the former peer.
    pub fn unbridge(&mut self, code: &PairingCode) -> Option<PairingCode> {
        let entry = self.entries.remove(code)?;
        if self
            .entries
            .get(&entry.peer)
            .is_some_and(|back| back.peer == *code)
        {
            self.entries.remove(&entry.peer);
        }
        Some(entry.peer)
    }

    /// Iterates over every bridged code.
    pub fn codes(&self) -> impl Iterator<Item = &PairingCode> {
        self.entries.keys()
    }

    /// Number of active pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len() / 2
    }

    /// Returns `true` if no pair is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if every entry's peer points back at it.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.entries.iter().all(|(code, entry)| {
            self.entries
                .get(&entry.peer)
                .is_some_and(|back| back.peer == *code && back.role == entry.role.opposite())
        })
    }
}
