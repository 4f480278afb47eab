//! Human-shareable pairing codes and the stateless code issuer.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::BrokerError;

/// Largest supported code width; `10^18` still fits in a `u64`.
pub const MAX_CODE_LENGTH: u32 = 18;

/// A code a client registers to become reachable.
///
/// The broker only requires it to be non-empty (after trimming); format
/// rules such as "nine digits" belong to the issuer and the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PairingCode(String);

impl PairingCode {
    /// Validates and wraps a raw code.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InvalidCode`] if the value is empty or only
    /// whitespace.
    pub fn parse(raw: impl Into<String>) -> Result<Self, BrokerError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BrokerError::InvalidCode(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PairingCode {
    type Error = BrokerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PairingCode> for String {
    fn from(code: PairingCode) -> Self {
        code.0
    }
}

/// Issues fresh fixed-width numeric codes.
///
/// Stateless: issued codes are not reserved, and the broker accepts
/// whatever a client later registers.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: u32,
}

impl CodeGenerator {
    /// Creates a generator for codes of `length` digits, clamped to
    /// `1..=MAX_CODE_LENGTH`.
    #[must_use]
    pub fn new(length: u32) -> Self {
        Self {
            length: length.clamp(1, MAX_CODE_LENGTH),
        }
    }

    /// Number of digits in every issued code.
    #[must_use]
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Draws a uniformly random code with no leading zero.
    #[must_use]
    pub fn generate(&self) -> PairingCode {
        let min = 10u64.pow(self.length - 1);
        let max = 10u64.pow(self.length) - 1;
        let value = rand::thread_rng().gen_range(min..=max);
        PairingCode(value.to_string())
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(9)
    }
}
