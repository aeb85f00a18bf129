//! Identifiers used throughout the Rosca engine.
//!
//! Participants, owners, the pool and token types are all 20-byte
//! [`Address`]es. Circles are numbered sequentially by [`CircleId`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{RoscaError, constants::ADDRESS_LEN};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte participant identity, already authenticated by the host.
///
/// Serialized as a `0x`-prefixed lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The zero identity. Never a valid owner or member.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Address whose last eight bytes are `n` (big-endian). Useful for
    /// fixtures and deterministic test identities.
    #[must_use]
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = RoscaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits)
            .map_err(|e| RoscaError::Serialization(format!("address {s:?}: {e}")))?;
        let bytes: [u8; ADDRESS_LEN] = raw.try_into().map_err(|v: Vec<u8>| {
            RoscaError::Serialization(format!(
                "address {s:?}: expected {ADDRESS_LEN} bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = RoscaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// A random non-zero address for tests.
    pub fn random() -> Self {
        loop {
            let addr = Self(rand::random::<[u8; ADDRESS_LEN]>());
            if !addr.is_zero() {
                return addr;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Identity of a fungible-token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub Address);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CircleId
// ---------------------------------------------------------------------------

/// Sequential circle identifier. Assigned at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CircleId(pub u64);

impl fmt::Display for CircleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circle:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
