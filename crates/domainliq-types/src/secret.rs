//! Secret material: owner verification tokens, reveal-link tokens, and the
//! sealed at-rest form of transfer authorization secrets.
//!
//! Raw token values are capabilities. `Display` and `Debug` render only a
//! short SHA-256 fingerprint so tokens can appear in logs without leaking;
//! the real value is reachable only through `expose()`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants;

fn fingerprint(value: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(&digest[..4])
}

fn generate_hex() -> String {
    let bytes: [u8; constants::TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

// ---------------------------------------------------------------------------
// OwnerToken
// ---------------------------------------------------------------------------

/// Per-owner verification secret, published in DNS to prove control of a
/// domain. Minted lazily on first registration and stable for the owner's
/// lifetime.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerToken(String);

impl OwnerToken {
    /// Mint a fresh token from CSPRNG entropy.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_hex())
    }

    /// The raw secret value. Prefer `Display` anywhere the value could end
    /// up in logs.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The full TXT record value a seller must publish for this token.
    #[must_use]
    pub fn expected_txt_record(&self) -> String {
        format!("{}{}", constants::TXT_PROOF_PREFIX, self.0)
    }
}

impl fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "otk:{}", fingerprint(&self.0))
    }
}

impl fmt::Debug for OwnerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerToken({self})")
    }
}

/// Known-value constructor for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl OwnerToken {
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

// ---------------------------------------------------------------------------
// RevealToken
// ---------------------------------------------------------------------------

/// Single-use opaque token granting access to an order's reveal view.
/// Minted when the order enters TRANSFERRED, bound 1:1 to that order, and
/// never reused across orders.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevealToken(String);

impl RevealToken {
    /// Mint a fresh token from CSPRNG entropy.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_hex())
    }

    /// The raw token value, for embedding in the reveal link.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevealToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rvt:{}", fingerprint(&self.0))
    }
}

impl fmt::Debug for RevealToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevealToken({self})")
    }
}

/// Known-value constructor for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl RevealToken {
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

// ---------------------------------------------------------------------------
// SealedSecret
// ---------------------------------------------------------------------------

/// Encrypted at-rest form of a transfer authorization secret.
///
/// Produced and opened by the settlement custody vault; the plaintext never
/// touches the order record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedSecret {
    /// Random 96-bit AEAD nonce.
    pub nonce: [u8; 12],
    /// Ciphertext plus the 16-byte authentication tag.
    pub ciphertext: Vec<u8>,
}
