//! Verifiable custom domains and the verification state machine.
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────────┐  TXT / NS proof  ┌────────────────────┐
//!   │ UNVERIFIED ├─────────────────▶│ OWNERSHIP_VERIFIED │
//!   └─────┬──────┘                  └─────────┬──────────┘
//!         │ redirect / A record               │
//!         ▼                                   ▼
//!   ┌─────────────────────┐◀─────────────────┘
//!   │ CONNECTION_VERIFIED │
//!   └─────────────────────┘
//! ```
//!
//! Transitions are **monotonic**: a failed re-check is reported to the
//! caller but never applied, so transient DNS trouble cannot revoke an
//! earlier verdict. Same-rank re-verification refreshes the method and
//! timestamp only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainId, DomainliqError, OwnerToken, Result};

/// How ownership was proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnershipMethod {
    /// TXT record containing the owner-token proof. Primary method.
    Txt,
    /// Sentinel nameserver present among the NS delegation. Secondary.
    Ns,
}

impl std::fmt::Display for OwnershipMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Txt => write!(f, "TXT"),
            Self::Ns => write!(f, "NS"),
        }
    }
}

/// How the domain was wired to serve platform content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionMethod {
    /// Root URL redirects to the canonical listing page.
    Redirect,
    /// A record points at the platform ingress address.
    ARecord,
}

impl std::fmt::Display for ConnectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redirect => write!(f, "REDIRECT"),
            Self::ARecord => write!(f, "A_RECORD"),
        }
    }
}

/// Verification lifecycle state of a domain.
///
/// Totally ordered: `Unverified < OwnershipVerified < ConnectionVerified`.
/// State never moves down this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationState {
    /// No proof observed yet.
    Unverified,
    /// The claimant demonstrated DNS control.
    OwnershipVerified {
        method: OwnershipMethod,
        verified_at: DateTime<Utc>,
    },
    /// The domain is wired to serve the platform's content.
    ConnectionVerified {
        method: ConnectionMethod,
        connected_at: DateTime<Utc>,
    },
}

impl VerificationState {
    /// Position in the monotonic order.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Unverified => 0,
            Self::OwnershipVerified { .. } => 1,
            Self::ConnectionVerified { .. } => 2,
        }
    }

    /// Can this state move to `target`? Upgrades and same-rank refreshes
    /// only — never a downgrade.
    #[must_use]
    pub fn can_transition_to(&self, target: &Self) -> bool {
        target.rank() >= self.rank()
    }
}

impl std::fmt::Display for VerificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unverified => write!(f, "UNVERIFIED"),
            Self::OwnershipVerified { .. } => write!(f, "OWNERSHIP_VERIFIED"),
            Self::ConnectionVerified { .. } => write!(f, "CONNECTION_VERIFIED"),
        }
    }
}

/// A custom domain registered for verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiableDomain {
    pub id: DomainId,
    /// Normalized name (lowercase, no trailing dot).
    pub name: String,
    /// Per-owner proof secret, minted when the domain is first registered.
    pub owner_token: OwnerToken,
    pub state: VerificationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VerifiableDomain {
    /// New unverified domain with a freshly minted owner token. `name` must
    /// already be normalized.
    #[must_use]
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: DomainId::new(),
            name,
            owner_token: OwnerToken::generate(),
            state: VerificationState::Unverified,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a successful ownership proof. Returns `true` if the state was
    /// written; a `ConnectionVerified` domain is left untouched.
    pub fn apply_ownership(&mut self, method: OwnershipMethod, at: DateTime<Utc>) -> bool {
        let next = VerificationState::OwnershipVerified {
            method,
            verified_at: at,
        };
        if !self.state.can_transition_to(&next) {
            return false;
        }
        self.state = next;
        self.updated_at = at;
        true
    }

    /// Apply a successful connection proof. Always an upgrade or refresh.
    pub fn apply_connection(&mut self, method: ConnectionMethod, at: DateTime<Utc>) -> bool {
        let next = VerificationState::ConnectionVerified {
            method,
            connected_at: at,
        };
        if !self.state.can_transition_to(&next) {
            return false;
        }
        self.state = next;
        self.updated_at = at;
        true
    }

    /// `true` once any verification rank has been reached.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.state.rank() >= 1
    }
}

/// Normalize a user-supplied domain name: trim, lowercase, strip one
/// trailing dot. All comparison throughout the core happens on this form.
///
/// # Errors
/// Returns [`DomainliqError::InvalidDomainName`] for empty names or names
/// containing whitespace.
pub fn normalize_domain_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainliqError::InvalidDomainName {
            name: raw.to_string(),
            reason: "empty name".to_string(),
        });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(DomainliqError::InvalidDomainName {
            name: raw.to_string(),
            reason: "name contains whitespace".to_string(),
        });
    }
    let lowered = trimmed.to_ascii_lowercase();
    let name = lowered.strip_suffix('.').unwrap_or(&lowered);
    if name.is_empty() {
        return Err(DomainliqError::InvalidDomainName {
            name: raw.to_string(),
            reason: "empty name".to_string(),
        });
    }
    Ok(name.to_string())
}
