//! Verdicts returned by the verification engine.
//!
//! A failed check is data, not an error: it carries what the seller must
//! fix, and it is never written to the registry. Engine methods return
//! `Err` only for problems with the request itself (unknown domain id).

use chrono::{DateTime, Utc};
use domainliq_types::{ConnectionMethod, OwnershipMethod};
use serde::{Deserialize, Serialize};

/// Outcome of one ownership verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnershipVerdict {
    /// Proof found; the registry advanced (or refreshed) the domain state.
    Verified {
        method: OwnershipMethod,
        verified_at: DateTime<Utc>,
    },
    /// Both checks completed and found no proof. Actionable: carries
    /// exactly what the seller must publish.
    RecordNotFound {
        expected_txt: String,
        sentinel_ns: String,
    },
    /// A required lookup failed on every source. Transient; retry later.
    LookupFailed { detail: String },
}

impl OwnershipVerdict {
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

/// Outcome of one connection verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionVerdict {
    /// The domain serves platform content; the registry advanced.
    Connected {
        method: ConnectionMethod,
        connected_at: DateTime<Utc>,
    },
    /// Every attempted method failed, one entry per method in attempt
    /// order.
    NotConnected { failures: Vec<ConnectionFailure> },
}

impl ConnectionVerdict {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Why one connection method failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionFailure {
    pub method: ConnectionMethod,
    pub reason: ConnectionFailureReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionFailureReason {
    /// The domain answered, but not with what the platform expects.
    Mismatch { expected: String, found: String },
    /// Transport-class trouble; retry later.
    Transient { detail: String },
}
