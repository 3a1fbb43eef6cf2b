//! Error types for the DomainLiq marketplace core.
//!
//! All errors use the `DL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Domain / registry errors
//! - 2xx: DNS lookup errors
//! - 3xx: Order / settlement store errors
//! - 4xx: Reveal / custody errors
//! - 7xx: Notifier errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{DomainId, OrderId, OrderStatus, RecordType};

/// Central error enum for all DomainLiq core operations.
#[derive(Debug, Error)]
pub enum DomainliqError {
    // =================================================================
    // Domain / Registry Errors (1xx)
    // =================================================================
    /// The requested domain is not registered.
    #[error("DL_ERR_100: Domain not found: {0}")]
    DomainNotFound(DomainId),

    /// The supplied domain name failed normalization.
    #[error("DL_ERR_101: Invalid domain name {name:?}: {reason}")]
    InvalidDomainName { name: String, reason: String },

    // =================================================================
    // DNS Lookup Errors (2xx)
    // =================================================================
    /// Every source (both DoH providers and the stub resolver) failed.
    /// Transient: the caller should retry later.
    #[error("DL_ERR_200: {record_type} lookup failed for {domain}: all sources failed")]
    LookupFailed {
        domain: String,
        record_type: RecordType,
    },

    /// A single record source failed (transport, timeout, or bad payload).
    /// Swallowed by the resolver client unless every source fails.
    #[error("DL_ERR_201: Record source {source} failed: {reason}")]
    SourceFailed { r#source: String, reason: String },

    // =================================================================
    // Order / Settlement Store Errors (3xx)
    // =================================================================
    /// The requested order was not found in the store.
    #[error("DL_ERR_300: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// An order with this ID already exists.
    #[error("DL_ERR_301: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// The order failed validation (bad amount, missing fields, etc.).
    #[error("DL_ERR_302: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// A conditional update observed a predecessor state that does not
    /// permit the requested transition. Caller error, not a benign race.
    #[error("DL_ERR_303: Invalid order transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    // =================================================================
    // Reveal / Custody Errors (4xx)
    // =================================================================
    /// The reveal token matches no order. The token value itself is never
    /// echoed back.
    #[error("DL_ERR_400: Reveal token not recognized")]
    RevealTokenUnknown,

    /// Sealing an authorization secret failed.
    #[error("DL_ERR_401: Custody seal failed: {reason}")]
    CustodySealFailed { reason: String },

    /// Opening a sealed authorization secret failed (wrong key, wrong
    /// order, or corrupt ciphertext).
    #[error("DL_ERR_402: Custody open failed: {reason}")]
    CustodyOpenFailed { reason: String },

    // =================================================================
    // Notifier Errors (7xx)
    // =================================================================
    /// The notification collaborator rejected or failed a delivery.
    /// Transitions are never rolled back for this; the failure is logged.
    #[error("DL_ERR_700: Notification {kind} failed: {reason}")]
    NotifyFailed { kind: String, reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error (broken invariant).
    #[error("DL_ERR_900: Internal error: {0}")]
    Internal(String),
}

impl DomainliqError {
    /// `true` for transient failures the caller may retry verbatim.
    ///
    /// User-actionable errors (bad input, wrong state) and invariant
    /// breaches are not retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LookupFailed { .. } | Self::SourceFailed { .. } | Self::NotifyFailed { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DomainliqError>;
