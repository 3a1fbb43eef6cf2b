//! Marketplace orders and the settlement lifecycle.
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐ payment ┌──────┐ transfer ┌─────────────┐ confirm or ┌───────────┐
//!   │ PENDING ├────────▶│ PAID ├─────────▶│ TRANSFERRED ├───────────▶│ COMPLETED │
//!   └─────────┘         └──┬───┘          └──────┬──────┘  deadline  └───────────┘
//!                          │                     │
//!                          │      dispute        │
//!                          └─────────┬───────────┘
//!                                    ▼
//!                              ┌──────────┐
//!                              │ DISPUTED │
//!                              └──────────┘
//! ```
//!
//! Every transition is a conditional update in the settlement store; no
//! caller mutates an order's fields directly. `COMPLETED` and `DISPUTED`
//! are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, RevealToken, SealedSecret, SellerId};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created; awaiting payment capture by the payment collaborator.
    Pending,
    /// Payment confirmed; awaiting the seller's transfer.
    Paid,
    /// Seller handed the domain over; buyer protection window running.
    Transferred,
    /// Funds released. Terminal.
    Completed,
    /// A party raised a dispute. Terminal; no automated resolution.
    Disputed,
}

impl OrderStatus {
    /// Can an order move from this status to `target`?
    ///
    /// This table is the single authority consulted by every conditional
    /// update in the settlement store.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Paid)
                | (Self::Paid, Self::Transferred | Self::Disputed)
                | (Self::Transferred, Self::Completed | Self::Disputed)
        )
    }

    /// Terminal statuses accept no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Disputed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
            Self::Transferred => write!(f, "TRANSFERRED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Disputed => write!(f, "DISPUTED"),
        }
    }
}

/// How funds were released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseKind {
    /// Buyer confirmed receipt.
    Manual,
    /// Protection window elapsed; released by the sweeper.
    Automatic,
}

impl std::fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "MANUAL"),
            Self::Automatic => write!(f, "AUTOMATIC"),
        }
    }
}

/// Which side opened a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeParty {
    Buyer,
    Seller,
}

impl std::fmt::Display for DisputeParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "BUYER"),
            Self::Seller => write!(f, "SELLER"),
        }
    }
}

/// A domain sale order.
///
/// `amount` and `platform_fee` are frozen at creation. The record is
/// append-only from the product's perspective — terminal orders are
/// retained, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Normalized name of the domain being sold.
    pub domain_name: String,
    pub buyer_email: String,
    pub seller_id: SellerId,
    /// Sale amount in minor currency units.
    pub amount: i64,
    /// Platform fee in minor units, frozen from the schedule at creation.
    pub platform_fee: i64,
    pub status: OrderStatus,
    /// Transfer authorization secret, sealed by the custody vault.
    pub sealed_secret: Option<SealedSecret>,
    /// Single-use token granting access to the reveal view.
    pub reveal_token: Option<RevealToken>,
    /// End of the buyer protection window; set on entering TRANSFERRED.
    pub protection_deadline: Option<DateTime<Utc>>,
    /// Set on entering COMPLETED.
    pub release_kind: Option<ReleaseKind>,
    /// Set on entering DISPUTED.
    pub disputed_by: Option<DisputeParty>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub transferred_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// New order in PENDING with a frozen platform fee.
    #[must_use]
    pub fn new(
        id: OrderId,
        domain_name: String,
        buyer_email: String,
        seller_id: SellerId,
        amount: i64,
        platform_fee: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            domain_name,
            buyer_email,
            seller_id,
            amount,
            platform_fee,
            status: OrderStatus::Pending,
            sealed_secret: None,
            reveal_token: None,
            protection_deadline: None,
            release_kind: None,
            disputed_by: None,
            created_at: now,
            paid_at: None,
            transferred_at: None,
            completed_at: None,
            disputed_at: None,
            updated_at: now,
        }
    }

    /// `true` when the protection window has elapsed on a TRANSFERRED order.
    #[must_use]
    pub fn is_due_for_release(&self, now: DateTime<Utc>) -> bool {
        self.status == OrderStatus::Transferred
            && self
                .protection_deadline
                .is_some_and(|deadline| deadline <= now)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// Pending order with a default-schedule fee, for unit tests.
    pub fn dummy(amount: i64) -> Self {
        let fee = crate::FeeSchedule::default().platform_fee(amount);
        Self::new(
            OrderId::new(),
            "example.com".to_string(),
            "buyer@example.com".to_string(),
            SellerId::new(),
            amount,
            fee,
        )
    }
}
