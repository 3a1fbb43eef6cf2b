//! Settlement store: order records, conditional-update transitions, and
//! the append-only audit event log.
//!
//! ## Transition Discipline
//!
//! Every mutating method locks the store, checks that the order sits in
//! the required predecessor status, writes the new status with its side
//! fields, and appends one audit event — all in one critical section, with
//! no I/O inside it. That conditional update is the only race-safety
//! mechanism: when two triggers collide (buyer confirm vs. sweeper), one
//! lands, and the other observes the already-advanced state instead of
//! double-releasing funds.
//!
//! ```text
//! PENDING ──mark_paid──▶ PAID ──mark_transferred──▶ TRANSFERRED
//!                          │                             │
//!                          │                  confirm / auto ──▶ COMPLETED
//!                          └────────mark_disputed────────┘          (terminal)
//!                                      ▼
//!                                  DISPUTED (terminal)
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domainliq_types::{
    DisputeParty, DomainliqError, FeeSchedule, Order, OrderId, OrderStatus, ProcessorFee,
    ReleaseKind, Result, RevealToken, SellerId, SettlementConfig, normalize_domain_name,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::custody::{SecretVault, VaultKey};

/// One audit record, appended under the same lock as its transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementEvent {
    /// Monotonic sequence number across all orders.
    pub seq: u64,
    pub order_id: OrderId,
    pub kind: EventKind,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Created,
    Paid,
    Transferred,
    Completed(ReleaseKind),
    Disputed(DisputeParty),
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Paid => write!(f, "PAID"),
            Self::Transferred => write!(f, "TRANSFERRED"),
            Self::Completed(kind) => write!(f, "COMPLETED_{kind}"),
            Self::Disputed(party) => write!(f, "DISPUTED_BY_{party}"),
        }
    }
}

/// Snapshot of a freshly completed order with its computed payout.
#[derive(Debug, Clone)]
pub struct CompletedOrder {
    pub order: Order,
    /// Seller payout in minor units: amount − platform fee − processor fee.
    pub payout: i64,
    pub release_kind: ReleaseKind,
}

/// Result of a manual completion attempt.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    /// This caller won the conditional update and must emit the payout.
    Completed(CompletedOrder),
    /// Another trigger already completed the order. Benign; emit nothing.
    AlreadyCompleted { release_kind: ReleaseKind },
}

/// Result of an automatic release attempt.
#[derive(Debug, Clone)]
pub enum AutoReleaseOutcome {
    Completed(CompletedOrder),
    AlreadyCompleted { release_kind: ReleaseKind },
    /// The protection window has not elapsed; nothing was changed.
    NotYetEligible { deadline: DateTime<Utc> },
}

/// Buyer-facing reveal snapshot. Reading it changes nothing, so repeated
/// peeks are safe.
#[derive(Debug, Clone, Serialize)]
pub struct RevealView {
    pub domain_name: String,
    pub status: OrderStatus,
    pub amount: i64,
    /// Present only while the order is TRANSFERRED.
    pub auth_secret: Option<String>,
}

/// In-memory settlement store. All methods take `&self`; one mutex keeps
/// every read-modify-write sequence atomic.
pub struct SettlementStore {
    protection_window: std::time::Duration,
    processor_fee: ProcessorFee,
    vault: SecretVault,
    inner: Mutex<Inner>,
}

struct Inner {
    orders: HashMap<OrderId, Order>,
    by_reveal: HashMap<RevealToken, OrderId>,
    events: Vec<SettlementEvent>,
    next_seq: u64,
    /// Swappable at runtime; existing orders keep their frozen fee.
    fee_schedule: FeeSchedule,
}

impl Inner {
    fn push_event(&mut self, order_id: OrderId, kind: EventKind, at: DateTime<Utc>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(SettlementEvent {
            seq,
            order_id,
            kind,
            at,
        });
    }
}

impl SettlementStore {
    #[must_use]
    pub fn new(config: SettlementConfig, key: &VaultKey) -> Self {
        Self {
            protection_window: config.protection_window,
            processor_fee: config.processor_fee,
            vault: SecretVault::new(key),
            inner: Mutex::new(Inner {
                orders: HashMap::new(),
                by_reveal: HashMap::new(),
                events: Vec::new(),
                next_seq: 0,
                fee_schedule: config.fee_schedule,
            }),
        }
    }

    /// Create a PENDING order with the platform fee frozen from the
    /// current schedule. The caller supplies the id, so a payment
    /// provider's retried webhook dedups naturally via `DuplicateOrder`.
    ///
    /// # Errors
    /// [`DomainliqError::InvalidOrder`] for non-positive amounts,
    /// [`DomainliqError::InvalidDomainName`] for unusable names,
    /// [`DomainliqError::DuplicateOrder`] for an already-known id.
    pub fn create(
        &self,
        id: OrderId,
        domain_name: &str,
        buyer_email: &str,
        seller_id: SellerId,
        amount: i64,
    ) -> Result<Order> {
        if amount <= 0 {
            return Err(DomainliqError::InvalidOrder {
                reason: format!("non-positive amount {amount}"),
            });
        }
        let domain_name = normalize_domain_name(domain_name)?;

        let mut inner = self.inner.lock();
        if inner.orders.contains_key(&id) {
            return Err(DomainliqError::DuplicateOrder(id));
        }
        let platform_fee = inner.fee_schedule.platform_fee(amount);
        let order = Order::new(
            id,
            domain_name,
            buyer_email.to_string(),
            seller_id,
            amount,
            platform_fee,
        );
        inner.push_event(id, EventKind::Created, order.created_at);
        inner.orders.insert(id, order.clone());
        tracing::info!(order = %id, amount, platform_fee, "Order created");
        Ok(order)
    }

    /// PENDING → PAID. A confirmed amount differing from the order amount
    /// is logged but does not block the transition; reconciliation is a
    /// bookkeeping concern, not a custody one.
    ///
    /// # Errors
    /// [`DomainliqError::OrderNotFound`] or
    /// [`DomainliqError::InvalidTransition`].
    pub fn mark_paid(&self, id: OrderId, confirmed_amount: i64) -> Result<Order> {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let snapshot = {
            let order = inner
                .orders
                .get_mut(&id)
                .ok_or(DomainliqError::OrderNotFound(id))?;
            if !order.status.can_transition_to(OrderStatus::Paid) {
                return Err(DomainliqError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Paid,
                });
            }
            if confirmed_amount != order.amount {
                tracing::warn!(
                    order = %id,
                    expected = order.amount,
                    confirmed = confirmed_amount,
                    "Confirmed amount differs from order amount"
                );
            }
            order.status = OrderStatus::Paid;
            order.paid_at = Some(now);
            order.updated_at = now;
            order.clone()
        };
        inner.push_event(id, EventKind::Paid, now);
        tracing::info!(order = %id, "Order paid");
        Ok(snapshot)
    }

    /// PAID → TRANSFERRED. Seals the auth secret (when supplied), mints
    /// the reveal token, and starts the protection window.
    ///
    /// # Errors
    /// [`DomainliqError::OrderNotFound`],
    /// [`DomainliqError::InvalidTransition`], or
    /// [`DomainliqError::CustodySealFailed`].
    pub fn mark_transferred(
        &self,
        id: OrderId,
        auth_secret: Option<&str>,
    ) -> Result<(Order, RevealToken)> {
        let now = Utc::now();
        let token = RevealToken::generate();
        // Seal before taking the lock; the critical section stays pure.
        let sealed = match auth_secret {
            Some(secret) => Some(self.vault.seal(id, secret)?),
            None => None,
        };

        let mut inner = self.inner.lock();
        let snapshot = {
            let order = inner
                .orders
                .get_mut(&id)
                .ok_or(DomainliqError::OrderNotFound(id))?;
            if !order.status.can_transition_to(OrderStatus::Transferred) {
                return Err(DomainliqError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Transferred,
                });
            }
            order.status = OrderStatus::Transferred;
            order.sealed_secret = sealed;
            order.reveal_token = Some(token.clone());
            order.protection_deadline = Some(now + self.protection_window);
            order.transferred_at = Some(now);
            order.updated_at = now;
            order.clone()
        };
        inner.by_reveal.insert(token.clone(), id);
        inner.push_event(id, EventKind::Transferred, now);
        tracing::info!(
            order = %id,
            token = %token,
            deadline = ?snapshot.protection_deadline,
            "Order transferred; protection window started"
        );
        Ok((snapshot, token))
    }

    /// Resolve a reveal token to its order id.
    ///
    /// # Errors
    /// [`DomainliqError::RevealTokenUnknown`]. The message never echoes
    /// the presented token.
    pub fn order_id_for_token(&self, token: &RevealToken) -> Result<OrderId> {
        self.inner
            .lock()
            .by_reveal
            .get(token)
            .copied()
            .ok_or(DomainliqError::RevealTokenUnknown)
    }

    /// Read-only reveal view. The plaintext secret is included only while
    /// the order is TRANSFERRED; before hand-over and after completion the
    /// view resolves without it.
    ///
    /// # Errors
    /// [`DomainliqError::RevealTokenUnknown`] or
    /// [`DomainliqError::CustodyOpenFailed`].
    pub fn peek_reveal(&self, token: &RevealToken) -> Result<RevealView> {
        let inner = self.inner.lock();
        let id = inner
            .by_reveal
            .get(token)
            .copied()
            .ok_or(DomainliqError::RevealTokenUnknown)?;
        let order = inner.orders.get(&id).ok_or_else(|| {
            DomainliqError::Internal(format!("reveal index points at missing order {id}"))
        })?;

        let auth_secret = if order.status == OrderStatus::Transferred {
            match &order.sealed_secret {
                Some(sealed) => Some(self.vault.open(id, sealed)?),
                None => None,
            }
        } else {
            None
        };

        Ok(RevealView {
            domain_name: order.domain_name.clone(),
            status: order.status,
            amount: order.amount,
            auth_secret,
        })
    }

    /// TRANSFERRED → COMPLETED via buyer confirmation.
    ///
    /// # Errors
    /// [`DomainliqError::OrderNotFound`], or
    /// [`DomainliqError::InvalidTransition`] when the order is neither
    /// TRANSFERRED nor COMPLETED.
    pub fn confirm_complete(&self, id: OrderId) -> Result<CompletionOutcome> {
        let mut inner = self.inner.lock();
        self.complete_locked(&mut inner, id, ReleaseKind::Manual)
    }

    /// TRANSFERRED → COMPLETED once the protection deadline has passed.
    ///
    /// # Errors
    /// Same as [`confirm_complete`](Self::confirm_complete).
    pub fn auto_complete(&self, id: OrderId, now: DateTime<Utc>) -> Result<AutoReleaseOutcome> {
        let mut inner = self.inner.lock();
        {
            let order = inner
                .orders
                .get(&id)
                .ok_or(DomainliqError::OrderNotFound(id))?;
            if order.status == OrderStatus::Transferred {
                if let Some(deadline) = order.protection_deadline {
                    if deadline > now {
                        return Ok(AutoReleaseOutcome::NotYetEligible { deadline });
                    }
                }
            }
        }
        match self.complete_locked(&mut inner, id, ReleaseKind::Automatic)? {
            CompletionOutcome::Completed(done) => Ok(AutoReleaseOutcome::Completed(done)),
            CompletionOutcome::AlreadyCompleted { release_kind } => {
                Ok(AutoReleaseOutcome::AlreadyCompleted { release_kind })
            }
        }
    }

    fn complete_locked(
        &self,
        inner: &mut Inner,
        id: OrderId,
        kind: ReleaseKind,
    ) -> Result<CompletionOutcome> {
        let now = Utc::now();
        let snapshot = {
            let order = inner
                .orders
                .get_mut(&id)
                .ok_or(DomainliqError::OrderNotFound(id))?;
            match order.status {
                OrderStatus::Completed => {
                    // The other trigger won the race.
                    return Ok(CompletionOutcome::AlreadyCompleted {
                        release_kind: order.release_kind.unwrap_or(ReleaseKind::Manual),
                    });
                }
                OrderStatus::Transferred => {}
                from => {
                    return Err(DomainliqError::InvalidTransition {
                        from,
                        to: OrderStatus::Completed,
                    });
                }
            }
            order.status = OrderStatus::Completed;
            order.release_kind = Some(kind);
            order.completed_at = Some(now);
            order.updated_at = now;
            order.clone()
        };
        let payout = self.payout_for(&snapshot);
        inner.push_event(id, EventKind::Completed(kind), now);
        tracing::info!(order = %id, release = %kind, payout, "Funds released");
        Ok(CompletionOutcome::Completed(CompletedOrder {
            order: snapshot,
            payout,
            release_kind: kind,
        }))
    }

    /// PAID | TRANSFERRED → DISPUTED. Terminal; pauses release for manual
    /// resolution outside the state machine.
    ///
    /// # Errors
    /// [`DomainliqError::OrderNotFound`] or
    /// [`DomainliqError::InvalidTransition`].
    pub fn mark_disputed(&self, id: OrderId, party: DisputeParty) -> Result<Order> {
        let now = Utc::now();
        let mut inner = self.inner.lock();
        let snapshot = {
            let order = inner
                .orders
                .get_mut(&id)
                .ok_or(DomainliqError::OrderNotFound(id))?;
            if !order.status.can_transition_to(OrderStatus::Disputed) {
                return Err(DomainliqError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Disputed,
                });
            }
            order.status = OrderStatus::Disputed;
            order.disputed_by = Some(party);
            order.disputed_at = Some(now);
            order.updated_at = now;
            order.clone()
        };
        inner.push_event(id, EventKind::Disputed(party), now);
        tracing::warn!(order = %id, party = %party, "Order disputed; release paused");
        Ok(snapshot)
    }

    /// Snapshot of one order.
    ///
    /// # Errors
    /// [`DomainliqError::OrderNotFound`].
    pub fn get(&self, id: OrderId) -> Result<Order> {
        self.inner
            .lock()
            .orders
            .get(&id)
            .cloned()
            .ok_or(DomainliqError::OrderNotFound(id))
    }

    /// Orders whose protection window has elapsed, still awaiting release.
    #[must_use]
    pub fn due_for_release(&self, now: DateTime<Utc>) -> Vec<OrderId> {
        self.inner
            .lock()
            .orders
            .values()
            .filter(|order| order.is_due_for_release(now))
            .map(|order| order.id)
            .collect()
    }

    /// Replace the fee schedule. Existing orders keep their frozen fee.
    pub fn set_fee_schedule(&self, schedule: FeeSchedule) {
        self.inner.lock().fee_schedule = schedule;
        tracing::info!("Fee schedule updated");
    }

    /// Snapshot of the audit log.
    #[must_use]
    pub fn events(&self) -> Vec<SettlementEvent> {
        self.inner.lock().events.clone()
    }

    fn payout_for(&self, order: &Order) -> i64 {
        let processor = self.processor_fee.fee_for(order.amount);
        let payout = order.amount - order.platform_fee - processor;
        if payout < 0 {
            tracing::warn!(order = %order.id, amount = order.amount, "Payout clamped to zero");
            return 0;
        }
        payout
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl SettlementStore {
    /// Rewrite an order's protection deadline so window-expiry paths can
    /// be tested without waiting seven days.
    pub fn force_deadline(&self, id: OrderId, deadline: DateTime<Utc>) -> Result<()> {
        let mut inner = self.inner.lock();
        let order = inner
            .orders
            .get_mut(&id)
            .ok_or(DomainliqError::OrderNotFound(id))?;
        order.protection_deadline = Some(deadline);
        Ok(())
    }
}
