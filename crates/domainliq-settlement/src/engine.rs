//! Settlement engine: store transitions plus collaborator notifications.
//!
//! The engine is the surface the HTTP layer and the sweeper talk to. Each
//! operation runs in two phases:
//!
//! 1. Commit the transition through the store's conditional update.
//! 2. Emit the notifications the committed transition calls for.
//!
//! Phase 2 is strictly after phase 1 and never inside the store lock. A
//! failed delivery is logged and dropped; the transition stands. When two
//! release triggers race, the store picks the winner, and only the winner
//! reaches phase 2, so payout notifications go out exactly once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domainliq_types::{DisputeParty, Order, OrderId, ReleaseKind, Result, RevealToken, SellerId};
use serde_json::{Value, json};

use crate::notifier::{Notifier, NotifyKind};
use crate::store::{
    AutoReleaseOutcome, CompletedOrder, CompletionOutcome, RevealView, SettlementStore,
};

/// Outcome of a buyer confirmation, shaped for the caller's response.
#[derive(Debug, Clone)]
pub struct ConfirmReceipt {
    pub order_id: OrderId,
    /// How the funds were (or had already been) released.
    pub release_kind: ReleaseKind,
    /// Payout emitted by this call. `None` when another trigger had
    /// already released and nothing was paid out now.
    pub payout: Option<i64>,
}

/// Orchestrates settlement transitions and their notifications.
pub struct SettlementEngine {
    store: Arc<SettlementStore>,
    notifier: Arc<dyn Notifier>,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(store: Arc<SettlementStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Create a PENDING order. No notification; the checkout flow owns
    /// buyer-facing messaging at this stage.
    ///
    /// # Errors
    /// See [`SettlementStore::create`].
    pub fn create_order(
        &self,
        id: OrderId,
        domain_name: &str,
        buyer_email: &str,
        seller_id: SellerId,
        amount: i64,
    ) -> Result<Order> {
        self.store.create(id, domain_name, buyer_email, seller_id, amount)
    }

    /// Record a confirmed payment and tell the seller to start the
    /// transfer.
    ///
    /// # Errors
    /// See [`SettlementStore::mark_paid`].
    pub async fn payment_confirmed(&self, id: OrderId, confirmed_amount: i64) -> Result<Order> {
        let order = self.store.mark_paid(id, confirmed_amount)?;
        self.send(
            NotifyKind::SaleMade,
            id,
            json!({ "domain": order.domain_name, "amount": order.amount }),
        )
        .await;
        Ok(order)
    }

    /// Record the seller's transfer. When an authorization secret was
    /// handed over, the buyer is notified that their reveal link is live.
    ///
    /// # Errors
    /// See [`SettlementStore::mark_transferred`].
    pub async fn mark_transferred(
        &self,
        id: OrderId,
        auth_secret: Option<&str>,
    ) -> Result<(Order, RevealToken)> {
        let had_secret = auth_secret.is_some();
        let (order, token) = self.store.mark_transferred(id, auth_secret)?;
        if had_secret {
            self.send(
                NotifyKind::AuthCodeReady,
                id,
                json!({ "domain": order.domain_name, "reveal_token": token.expose() }),
            )
            .await;
        }
        Ok((order, token))
    }

    /// Buyer-facing reveal view for a token. Read-only.
    ///
    /// # Errors
    /// See [`SettlementStore::peek_reveal`].
    pub fn reveal(&self, token: &RevealToken) -> Result<RevealView> {
        self.store.peek_reveal(token)
    }

    /// Buyer confirmation through their reveal token. The winning trigger
    /// emits the payout notification; a losing one emits nothing.
    ///
    /// # Errors
    /// [`domainliq_types::DomainliqError::RevealTokenUnknown`], plus
    /// whatever [`SettlementStore::confirm_complete`] returns.
    pub async fn confirm_by_token(&self, token: &RevealToken) -> Result<ConfirmReceipt> {
        let id = self.store.order_id_for_token(token)?;
        match self.store.confirm_complete(id)? {
            CompletionOutcome::Completed(done) => {
                self.send_payout(&done).await;
                Ok(ConfirmReceipt {
                    order_id: id,
                    release_kind: done.release_kind,
                    payout: Some(done.payout),
                })
            }
            CompletionOutcome::AlreadyCompleted { release_kind } => Ok(ConfirmReceipt {
                order_id: id,
                release_kind,
                payout: None,
            }),
        }
    }

    /// Release funds for an order whose protection window has elapsed.
    /// Called by the sweeper; safe to race against a buyer confirmation.
    ///
    /// # Errors
    /// See [`SettlementStore::auto_complete`].
    pub async fn auto_release(
        &self,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<AutoReleaseOutcome> {
        let outcome = self.store.auto_complete(id, now)?;
        if let AutoReleaseOutcome::Completed(done) = &outcome {
            self.send_payout(done).await;
            self.send(
                NotifyKind::AutoReleased,
                id,
                json!({ "domain": done.order.domain_name, "payout": done.payout }),
            )
            .await;
        }
        Ok(outcome)
    }

    /// Open a dispute, pausing release until a human resolves it.
    ///
    /// # Errors
    /// See [`SettlementStore::mark_disputed`].
    pub fn open_dispute(&self, id: OrderId, party: DisputeParty) -> Result<Order> {
        self.store.mark_disputed(id, party)
    }

    /// Orders currently due for automatic release.
    #[must_use]
    pub fn due_for_release(&self, now: DateTime<Utc>) -> Vec<OrderId> {
        self.store.due_for_release(now)
    }

    async fn send_payout(&self, done: &CompletedOrder) {
        self.send(
            NotifyKind::PayoutSent,
            done.order.id,
            json!({
                "domain": done.order.domain_name,
                "payout": done.payout,
                "release": done.release_kind.to_string(),
            }),
        )
        .await;
    }

    async fn send(&self, kind: NotifyKind, order_id: OrderId, payload: Value) {
        if let Err(err) = self.notifier.notify(kind, order_id, payload).await {
            tracing::warn!(order = %order_id, kind = %kind, error = %err,
                "Notification failed; transition stands");
        }
    }
}

#[cfg(test)]
mod tests {
    use domainliq_types::{DomainliqError, OrderStatus, SettlementConfig};

    use super::*;
    use crate::custody::VaultKey;
    use crate::testing::RecordingNotifier;

    fn engine() -> (SettlementEngine, Arc<SettlementStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(SettlementStore::new(
            SettlementConfig::default(),
            &VaultKey::generate(),
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = SettlementEngine::new(Arc::clone(&store), Arc::clone(&notifier) as _);
        (engine, store, notifier)
    }

    async fn transferred(
        engine: &SettlementEngine,
        amount: i64,
        secret: Option<&str>,
    ) -> (OrderId, RevealToken) {
        let id = OrderId::new();
        engine
            .create_order(id, "example.com", "buyer@example.com", SellerId::new(), amount)
            .unwrap();
        engine.payment_confirmed(id, amount).await.unwrap();
        let (_, token) = engine.mark_transferred(id, secret).await.unwrap();
        (id, token)
    }

    #[tokio::test]
    async fn happy_path_emits_each_notification_once() {
        let (engine, _, notifier) = engine();
        let (_, token) = transferred(&engine, 1000, Some("EPP-123")).await;

        let receipt = engine.confirm_by_token(&token).await.unwrap();
        assert_eq!(receipt.payout, Some(911));
        assert_eq!(receipt.release_kind, ReleaseKind::Manual);

        assert_eq!(
            notifier.kinds(),
            vec![
                NotifyKind::SaleMade,
                NotifyKind::AuthCodeReady,
                NotifyKind::PayoutSent,
            ]
        );
    }

    #[tokio::test]
    async fn transfer_without_secret_skips_auth_code_notification() {
        let (engine, _, notifier) = engine();
        let (_, _token) = transferred(&engine, 1000, None).await;

        assert_eq!(notifier.kinds(), vec![NotifyKind::SaleMade]);
    }

    #[tokio::test]
    async fn failed_delivery_never_blocks_the_transition() {
        let store = Arc::new(SettlementStore::new(
            SettlementConfig::default(),
            &VaultKey::generate(),
        ));
        let notifier = Arc::new(RecordingNotifier::failing());
        let engine = SettlementEngine::new(Arc::clone(&store), Arc::clone(&notifier) as _);

        let id = OrderId::new();
        engine
            .create_order(id, "example.com", "b@x.com", SellerId::new(), 1000)
            .unwrap();
        let order = engine.payment_confirmed(id, 1000).await.unwrap();

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(store.get(id).unwrap().status, OrderStatus::Paid);
        assert_eq!(notifier.kinds(), vec![NotifyKind::SaleMade]);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let (engine, _, _) = engine();
        let err = engine
            .confirm_by_token(&RevealToken::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainliqError::RevealTokenUnknown));
    }

    #[tokio::test]
    async fn second_confirmation_pays_out_nothing() {
        let (engine, _, notifier) = engine();
        let (_, token) = transferred(&engine, 1000, None).await;

        let first = engine.confirm_by_token(&token).await.unwrap();
        let second = engine.confirm_by_token(&token).await.unwrap();

        assert_eq!(first.payout, Some(911));
        assert_eq!(second.payout, None);
        assert_eq!(second.release_kind, ReleaseKind::Manual);

        let payouts = notifier
            .kinds()
            .into_iter()
            .filter(|kind| *kind == NotifyKind::PayoutSent)
            .count();
        assert_eq!(payouts, 1, "payout notification goes out exactly once");
    }

    #[tokio::test]
    async fn auto_release_notifies_seller_and_buyer() {
        let (engine, store, notifier) = engine();
        let (id, _token) = transferred(&engine, 1000, None).await;
        store
            .force_deadline(id, Utc::now() - chrono::Duration::seconds(1))
            .unwrap();

        let outcome = engine.auto_release(id, Utc::now()).await.unwrap();
        assert!(matches!(outcome, AutoReleaseOutcome::Completed(_)));
        assert_eq!(
            notifier.kinds(),
            vec![
                NotifyKind::SaleMade,
                NotifyKind::PayoutSent,
                NotifyKind::AutoReleased,
            ]
        );
    }

    #[tokio::test]
    async fn auto_release_before_deadline_changes_nothing() {
        let (engine, store, notifier) = engine();
        let (id, _token) = transferred(&engine, 1000, None).await;

        let outcome = engine.auto_release(id, Utc::now()).await.unwrap();
        assert!(matches!(outcome, AutoReleaseOutcome::NotYetEligible { .. }));
        assert_eq!(store.get(id).unwrap().status, OrderStatus::Transferred);
        assert_eq!(notifier.kinds(), vec![NotifyKind::SaleMade]);
    }

    #[tokio::test]
    async fn dispute_blocks_auto_release() {
        let (engine, store, _) = engine();
        let (id, _token) = transferred(&engine, 1000, None).await;
        engine.open_dispute(id, DisputeParty::Buyer).unwrap();
        store
            .force_deadline(id, Utc::now() - chrono::Duration::seconds(1))
            .unwrap();

        let err = engine.auto_release(id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DomainliqError::InvalidTransition { .. }));
        assert!(engine.due_for_release(Utc::now()).is_empty());
    }
}
