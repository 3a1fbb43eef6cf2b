//! Outbound notifications to settlement collaborators.
//!
//! The engine calls the notifier after a transition has committed. Delivery
//! is best-effort: a failed send is logged and the transition stands, so a
//! flaky mail provider can never wedge the state machine or double-release
//! funds on retry.

use async_trait::async_trait;
use domainliq_types::{OrderId, Result};
use serde_json::Value;

/// What a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    /// Payment confirmed; the seller should start the transfer.
    SaleMade,
    /// Transfer recorded; the buyer's reveal link is ready.
    AuthCodeReady,
    /// Funds released; payout details for the seller.
    PayoutSent,
    /// Protection window elapsed; funds released automatically.
    AutoReleased,
}

impl std::fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SaleMade => write!(f, "SALE_MADE"),
            Self::AuthCodeReady => write!(f, "AUTH_CODE_READY"),
            Self::PayoutSent => write!(f, "PAYOUT_SENT"),
            Self::AutoReleased => write!(f, "AUTO_RELEASED"),
        }
    }
}

/// Delivery seam for settlement notifications.
///
/// Implementations deliver `payload` however the deployment wants (email,
/// webhook, queue). Implementations must not retry into the settlement
/// store; the payload carries everything the receiver needs.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    /// [`domainliq_types::DomainliqError::NotifyFailed`] on delivery
    /// failure. The caller logs and moves on.
    async fn notify(&self, kind: NotifyKind, order_id: OrderId, payload: Value) -> Result<()>;
}

/// Notifier that drops everything on the floor. Default for deployments
/// that poll order state instead of receiving pushes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, kind: NotifyKind, order_id: OrderId, _payload: Value) -> Result<()> {
        tracing::debug!(order = %order_id, kind = %kind, "Notification dropped (noop)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", NotifyKind::SaleMade), "SALE_MADE");
        assert_eq!(format!("{}", NotifyKind::AuthCodeReady), "AUTH_CODE_READY");
        assert_eq!(format!("{}", NotifyKind::PayoutSent), "PAYOUT_SENT");
        assert_eq!(format!("{}", NotifyKind::AutoReleased), "AUTO_RELEASED");
    }

    #[tokio::test]
    async fn noop_accepts_everything() {
        let notifier = NoopNotifier;
        let outcome = notifier
            .notify(
                NotifyKind::SaleMade,
                OrderId::new(),
                serde_json::json!({ "domain": "example.com" }),
            )
            .await;
        assert!(outcome.is_ok());
    }
}
