//! Test doubles for the notification seam.
//!
//! Available to this crate's unit tests and, behind the `test-helpers`
//! feature, to downstream crates.

use async_trait::async_trait;
use domainliq_types::{DomainliqError, OrderId, Result};
use parking_lot::Mutex;
use serde_json::Value;

use crate::notifier::{Notifier, NotifyKind};

/// Notifier that records every delivery, optionally failing each one.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(NotifyKind, OrderId, Value)>>,
    fail: bool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records deliveries and then reports each as failed.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Everything recorded so far, in delivery order.
    #[must_use]
    pub fn sent(&self) -> Vec<(NotifyKind, OrderId, Value)> {
        self.sent.lock().clone()
    }

    /// Kinds recorded so far, in delivery order.
    #[must_use]
    pub fn kinds(&self) -> Vec<NotifyKind> {
        self.sent.lock().iter().map(|(kind, _, _)| *kind).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, kind: NotifyKind, order_id: OrderId, payload: Value) -> Result<()> {
        self.sent.lock().push((kind, order_id, payload));
        if self.fail {
            return Err(DomainliqError::NotifyFailed {
                kind: kind.to_string(),
                reason: "recording notifier configured to fail".to_string(),
            });
        }
        Ok(())
    }
}
