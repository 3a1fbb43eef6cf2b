//! # domainliq-settlement
//!
//! **Settlement Plane**: escrowed order lifecycle from payment capture to
//! fund release, with sealed custody of transfer authorization secrets.
//!
//! ## Architecture
//!
//! 1. **Store** ([`store`]): order records, the conditional-update state
//!    machine, and the append-only audit log.
//! 2. **Custody** ([`custody`]): AEAD vault sealing authorization secrets
//!    at rest, bound to their order.
//! 3. **Engine** ([`engine`]): transitions plus collaborator
//!    notifications, delivered only after the transition commits.
//! 4. **Notifier** ([`notifier`]): best-effort delivery seam.
//! 5. **Sweeper** ([`sweeper`]): periodic automatic release once the
//!    buyer protection window elapses.
//!
//! ## Release Flow
//!
//! ```text
//!                      ┌───────────────┐
//!   buyer confirm ────▶│               │──▶ winner: payout + notify
//!                      │  conditional  │
//!   sweeper tick  ────▶│    update     │──▶ loser: observes COMPLETED,
//!                      └───────────────┘    emits nothing
//! ```
//!
//! Exactly one trigger wins; funds release exactly once.

pub mod custody;
pub mod engine;
pub mod notifier;
pub mod store;
pub mod sweeper;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use custody::{SecretVault, VaultKey};
pub use engine::{ConfirmReceipt, SettlementEngine};
pub use notifier::{NoopNotifier, Notifier, NotifyKind};
pub use store::{
    AutoReleaseOutcome, CompletedOrder, CompletionOutcome, EventKind, RevealView,
    SettlementEvent, SettlementStore,
};
pub use sweeper::{ReleaseSweeper, SweepSummary};
