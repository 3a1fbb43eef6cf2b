//! # domainliq-types
//!
//! Shared types, errors, and configuration for the **DomainLiq** marketplace
//! core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`DomainId`], [`OrderId`], [`SellerId`]
//! - **Domain model**: [`VerifiableDomain`], [`VerificationState`], [`OwnershipMethod`], [`ConnectionMethod`]
//! - **DNS primitives**: [`RecordType`], [`RecordSet`]
//! - **Order model**: [`Order`], [`OrderStatus`], [`ReleaseKind`], [`DisputeParty`]
//! - **Fee model**: [`FeeSchedule`], [`FeeBand`], [`ProcessorFee`]
//! - **Secret material**: [`OwnerToken`], [`RevealToken`], [`SealedSecret`]
//! - **Configuration**: [`ResolverConfig`], [`VerifierConfig`], [`SettlementConfig`]
//! - **Errors**: [`DomainliqError`] with `DL_ERR_` prefix codes
//! - **Constants**: proof prefixes, endpoints, windows, and defaults

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod fee;
pub mod ids;
pub mod order;
pub mod record;
pub mod secret;

// Re-export all primary types at crate root for ergonomic imports:
//   use domainliq_types::{Order, OrderStatus, VerifiableDomain, ...};

pub use config::*;
pub use domain::*;
pub use error::*;
pub use fee::*;
pub use ids::*;
pub use order::*;
pub use record::*;
pub use secret::*;

// Constants are accessed via `domainliq_types::constants::FOO`
// (not re-exported to avoid name collisions).
