//! # domainliq-verify
//!
//! **Verification Plane**: proves that a seller controls a domain and that
//! the domain is wired to serve the marketplace listing.
//!
//! ## Architecture
//!
//! The verification plane consists of:
//! 1. **`RecordSource`** (port): one upstream answering DNS queries —
//!    [`DohSource`] for the DoH JSON providers, [`StubSource`] for the
//!    local system resolver
//! 2. **`ResolverClient`**: parallel DoH fan-out, union dedup, and one
//!    stub fallback; fails only when every source failed
//! 3. **`rules`**: pure match-any predicates over fetched record sets
//! 4. **`DomainRegistry`**: registered domains and their monotonic
//!    verification state
//! 5. **`VerificationEngine`**: runs the checks, writes proofs to the
//!    registry, returns verdicts
//!
//! ## Check Flow
//!
//! ```text
//! verify_ownership ──▶ TXT lookup ──match──▶ OWNERSHIP_VERIFIED (TXT)
//!                          │ miss
//!                          ▼
//!                      NS lookup ───match──▶ OWNERSHIP_VERIFIED (NS)
//!                          │ miss
//!                          ▼
//!            both lookups complete? ──yes──▶ RecordNotFound (actionable)
//!                          └──────────no───▶ LookupFailed  (transient)
//! ```

pub mod doh;
pub mod engine;
pub mod registry;
pub mod resolver;
pub mod rules;
pub mod source;
pub mod stub;
pub mod verdict;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use doh::DohSource;
pub use engine::VerificationEngine;
pub use registry::DomainRegistry;
pub use resolver::ResolverClient;
pub use source::RecordSource;
pub use stub::StubSource;
pub use verdict::{
    ConnectionFailure, ConnectionFailureReason, ConnectionVerdict, OwnershipVerdict,
};
