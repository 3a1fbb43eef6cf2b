//! Registered domains and their verification state.
//!
//! One record per normalized name. Registration is get-or-create, so
//! repeated submissions of case or trailing-dot variants resolve to the
//! same record and the same owner token. All writes go through the
//! monotonic transition methods on [`VerifiableDomain`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domainliq_types::{
    ConnectionMethod, DomainId, DomainliqError, OwnershipMethod, Result, VerifiableDomain,
    normalize_domain_name,
};
use parking_lot::Mutex;

/// In-memory domain registry. All methods take `&self`; interior
/// mutability via one mutex keeps read-modify-write sequences atomic.
#[derive(Default)]
pub struct DomainRegistry {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    domains: HashMap<DomainId, VerifiableDomain>,
    by_name: HashMap<String, DomainId>,
}

impl DomainRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create the record for `raw_name`. A fresh registration mints
    /// the owner token; an existing one returns it unchanged.
    ///
    /// # Errors
    /// [`DomainliqError::InvalidDomainName`] if the name fails
    /// normalization.
    pub fn register(&self, raw_name: &str) -> Result<VerifiableDomain> {
        let name = normalize_domain_name(raw_name)?;
        let mut inner = self.inner.lock();
        if let Some(&id) = inner.by_name.get(&name) {
            if let Some(domain) = inner.domains.get(&id) {
                return Ok(domain.clone());
            }
        }
        let domain = VerifiableDomain::new(name.clone());
        inner.by_name.insert(name, domain.id);
        inner.domains.insert(domain.id, domain.clone());
        tracing::info!(domain = %domain.name, id = %domain.id, "Domain registered");
        Ok(domain)
    }

    /// Snapshot of one domain record.
    ///
    /// # Errors
    /// [`DomainliqError::DomainNotFound`] for unknown ids.
    pub fn get(&self, id: DomainId) -> Result<VerifiableDomain> {
        self.inner
            .lock()
            .domains
            .get(&id)
            .cloned()
            .ok_or(DomainliqError::DomainNotFound(id))
    }

    /// Write an ownership proof. Monotonic: returns `false` (and leaves the
    /// record alone) when the domain already holds a higher rank.
    ///
    /// # Errors
    /// [`DomainliqError::DomainNotFound`] for unknown ids.
    pub fn apply_ownership(
        &self,
        id: DomainId,
        method: OwnershipMethod,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        let domain = inner
            .domains
            .get_mut(&id)
            .ok_or(DomainliqError::DomainNotFound(id))?;
        Ok(domain.apply_ownership(method, at))
    }

    /// Write a connection proof. Always an upgrade or same-rank refresh.
    ///
    /// # Errors
    /// [`DomainliqError::DomainNotFound`] for unknown ids.
    pub fn apply_connection(
        &self,
        id: DomainId,
        method: ConnectionMethod,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        let domain = inner
            .domains
            .get_mut(&id)
            .ok_or(DomainliqError::DomainNotFound(id))?;
        Ok(domain.apply_connection(method, at))
    }

    /// Number of registered domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().domains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl DomainRegistry {
    /// Register with a known owner token instead of a minted one.
    pub fn register_with_token(
        &self,
        raw_name: &str,
        token: domainliq_types::OwnerToken,
    ) -> Result<VerifiableDomain> {
        let domain = self.register(raw_name)?;
        let mut inner = self.inner.lock();
        let entry = inner
            .domains
            .get_mut(&domain.id)
            .ok_or(DomainliqError::DomainNotFound(domain.id))?;
        entry.owner_token = token;
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domainliq_types::VerificationState;

    #[test]
    fn register_is_get_or_create() {
        let registry = DomainRegistry::new();
        let first = registry.register("Example.COM.").unwrap();
        let second = registry.register("example.com").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.owner_token, second.owner_token);
        assert_eq!(second.name, "example.com");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_rejects_invalid_names() {
        let registry = DomainRegistry::new();
        let err = registry.register("   ").unwrap_err();
        assert!(matches!(err, DomainliqError::InvalidDomainName { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn get_unknown_id_errors() {
        let registry = DomainRegistry::new();
        let err = registry.get(DomainId::new()).unwrap_err();
        assert!(matches!(err, DomainliqError::DomainNotFound(_)));
    }

    #[test]
    fn ownership_write_persists() {
        let registry = DomainRegistry::new();
        let domain = registry.register("example.com").unwrap();

        let applied = registry
            .apply_ownership(domain.id, OwnershipMethod::Txt, Utc::now())
            .unwrap();
        assert!(applied);

        let fetched = registry.get(domain.id).unwrap();
        assert!(matches!(
            fetched.state,
            VerificationState::OwnershipVerified {
                method: OwnershipMethod::Txt,
                ..
            }
        ));
    }

    #[test]
    fn connection_never_downgraded_by_ownership() {
        let registry = DomainRegistry::new();
        let domain = registry.register("example.com").unwrap();

        assert!(registry
            .apply_connection(domain.id, ConnectionMethod::ARecord, Utc::now())
            .unwrap());
        // A later ownership-only proof must not pull the rank back down.
        assert!(!registry
            .apply_ownership(domain.id, OwnershipMethod::Ns, Utc::now())
            .unwrap());

        let fetched = registry.get(domain.id).unwrap();
        assert_eq!(fetched.state.rank(), 2);
    }

    #[test]
    fn register_with_token_overrides_minted_token() {
        let registry = DomainRegistry::new();
        let token = domainliq_types::OwnerToken::from_value("abc123");
        let domain = registry.register_with_token("example.com", token).unwrap();
        assert_eq!(domain.owner_token.expose(), "abc123");

        let fetched = registry.get(domain.id).unwrap();
        assert_eq!(fetched.owner_token.expose(), "abc123");
    }
}
