//! Verification engine: runs ownership and connection checks, writes
//! successful proofs to the registry, and returns a verdict either way.
//!
//! ## Ownership Checks
//!
//! 1. **TXT** (primary): any TXT record containing the owner-token proof.
//! 2. **NS** (secondary): any delegation equal to the sentinel nameserver.
//!
//! A positive proof from either check verifies the domain, even if the
//! other check's lookup failed. With no positive proof, `RecordNotFound`
//! requires both lookups to have completed; otherwise the verdict is
//! `LookupFailed`, so "record missing" is never claimed on incomplete
//! evidence.
//!
//! ## Connection Checks
//!
//! Attempted in the caller's order, first success wins:
//! - **Redirect**: the root URL answers a redirect whose `Location` equals
//!   the canonical listing URL exactly.
//! - **A record**: any A record equals the platform ingress address.

use std::sync::Arc;

use chrono::Utc;
use domainliq_types::{
    ConnectionMethod, DomainId, DomainliqError, OwnershipMethod, RecordType, Result,
    VerifierConfig,
};

use crate::registry::DomainRegistry;
use crate::resolver::ResolverClient;
use crate::rules;
use crate::verdict::{
    ConnectionFailure, ConnectionFailureReason, ConnectionVerdict, OwnershipVerdict,
};

/// Engine over one registry, one resolver client, and one probe client.
pub struct VerificationEngine {
    registry: Arc<DomainRegistry>,
    resolver: ResolverClient,
    config: VerifierConfig,
    /// HTTP client with redirects disabled so the probe can inspect the
    /// `Location` header itself.
    probe: reqwest::Client,
}

impl VerificationEngine {
    /// # Errors
    /// [`DomainliqError::Internal`] if the probe HTTP client cannot be
    /// built.
    pub fn new(
        registry: Arc<DomainRegistry>,
        resolver: ResolverClient,
        config: VerifierConfig,
    ) -> Result<Self> {
        let probe = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.probe_timeout)
            .build()
            .map_err(|err| DomainliqError::Internal(format!("probe client: {err}")))?;
        Ok(Self {
            registry,
            resolver,
            config,
            probe,
        })
    }

    /// Run the ownership checks for a registered domain.
    ///
    /// # Errors
    /// [`DomainliqError::DomainNotFound`] for unknown ids. Check failures
    /// are verdicts, not errors.
    pub async fn verify_ownership(&self, domain_id: DomainId) -> Result<OwnershipVerdict> {
        let domain = self.registry.get(domain_id)?;

        let txt_result = self.resolver.lookup(&domain.name, RecordType::Txt).await;
        if let Ok(records) = &txt_result {
            if rules::txt_proof_present(records, domain.owner_token.expose()) {
                return self.record_ownership(domain_id, &domain.name, OwnershipMethod::Txt);
            }
        }

        let ns_result = self.resolver.lookup(&domain.name, RecordType::Ns).await;
        if let Ok(records) = &ns_result {
            if rules::sentinel_delegation_present(records, &self.config.sentinel_nameserver) {
                return self.record_ownership(domain_id, &domain.name, OwnershipMethod::Ns);
            }
        }

        match (txt_result, ns_result) {
            (Ok(_), Ok(_)) => {
                tracing::debug!(domain = %domain.name, "No ownership proof found");
                Ok(OwnershipVerdict::RecordNotFound {
                    expected_txt: domain.owner_token.expected_txt_record(),
                    sentinel_ns: self.config.sentinel_nameserver.clone(),
                })
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(domain = %domain.name, error = %err, "Ownership lookup incomplete");
                Ok(OwnershipVerdict::LookupFailed {
                    detail: err.to_string(),
                })
            }
        }
    }

    /// Run the connection checks in `methods` order; the first success
    /// wins.
    ///
    /// # Errors
    /// [`DomainliqError::DomainNotFound`] for unknown ids.
    pub async fn verify_connection(
        &self,
        domain_id: DomainId,
        methods: &[ConnectionMethod],
    ) -> Result<ConnectionVerdict> {
        let domain = self.registry.get(domain_id)?;
        let mut failures = Vec::with_capacity(methods.len());

        for &method in methods {
            let outcome = match method {
                ConnectionMethod::Redirect => self.check_redirect(&domain.name).await,
                ConnectionMethod::ARecord => self.check_a_record(&domain.name).await,
            };
            match outcome {
                Ok(()) => {
                    return self.record_connection(domain_id, &domain.name, method);
                }
                Err(reason) => {
                    tracing::debug!(domain = %domain.name, method = %method, ?reason, "Connection check failed");
                    failures.push(ConnectionFailure { method, reason });
                }
            }
        }

        Ok(ConnectionVerdict::NotConnected { failures })
    }

    /// Probe `http://{name}/` and require a redirect whose `Location` is
    /// exactly the canonical listing URL.
    async fn check_redirect(&self, name: &str) -> std::result::Result<(), ConnectionFailureReason> {
        let url = format!("http://{name}/");
        let expected = self.config.canonical_listing_url(name);

        let response = match self.probe.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                return Err(ConnectionFailureReason::Transient {
                    detail: err.to_string(),
                });
            }
        };

        if !response.status().is_redirection() {
            return Err(ConnectionFailureReason::Mismatch {
                expected,
                found: format!("status {}", response.status()),
            });
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        match location {
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(ConnectionFailureReason::Mismatch { expected, found }),
            None => Err(ConnectionFailureReason::Mismatch {
                expected,
                found: "redirect without Location header".to_string(),
            }),
        }
    }

    async fn check_a_record(&self, name: &str) -> std::result::Result<(), ConnectionFailureReason> {
        match self.resolver.lookup(name, RecordType::A).await {
            Ok(records) if rules::ingress_a_record_present(&records, self.config.ingress_ip) => {
                Ok(())
            }
            Ok(records) => Err(ConnectionFailureReason::Mismatch {
                expected: self.config.ingress_ip.to_string(),
                found: if records.is_empty() {
                    "no A records".to_string()
                } else {
                    records.values().join(", ")
                },
            }),
            Err(err) => Err(ConnectionFailureReason::Transient {
                detail: err.to_string(),
            }),
        }
    }

    fn record_ownership(
        &self,
        id: DomainId,
        name: &str,
        method: OwnershipMethod,
    ) -> Result<OwnershipVerdict> {
        let now = Utc::now();
        let applied = self.registry.apply_ownership(id, method, now)?;
        if applied {
            tracing::info!(domain = %name, method = %method, "Ownership verified");
        } else {
            tracing::debug!(domain = %name, method = %method, "Ownership proof found; state already higher");
        }
        Ok(OwnershipVerdict::Verified {
            method,
            verified_at: now,
        })
    }

    fn record_connection(
        &self,
        id: DomainId,
        name: &str,
        method: ConnectionMethod,
    ) -> Result<ConnectionVerdict> {
        let now = Utc::now();
        self.registry.apply_connection(id, method, now)?;
        tracing::info!(domain = %name, method = %method, "Connection verified");
        Ok(ConnectionVerdict::Connected {
            method,
            connected_at: now,
        })
    }
}
