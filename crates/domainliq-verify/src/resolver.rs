//! Parallel fan-out resolver client with stub fallback.
//!
//! ## Lookup Flow
//!
//! ```text
//!   lookup(name, type)
//!     ├──▶ DoH endpoint 1 ──┐  parallel, per-attempt timeout
//!     └──▶ DoH endpoint 2 ──┤
//!                           ▼
//!                   union + dedup ── non-empty ──▶ RecordSet
//!                           │ empty, or every endpoint failed
//!                           ▼
//!                   stub resolver ── answered ──▶ RecordSet (may be empty)
//!                           │ failed
//!                           ▼
//!       any DoH endpoint answered? ── yes ──▶ empty RecordSet
//!                           └────────── no ──▶ DL_ERR_200 LookupFailed
//! ```
//!
//! A negative answer from any working source stands on its own; the
//! `LookupFailed` error is reserved for the case where no source produced
//! an answer, so "record missing" is never claimed on incomplete evidence.
//!
//! No retry loop: verification is caller-retriable and DNS propagation is
//! measured in minutes.

use std::sync::Arc;
use std::time::Duration;

use domainliq_types::{DomainliqError, RecordSet, RecordType, ResolverConfig, Result};
use tokio::time::timeout;

use crate::doh::DohSource;
use crate::source::RecordSource;
use crate::stub::StubSource;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Client querying all configured sources for one answer.
pub struct ResolverClient {
    primaries: Vec<Arc<dyn RecordSource>>,
    fallback: Arc<dyn RecordSource>,
    attempt_timeout: Duration,
}

impl ResolverClient {
    /// Production wiring: one DoH source per configured endpoint over a
    /// shared HTTP client, plus the system stub resolver as fallback.
    ///
    /// # Errors
    /// [`DomainliqError::SourceFailed`] if the HTTP client cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.attempt_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| DomainliqError::SourceFailed {
                source: "doh".to_string(),
                reason: err.to_string(),
            })?;

        let primaries = config
            .doh_endpoints
            .iter()
            .map(|endpoint| {
                Arc::new(DohSource::new(endpoint.clone(), client.clone())) as Arc<dyn RecordSource>
            })
            .collect();

        Ok(Self {
            primaries,
            fallback: Arc::new(StubSource::from_system()),
            attempt_timeout: config.attempt_timeout,
        })
    }

    /// Client over custom sources. Used by tests and alternative wirings.
    #[must_use]
    pub fn with_sources(
        primaries: Vec<Arc<dyn RecordSource>>,
        fallback: Arc<dyn RecordSource>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            primaries,
            fallback,
            attempt_timeout,
        }
    }

    /// Look up every value of `record_type` for `name` across all sources.
    ///
    /// # Errors
    /// [`DomainliqError::LookupFailed`] only when every source failed to
    /// answer.
    pub async fn lookup(&self, name: &str, record_type: RecordType) -> Result<RecordSet> {
        let mut handles = Vec::with_capacity(self.primaries.len());
        for source in &self.primaries {
            let source = Arc::clone(source);
            let name = name.to_string();
            let attempt_timeout = self.attempt_timeout;
            handles.push(tokio::spawn(async move {
                match timeout(attempt_timeout, source.query(&name, record_type)).await {
                    Ok(result) => result,
                    Err(_) => Err(DomainliqError::SourceFailed {
                        source: source.name().to_string(),
                        reason: "attempt timed out".to_string(),
                    }),
                }
            }));
        }

        let mut union = RecordSet::new();
        let mut answered = 0usize;
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(DomainliqError::SourceFailed {
                    source: "lookup task".to_string(),
                    reason: err.to_string(),
                }),
            };
            match result {
                Ok(values) => {
                    answered += 1;
                    for value in values {
                        union.insert(value);
                    }
                }
                Err(err) => {
                    tracing::warn!(domain = %name, record_type = %record_type, error = %err, "Record source failed");
                }
            }
        }

        if answered > 0 && !union.is_empty() {
            tracing::debug!(
                domain = %name,
                record_type = %record_type,
                values = union.len(),
                "Lookup answered by DoH"
            );
            return Ok(union);
        }

        // Union empty or every primary failed: one stub attempt.
        let fallback = match timeout(
            self.attempt_timeout,
            self.fallback.query(name, record_type),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DomainliqError::SourceFailed {
                source: self.fallback.name().to_string(),
                reason: "attempt timed out".to_string(),
            }),
        };

        match fallback {
            Ok(values) => {
                tracing::debug!(
                    domain = %name,
                    record_type = %record_type,
                    values = values.len(),
                    "Lookup answered by stub fallback"
                );
                Ok(values.into_iter().collect())
            }
            Err(err) => {
                tracing::warn!(domain = %name, record_type = %record_type, error = %err, "Stub fallback failed");
                if answered > 0 {
                    // A primary's negative answer stands.
                    Ok(RecordSet::new())
                } else {
                    Err(DomainliqError::LookupFailed {
                        domain: name.to_string(),
                        record_type,
                    })
                }
            }
        }
    }
}
