//! Local stub resolver, used as the fallback record source.
//!
//! Wraps the system-configured resolver so that environments where the DoH
//! endpoints are unreachable (captive networks, egress-filtered hosts) can
//! still complete verification.

use async_trait::async_trait;
use domainliq_types::{DomainliqError, RecordType, Result};
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig as HickoryConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;

use crate::source::RecordSource;

/// Record source backed by the operating system's resolver configuration.
pub struct StubSource {
    resolver: TokioAsyncResolver,
}

impl StubSource {
    /// Build from system configuration (`/etc/resolv.conf` and friends),
    /// falling back to a public default when none is readable.
    #[must_use]
    pub fn from_system() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
            TokioAsyncResolver::tokio(HickoryConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }
}

#[async_trait]
impl RecordSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>> {
        let outcome = match record_type {
            RecordType::Txt => self.resolver.txt_lookup(name).await.map(|lookup| {
                lookup
                    .iter()
                    .map(|txt| {
                        txt.txt_data()
                            .iter()
                            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>()
            }),
            RecordType::Ns => self.resolver.ns_lookup(name).await.map(|lookup| {
                lookup.iter().map(|ns| ns.to_string()).collect::<Vec<_>>()
            }),
            RecordType::A => self.resolver.ipv4_lookup(name).await.map(|lookup| {
                lookup.iter().map(|a| a.to_string()).collect::<Vec<_>>()
            }),
        };

        match outcome {
            Ok(values) => Ok(values),
            Err(err) => match err.kind() {
                // An authoritative "no such records" is a negative answer.
                ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
                _ => Err(DomainliqError::SourceFailed {
                    source: "stub".to_string(),
                    reason: err.to_string(),
                }),
            },
        }
    }
}
