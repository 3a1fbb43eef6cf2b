//! Outbound port for DNS record sources.

use async_trait::async_trait;
use domainliq_types::{RecordType, Result};

/// One upstream that can answer DNS queries: a DoH provider or the local
/// stub resolver.
///
/// An `Ok` with an empty vec is a **negative answer** — the source resolved
/// the name and found no records of the requested type. Errors are reserved
/// for transport-class failures where the source produced no answer at all.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Short label for logs and error reasons.
    fn name(&self) -> &str;

    /// Fetch every value of `record_type` published for `name`.
    ///
    /// # Errors
    /// [`domainliq_types::DomainliqError::SourceFailed`] when the source
    /// could not produce an answer.
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>>;
}
