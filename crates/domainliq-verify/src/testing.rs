//! Canned record sources for exercising the resolver and engine without a
//! network.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use domainliq_types::{DomainliqError, RecordType, Result};

use crate::source::RecordSource;

/// Source answering from a fixed table. Missing entries answer empty.
#[derive(Debug, Default)]
pub struct StaticSource {
    label: &'static str,
    answers: HashMap<RecordType, Vec<String>>,
    fail: bool,
    fail_types: HashSet<RecordType>,
}

impl StaticSource {
    /// Source that answers every query with an empty (negative) answer.
    #[must_use]
    pub fn empty(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    /// Source that fails every query.
    #[must_use]
    pub fn failing(label: &'static str) -> Self {
        Self {
            label,
            fail: true,
            ..Self::default()
        }
    }

    /// Add a canned answer for one record type.
    #[must_use]
    pub fn with_answer(mut self, record_type: RecordType, values: &[&str]) -> Self {
        self.answers
            .insert(record_type, values.iter().map(|v| (*v).to_string()).collect());
        self
    }

    /// Fail queries for one record type while still answering the rest.
    #[must_use]
    pub fn with_failure(mut self, record_type: RecordType) -> Self {
        self.fail_types.insert(record_type);
        self
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    fn name(&self) -> &str {
        self.label
    }

    async fn query(&self, _name: &str, record_type: RecordType) -> Result<Vec<String>> {
        if self.fail || self.fail_types.contains(&record_type) {
            return Err(DomainliqError::SourceFailed {
                source: self.label.to_string(),
                reason: "canned failure".to_string(),
            });
        }
        Ok(self.answers.get(&record_type).cloned().unwrap_or_default())
    }
}

/// Source that never answers within any sane deadline.
#[derive(Debug)]
pub struct SlowSource {
    delay: Duration,
}

impl SlowSource {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl RecordSource for SlowSource {
    fn name(&self) -> &str {
        "slow"
    }

    async fn query(&self, _name: &str, _record_type: RecordType) -> Result<Vec<String>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}
