//! DNS-over-HTTPS record source.
//!
//! Speaks the JSON API exposed by Google Public DNS and Cloudflare:
//! `GET {endpoint}?name={name}&type={code}` with
//! `Accept: application/dns-json`. Both providers serve the same schema, so
//! one implementation covers both configured endpoints.

use async_trait::async_trait;
use domainliq_types::{DomainliqError, RecordType, Result};
use serde::Deserialize;

use crate::source::RecordSource;

/// DNS RCODE carried in the JSON `Status` field.
const RCODE_NOERROR: u32 = 0;
const RCODE_NXDOMAIN: u32 = 3;

/// One DoH endpoint, queried over a shared HTTP client.
#[derive(Debug, Clone)]
pub struct DohSource {
    endpoint: String,
    client: reqwest::Client,
}

impl DohSource {
    /// `endpoint` is the full query URL, e.g. `https://dns.google/resolve`.
    /// The client is shared so concurrent sources reuse one connection pool.
    #[must_use]
    pub fn new(endpoint: String, client: reqwest::Client) -> Self {
        Self { endpoint, client }
    }

    fn transport_error(&self, reason: String) -> DomainliqError {
        DomainliqError::SourceFailed {
            source: self.endpoint.clone(),
            reason,
        }
    }
}

#[async_trait]
impl RecordSource for DohSource {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>> {
        let code = record_type.code().to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", name), ("type", code.as_str())])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.transport_error(format!("http status {status}")));
        }

        let body: DohResponse = response
            .json()
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;

        parse_answers(body, record_type).map_err(|reason| self.transport_error(reason))
    }
}

/// Subset of the DoH JSON schema the platform reads. Unknown fields
/// (`Question`, `TC`, `RA`, ...) are ignored.
#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

/// `NXDOMAIN` is a negative answer, not a failure; any other non-zero
/// status means the provider could not resolve the name.
fn parse_answers(body: DohResponse, record_type: RecordType) -> std::result::Result<Vec<String>, String> {
    match body.status {
        RCODE_NOERROR => Ok(body
            .answer
            .into_iter()
            .filter(|answer| answer.record_type == record_type.code())
            .map(|answer| decode_data(&answer.data, record_type))
            .collect()),
        RCODE_NXDOMAIN => Ok(Vec::new()),
        status => Err(format!("doh status {status}")),
    }
}

/// TXT data arrives in presentation format: quoted, and split into multiple
/// quoted chunks past 255 bytes. Other record types pass through verbatim.
fn decode_data(data: &str, record_type: RecordType) -> String {
    if record_type != RecordType::Txt {
        return data.to_string();
    }
    let trimmed = data.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    if inner.contains("\" \"") {
        inner.split("\" \"").collect()
    } else {
        inner.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str, record_type: RecordType) -> std::result::Result<Vec<String>, String> {
        let body: DohResponse = serde_json::from_str(json).expect("valid DoH JSON");
        parse_answers(body, record_type)
    }

    #[test]
    fn txt_answer_is_unquoted() {
        let json = r#"{
            "Status": 0,
            "Question": [{"name": "example.com.", "type": 16}],
            "Answer": [
                {"name": "example.com.", "type": 16, "TTL": 300,
                 "data": "\"domainliq-verification=abc123\""}
            ]
        }"#;
        let values = parse(json, RecordType::Txt).unwrap();
        assert_eq!(values, vec!["domainliq-verification=abc123".to_string()]);
    }

    #[test]
    fn chunked_txt_is_joined() {
        let json = r#"{
            "Status": 0,
            "Answer": [
                {"name": "example.com.", "type": 16, "TTL": 300,
                 "data": "\"first-half-\" \"second-half\""}
            ]
        }"#;
        let values = parse(json, RecordType::Txt).unwrap();
        assert_eq!(values, vec!["first-half-second-half".to_string()]);
    }

    #[test]
    fn nxdomain_is_an_empty_answer() {
        let json = r#"{"Status": 3}"#;
        let values = parse(json, RecordType::Txt).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn noerror_without_answers_is_empty() {
        let json = r#"{"Status": 0}"#;
        let values = parse(json, RecordType::Ns).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn servfail_is_a_source_failure() {
        let json = r#"{"Status": 2}"#;
        let err = parse(json, RecordType::Txt).unwrap_err();
        assert!(err.contains("doh status 2"), "got: {err}");
    }

    #[test]
    fn cname_chain_entries_are_filtered_out() {
        // Providers interleave CNAME hops (type 5) with the final answers.
        let json = r#"{
            "Status": 0,
            "Answer": [
                {"name": "www.example.com.", "type": 5, "TTL": 300, "data": "example.com."},
                {"name": "example.com.", "type": 1, "TTL": 300, "data": "203.0.113.10"}
            ]
        }"#;
        let values = parse(json, RecordType::A).unwrap();
        assert_eq!(values, vec!["203.0.113.10".to_string()]);
    }

    #[test]
    fn ns_data_passes_through_verbatim() {
        let json = r#"{
            "Status": 0,
            "Answer": [
                {"name": "example.com.", "type": 2, "TTL": 300, "data": "NS3.DomainLiq.com."}
            ]
        }"#;
        let values = parse(json, RecordType::Ns).unwrap();
        assert_eq!(values, vec!["NS3.DomainLiq.com.".to_string()]);
    }

    #[test]
    fn decode_data_handles_unquoted_txt() {
        // Some resolvers omit the quotes for single-chunk values.
        assert_eq!(
            decode_data("domainliq-verification=abc", RecordType::Txt),
            "domainliq-verification=abc"
        );
    }
}
