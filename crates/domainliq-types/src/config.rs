//! Configuration for the verification and settlement subsystems.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{constants, FeeSchedule, ProcessorFee};

/// Resolver client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// DNS-over-HTTPS endpoints queried in parallel.
    pub doh_endpoints: Vec<String>,
    /// Per-source attempt timeout. A timed-out source counts as a
    /// transport failure, not a negative answer.
    pub attempt_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            doh_endpoints: constants::DEFAULT_DOH_ENDPOINTS
                .iter()
                .map(ToString::to_string)
                .collect(),
            attempt_timeout: Duration::from_millis(constants::DEFAULT_LOOKUP_TIMEOUT_MS),
        }
    }
}

/// Verification engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Sentinel nameserver for the NS ownership proof.
    pub sentinel_nameserver: String,
    /// Ingress address a connected domain must point its A record at.
    pub ingress_ip: Ipv4Addr,
    /// Base URL under which listings are served.
    pub listing_url_base: String,
    /// Redirect probe timeout.
    pub probe_timeout: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            sentinel_nameserver: constants::DEFAULT_SENTINEL_NAMESERVER.to_string(),
            ingress_ip: constants::DEFAULT_INGRESS_IP,
            listing_url_base: constants::DEFAULT_LISTING_URL_BASE.to_string(),
            probe_timeout: Duration::from_millis(constants::DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

impl VerifierConfig {
    /// Canonical listing URL the redirect check expects as its exact target.
    #[must_use]
    pub fn canonical_listing_url(&self, domain: &str) -> String {
        format!("{}/{}", self.listing_url_base.trim_end_matches('/'), domain)
    }
}

/// Settlement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Buyer protection window between transfer and automatic release.
    pub protection_window: Duration,
    /// Interval between release sweeps.
    pub sweep_interval: Duration,
    /// Platform fee schedule applied to newly created orders.
    pub fee_schedule: FeeSchedule,
    /// External processor fee model used in payout computation.
    pub processor_fee: ProcessorFee,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            protection_window: Duration::from_secs(constants::PROTECTION_WINDOW_SECS),
            sweep_interval: Duration::from_secs(constants::DEFAULT_SWEEP_INTERVAL_SECS),
            fee_schedule: FeeSchedule::default(),
            processor_fee: ProcessorFee::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_defaults() {
        let cfg = ResolverConfig::default();
        assert_eq!(cfg.doh_endpoints.len(), 2);
        assert!(cfg.doh_endpoints[0].starts_with("https://"));
        assert_eq!(cfg.attempt_timeout, Duration::from_secs(5));
    }

    #[test]
    fn canonical_listing_url_joins_cleanly() {
        let cfg = VerifierConfig::default();
        assert_eq!(
            cfg.canonical_listing_url("example.com"),
            "https://domainliq.com/listing/example.com"
        );

        let cfg = VerifierConfig {
            listing_url_base: "https://domainliq.com/listing/".to_string(),
            ..VerifierConfig::default()
        };
        assert_eq!(
            cfg.canonical_listing_url("example.com"),
            "https://domainliq.com/listing/example.com"
        );
    }

    #[test]
    fn settlement_defaults() {
        let cfg = SettlementConfig::default();
        assert_eq!(cfg.protection_window, Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(cfg.sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn settlement_config_serde_roundtrip() {
        let cfg = SettlementConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SettlementConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.protection_window, back.protection_window);
        assert_eq!(cfg.fee_schedule, back.fee_schedule);
    }
}
