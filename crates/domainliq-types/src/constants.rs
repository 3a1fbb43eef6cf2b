//! System-wide constants for the DomainLiq marketplace core.

use std::net::Ipv4Addr;

/// Prefix of the TXT ownership proof. A seller proves control of a domain by
/// publishing `domainliq-verification=<owner token>` in any TXT value.
pub const TXT_PROOF_PREFIX: &str = "domainliq-verification=";

/// Default DNS-over-HTTPS endpoints, queried in parallel.
pub const DEFAULT_DOH_ENDPOINTS: [&str; 2] = [
    "https://dns.google/resolve",
    "https://cloudflare-dns.com/dns-query",
];

/// Sentinel nameserver for the NS ownership proof. Sellers add it as an
/// extra NS record alongside their existing delegation, so the match rule
/// is any-of, never the exact set.
pub const DEFAULT_SENTINEL_NAMESERVER: &str = "ns3.domainliq.com";

/// Ingress address a connected custom domain points its A record at.
pub const DEFAULT_INGRESS_IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 10);

/// Base URL under which listings are served; the canonical per-domain page
/// is `<base>/<domain>` and is the exact target the redirect check expects.
pub const DEFAULT_LISTING_URL_BASE: &str = "https://domainliq.com/listing";

/// Per-source DNS lookup timeout in milliseconds.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;

/// HTTP redirect probe timeout in milliseconds.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Buyer protection window between transfer and automatic release (7 days).
pub const PROTECTION_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Default interval between release sweeps in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Raw byte length of generated owner / reveal tokens (hex doubles it).
pub const TOKEN_BYTES: usize = 16;

/// Platform fee band edges, inclusive upper bounds in minor currency units.
pub const FEE_BAND_FREE_MAX: i64 = 50;
pub const FEE_BAND_SMALL_MAX: i64 = 500;
pub const FEE_BAND_MID_MAX: i64 = 2_000;

/// Default payment-processor fixed fee in minor units.
pub const DEFAULT_PROCESSOR_FIXED_FEE: i64 = 30;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Platform name.
pub const PLATFORM_NAME: &str = "DomainLiq";
