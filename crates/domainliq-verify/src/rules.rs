//! Pure match rules applied to fetched record sets.
//!
//! All rules are match-any: one matching record among many is sufficient,
//! so stale siblings left over from a previous registrar or parked-page
//! defaults never block verification.

use std::net::Ipv4Addr;

use domainliq_types::RecordSet;
use domainliq_types::constants::TXT_PROOF_PREFIX;

/// TXT ownership proof: any record whose value *contains*
/// `domainliq-verification=<token>`. Substring match tolerates providers
/// that wrap or concatenate TXT values.
#[must_use]
pub fn txt_proof_present(records: &RecordSet, token: &str) -> bool {
    let needle = format!("{TXT_PROOF_PREFIX}{token}");
    records.iter().any(|value| value.contains(&needle))
}

/// NS ownership proof: any delegation equal to the sentinel nameserver
/// after host normalization (case, one trailing dot).
#[must_use]
pub fn sentinel_delegation_present(records: &RecordSet, sentinel: &str) -> bool {
    let sentinel = normalize_host(sentinel);
    records.iter().any(|value| normalize_host(value) == sentinel)
}

/// Connection proof via DNS: any A record equal to the platform ingress
/// address. Unparseable values are skipped, never fatal.
#[must_use]
pub fn ingress_a_record_present(records: &RecordSet, ingress: Ipv4Addr) -> bool {
    records.iter().any(|value| {
        value
            .trim()
            .trim_end_matches('.')
            .parse::<Ipv4Addr>()
            .is_ok_and(|ip| ip == ingress)
    })
}

fn normalize_host(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered
        .strip_suffix('.')
        .map_or(lowered.clone(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> RecordSet {
        values.iter().copied().collect()
    }

    #[test]
    fn txt_exact_value_matches() {
        let records = set(&["domainliq-verification=abc123"]);
        assert!(txt_proof_present(&records, "abc123"));
    }

    #[test]
    fn txt_substring_matches_wrapped_value() {
        let records = set(&["v=spf1 -all; domainliq-verification=abc123; managed-by=host"]);
        assert!(txt_proof_present(&records, "abc123"));
    }

    #[test]
    fn txt_wrong_token_does_not_match() {
        let records = set(&["domainliq-verification=abc123"]);
        assert!(!txt_proof_present(&records, "def456"));
    }

    #[test]
    fn txt_prefix_without_token_does_not_match() {
        let records = set(&["domainliq-verification="]);
        assert!(!txt_proof_present(&records, "abc123"));
    }

    #[test]
    fn txt_one_match_among_unrelated_records_wins() {
        let records = set(&[
            "google-site-verification=xyz",
            "v=spf1 include:_spf.example.com ~all",
            "domainliq-verification=abc123",
        ]);
        assert!(txt_proof_present(&records, "abc123"));
    }

    #[test]
    fn ns_matches_case_and_dot_variants() {
        for value in ["ns3.domainliq.com", "NS3.DomainLiq.COM.", "ns3.domainliq.com."] {
            let records = set(&["ns1.oldhost.net.", value]);
            assert!(
                sentinel_delegation_present(&records, "ns3.domainliq.com"),
                "variant {value:?} should match"
            );
        }
    }

    #[test]
    fn ns_requires_only_one_matching_delegation() {
        let records = set(&["ns1.oldhost.net.", "ns2.oldhost.net.", "ns3.domainliq.com."]);
        assert!(sentinel_delegation_present(&records, "ns3.domainliq.com"));
    }

    #[test]
    fn ns_no_sentinel_no_match() {
        let records = set(&["ns1.oldhost.net.", "ns2.oldhost.net."]);
        assert!(!sentinel_delegation_present(&records, "ns3.domainliq.com"));
    }

    #[test]
    fn ns_partial_host_does_not_match() {
        let records = set(&["xns3.domainliq.com.", "ns3.domainliq.com.evil.net."]);
        assert!(!sentinel_delegation_present(&records, "ns3.domainliq.com"));
    }

    #[test]
    fn a_record_any_equals_ingress() {
        let ingress = Ipv4Addr::new(203, 0, 113, 10);
        let records = set(&["198.51.100.7", "203.0.113.10"]);
        assert!(ingress_a_record_present(&records, ingress));
    }

    #[test]
    fn a_record_mismatch() {
        let ingress = Ipv4Addr::new(203, 0, 113, 10);
        let records = set(&["198.51.100.7"]);
        assert!(!ingress_a_record_present(&records, ingress));
    }

    #[test]
    fn a_record_garbage_values_are_skipped() {
        let ingress = Ipv4Addr::new(203, 0, 113, 10);
        let records = set(&["not-an-ip", "", "203.0.113.10."]);
        assert!(ingress_a_record_present(&records, ingress));
    }

    #[test]
    fn empty_sets_never_match() {
        let records = RecordSet::new();
        assert!(!txt_proof_present(&records, "abc123"));
        assert!(!sentinel_delegation_present(&records, "ns3.domainliq.com"));
        assert!(!ingress_a_record_present(
            &records,
            Ipv4Addr::new(203, 0, 113, 10)
        ));
    }
}
