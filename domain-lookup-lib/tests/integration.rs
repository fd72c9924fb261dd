// domain-lookup-lib/tests/integration.rs

//! Integration tests for domain-lookup-lib exports, routing and live lookups

use domain_lookup_lib::{
    info, normalize_domain, DomainQuery, Layer, LookupConfig, LookupEngine, LookupError,
    LookupKind, RecordFilter, TldOverride, TldTable, TLD_TABLE_VERSION,
};
use std::collections::BTreeMap;

#[test]
fn test_library_info() {
    let info = info();
    assert_eq!(info.table_version, TLD_TABLE_VERSION);
    assert_eq!(info.tld_count, TldTable::builtin().len());
}

#[test]
fn test_builtin_routing_for_common_tlds() {
    let table = TldTable::builtin();

    let com = table.resolve_profile("example.com");
    assert_eq!(com.whois_host.as_deref(), Some("whois.verisign-grs.com"));
    assert_eq!(com.format_query("example.com"), "domain example.com");

    let de = table.resolve_profile("example.de");
    assert_eq!(de.format_query("example.de"), "-T dn,ace example.de");

    // Longest suffix wins
    let co_uk = table.resolve_profile("example.co.uk");
    assert_eq!(co_uk.suffix, "co.uk");

    // Google registries have no WHOIS service at all
    let dev = table.resolve_profile("example.dev");
    assert!(dev.whois_absent);
    assert!(dev.whois_host.is_none());
    assert!(dev.rdap_base.is_some());

    // Unknown suffixes get the generic profile
    let unknown = table.resolve_profile("example.zzzz");
    assert!(unknown.is_generic());
    assert!(unknown.whois_host.is_none());
}

#[test]
fn test_builtin_suffixes_sorted_and_unique() {
    let table = TldTable::builtin();
    let suffixes = table.suffixes();

    let mut sorted = suffixes.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(suffixes, sorted, "suffixes must be sorted and unique");
}

#[test]
fn test_overrides_do_not_touch_builtin_table() {
    let overrides = BTreeMap::from([(
        "com".to_string(),
        TldOverride {
            whois: Some("whois.example.net".to_string()),
            ..Default::default()
        },
    )]);

    let custom = TldTable::builtin().with_overrides(&overrides);
    assert_eq!(
        custom.resolve_profile("a.com").whois_host.as_deref(),
        Some("whois.example.net")
    );
    assert_eq!(custom.resolve_profile("a.com").query_template, "domain {domain}");
    assert_eq!(
        TldTable::builtin().resolve_profile("a.com").whois_host.as_deref(),
        Some("whois.verisign-grs.com")
    );
}

#[tokio::test]
async fn test_engine_applies_configured_overrides() {
    let config = LookupConfig::default().with_tld_override(
        "internal",
        TldOverride {
            whois: Some("whois.corp.example".to_string()),
            ..Default::default()
        },
    );
    let engine = LookupEngine::new(config).unwrap();

    let profile = engine.profile_for("host.internal");
    assert_eq!(profile.whois_host.as_deref(), Some("whois.corp.example"));
}

#[test]
fn test_domain_query_normalization() {
    let query = DomainQuery::new("  HTTPS://user@Example.COM:8443/path?q=1 ", LookupKind::Both)
        .unwrap()
        .with_filter("a,mx".parse::<RecordFilter>().unwrap());

    assert_eq!(query.domain(), "example.com");
    assert_eq!(query.kind(), LookupKind::Both);
    assert_eq!(query.filter().types().len(), 2);

    assert_eq!(normalize_domain("bücher.de").unwrap(), "xn--bcher-kva.de");

    for bad in ["", "localhost", "-bad.com", "a..com", "has space.com"] {
        let err = DomainQuery::new(bad, LookupKind::Whois).unwrap_err();
        assert!(
            matches!(err, LookupError::UnsupportedDomain { .. }),
            "{:?} should be rejected",
            bad
        );
        assert!(err.is_no_data());
    }
}

/// Smoke test against the real registries. Hits the network.
#[tokio::test]
#[ignore]
async fn test_live_lookup_example_com() {
    let engine = LookupEngine::new(LookupConfig::default()).unwrap();
    let query = DomainQuery::new("example.com", LookupKind::Both).unwrap();

    let result = engine.lookup(&query).await.unwrap();
    let whois = result.whois.expect("registration data for example.com");
    assert!(whois.creation_date.is_some());
    assert!(!whois.name_servers.is_empty());

    let dns = result.dns.expect("DNS records for example.com");
    assert!(!dns.is_empty());
}

/// .dev has no WHOIS service, so the answer must come from RDAP.
#[tokio::test]
#[ignore]
async fn test_live_rdap_only_tld() {
    let engine = LookupEngine::new(LookupConfig::default()).unwrap();
    let whois = engine.whois("web.dev").await.unwrap();
    assert_eq!(whois.winning_layer, Layer::Rdap);
}
