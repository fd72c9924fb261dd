//! Core data types for domain resolution.
//!
//! This module defines the request value (`DomainQuery`), the per-layer
//! bookkeeping (`Layer`, `AttemptOutcome`, `ResolutionAttempt`), the canonical
//! outputs (`WhoisRecord`, `DnsRecordSet`, `LookupResult`) and the engine
//! configuration (`LookupConfig`).

use crate::error::LookupError;
use crate::protocols::registry::TldOverride;
use crate::utils::normalize_domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// What the caller wants to know about a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    /// Registration data only (WHOIS fallback chain)
    Whois,
    /// DNS records only
    Dns,
    /// Both, resolved concurrently
    #[default]
    Both,
}

impl LookupKind {
    pub fn includes_whois(self) -> bool {
        matches!(self, Self::Whois | Self::Both)
    }

    pub fn includes_dns(self) -> bool {
        matches!(self, Self::Dns | Self::Both)
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Whois => write!(f, "whois"),
            LookupKind::Dns => write!(f, "dns"),
            LookupKind::Both => write!(f, "both"),
        }
    }
}

impl FromStr for LookupKind {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whois" => Ok(Self::Whois),
            "dns" => Ok(Self::Dns),
            "both" | "lookup" | "all" => Ok(Self::Both),
            other => Err(LookupError::config(format!(
                "Unknown lookup kind '{}', expected whois, dns or both",
                other
            ))),
        }
    }
}

/// The DNS record types the engine knows how to query.
///
/// Declaration order is the order used for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DnsRecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    TXT,
    SOA,
    CAA,
}

impl DnsRecordType {
    /// Every supported type, in output order.
    pub const ALL: [DnsRecordType; 8] = [
        DnsRecordType::A,
        DnsRecordType::AAAA,
        DnsRecordType::CNAME,
        DnsRecordType::MX,
        DnsRecordType::NS,
        DnsRecordType::TXT,
        DnsRecordType::SOA,
        DnsRecordType::CAA,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DnsRecordType::A => "A",
            DnsRecordType::AAAA => "AAAA",
            DnsRecordType::CNAME => "CNAME",
            DnsRecordType::MX => "MX",
            DnsRecordType::NS => "NS",
            DnsRecordType::TXT => "TXT",
            DnsRecordType::SOA => "SOA",
            DnsRecordType::CAA => "CAA",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DnsRecordType {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        DnsRecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                LookupError::config(format!("Unsupported DNS record type: {}", s.trim()))
            })
    }
}

/// Which record types a DNS lookup should cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordFilter {
    /// All eight supported types
    #[default]
    All,
    /// An explicit, de-duplicated selection
    Only(Vec<DnsRecordType>),
}

impl RecordFilter {
    /// The concrete list of types to query, in output order.
    pub fn types(&self) -> Vec<DnsRecordType> {
        match self {
            RecordFilter::All => DnsRecordType::ALL.to_vec(),
            RecordFilter::Only(types) => {
                let set: BTreeSet<DnsRecordType> = types.iter().copied().collect();
                set.into_iter().collect()
            }
        }
    }
}

impl FromStr for RecordFilter {
    type Err = LookupError;

    /// Accepts `all` or a comma-separated list such as `A,MX,TXT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(RecordFilter::All);
        }

        let types = trimmed
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(DnsRecordType::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if types.is_empty() {
            Ok(RecordFilter::All)
        } else {
            Ok(RecordFilter::Only(types))
        }
    }
}

/// An immutable, already-normalized lookup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainQuery {
    domain: String,
    kind: LookupKind,
    filter: RecordFilter,
}

impl DomainQuery {
    /// Normalize `raw` and build a query for it.
    ///
    /// Fails with `UnsupportedDomain` before any network activity when the
    /// name is malformed.
    pub fn new(raw: &str, kind: LookupKind) -> Result<Self, LookupError> {
        Ok(Self {
            domain: normalize_domain(raw)?,
            kind,
            filter: RecordFilter::All,
        })
    }

    /// Restrict the DNS part of the query to the given record types.
    pub fn with_filter(mut self, filter: RecordFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn kind(&self) -> LookupKind {
        self.kind
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }
}

/// One of the four WHOIS resolution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Registry host with its query template, strict parsing
    LibraryParsed,
    /// Same host, bare query, lenient parsing
    DirectSocket,
    /// Host discovered through the IANA root
    IanaReferral,
    /// Registration Data Access Protocol over HTTPS
    Rdap,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::LibraryParsed => write!(f, "library-parsed"),
            Layer::DirectSocket => write!(f, "direct-socket"),
            Layer::IanaReferral => write!(f, "iana-referral"),
            Layer::Rdap => write!(f, "rdap"),
        }
    }
}

/// Outcome of a single layer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Timeout,
    ConnectionRefused,
    ParseFailure,
    NotFound,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Success => write!(f, "success"),
            AttemptOutcome::Timeout => write!(f, "timeout"),
            AttemptOutcome::ConnectionRefused => write!(f, "connection refused"),
            AttemptOutcome::ParseFailure => write!(f, "parse failure"),
            AttemptOutcome::NotFound => write!(f, "not found"),
        }
    }
}

/// Transient record of one layer's outcome.
#[derive(Debug, Clone)]
pub struct ResolutionAttempt {
    pub layer: Layer,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
    /// Raw payload, kept only on success
    pub raw: Option<String>,
}

impl ResolutionAttempt {
    pub fn success(layer: Layer, elapsed: Duration, raw: String) -> Self {
        Self {
            layer,
            outcome: AttemptOutcome::Success,
            elapsed,
            raw: Some(raw),
        }
    }

    pub fn failure(layer: Layer, outcome: AttemptOutcome, elapsed: Duration) -> Self {
        Self {
            layer,
            outcome,
            elapsed,
            raw: None,
        }
    }
}

/// Canonical registration record.
///
/// Every structured field is optional; a record carrying only `raw_text` and
/// `winning_layer` is a valid, minimal success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhoisRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrant: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,

    /// Domain status codes (e.g. "clientTransferProhibited")
    pub status: BTreeSet<String>,

    /// Name server host names in response order
    pub name_servers: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<String>,

    /// Contact e-mail addresses found in the response (at most five)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub emails: Vec<String>,

    /// The unmodified source text (pretty-printed JSON for RDAP)
    pub raw_text: String,

    /// Which layer produced this record
    pub winning_layer: Layer,
}

impl WhoisRecord {
    /// A record with nothing but the raw text and provenance.
    pub fn raw_only(raw_text: impl Into<String>, winning_layer: Layer) -> Self {
        Self {
            registrar: None,
            registrant: None,
            creation_date: None,
            expiration_date: None,
            updated_date: None,
            status: BTreeSet::new(),
            name_servers: Vec::new(),
            dnssec: None,
            emails: Vec::new(),
            raw_text: raw_text.into(),
            winning_layer,
        }
    }

    /// Whether at least one structured field was extracted.
    pub fn has_structured_data(&self) -> bool {
        self.registrar.is_some()
            || self.registrant.is_some()
            || self.creation_date.is_some()
            || self.expiration_date.is_some()
            || self.updated_date.is_some()
            || !self.status.is_empty()
            || !self.name_servers.is_empty()
            || self.dnssec.is_some()
    }
}

/// DNS answers grouped by record type.
///
/// Answers keep the order in which the resolver returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DnsRecordSet {
    pub records: BTreeMap<DnsRecordType, Vec<String>>,
}

impl DnsRecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record_type: DnsRecordType, answers: Vec<String>) {
        self.records.insert(record_type, answers);
    }

    pub fn get(&self, record_type: DnsRecordType) -> Option<&[String]> {
        self.records.get(&record_type).map(Vec::as_slice)
    }

    /// Total number of answers across all types.
    pub fn answer_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.answer_count() == 0
    }
}

/// Combined result of a lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResult {
    pub domain: String,
    pub kind: LookupKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisRecord>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsRecordSet>,

    /// Why the WHOIS side is missing in a partially successful `Both` lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_error: Option<String>,

    /// Why the DNS side is missing in a partially successful `Both` lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_error: Option<String>,

    pub queried_at: DateTime<Utc>,

    /// Wall-clock time spent on the lookup
    pub elapsed_ms: u64,
}

impl LookupResult {
    /// The layer that produced the WHOIS record, for audit logging.
    pub fn winning_layer(&self) -> Option<Layer> {
        self.whois.as_ref().map(|w| w.winning_layer)
    }
}

/// Configuration options for the resolution engine.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Global per-query deadline, covering the WHOIS fallback chain and DNS
    /// Default: 10 seconds
    pub deadline: Duration,

    /// TCP connect timeout for WHOIS servers
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Total read timeout for a WHOIS response
    /// Default: 10 seconds
    pub read_timeout: Duration,

    /// Timeout for a single RDAP HTTP request
    /// Default: 8 seconds
    pub rdap_timeout: Duration,

    /// Timeout for a single DNS record-type query
    /// Default: 5 seconds
    pub dns_timeout: Duration,

    /// Maximum number of lookups in flight for batch operations
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// TCP port used for every WHOIS server
    pub whois_port: u16,

    /// Host queried for IANA referrals
    pub iana_host: String,

    /// Universal RDAP base tried after the TLD's own endpoint
    pub rdap_fallback: Option<String>,

    /// Explicit DNS resolvers; system configuration when empty
    pub nameservers: Vec<SocketAddr>,

    /// Extra or replacement routing-table entries, keyed by suffix
    pub tld_overrides: BTreeMap<String, TldOverride>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            rdap_timeout: Duration::from_secs(8),
            dns_timeout: Duration::from_secs(5),
            concurrency: 10,
            whois_port: 43,
            iana_host: "whois.iana.org".to_string(),
            rdap_fallback: Some("https://rdap.org".to_string()),
            nameservers: Vec::new(),
            tld_overrides: BTreeMap::new(),
        }
    }
}

impl LookupConfig {
    /// Set the global WHOIS deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set connect and read timeouts for WHOIS sockets.
    pub fn with_whois_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn with_rdap_timeout(mut self, timeout: Duration) -> Self {
        self.rdap_timeout = timeout;
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    /// Set batch concurrency, capped at 100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    pub fn with_whois_port(mut self, port: u16) -> Self {
        self.whois_port = port;
        self
    }

    pub fn with_iana_host(mut self, host: impl Into<String>) -> Self {
        self.iana_host = host.into();
        self
    }

    /// Set or disable (`None`) the universal RDAP fallback base.
    pub fn with_rdap_fallback(mut self, base: Option<String>) -> Self {
        self.rdap_fallback = base;
        self
    }

    pub fn with_nameservers(mut self, nameservers: Vec<SocketAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }

    /// Add or replace a routing-table entry.
    pub fn with_tld_override(mut self, suffix: impl Into<String>, entry: TldOverride) -> Self {
        self.tld_overrides
            .insert(suffix.into().trim_matches('.').to_lowercase(), entry);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_filter_parsing() {
        assert_eq!("all".parse::<RecordFilter>().unwrap(), RecordFilter::All);
        assert_eq!("".parse::<RecordFilter>().unwrap(), RecordFilter::All);

        let filter: RecordFilter = "mx, a ,TXT".parse().unwrap();
        assert_eq!(
            filter.types(),
            vec![DnsRecordType::A, DnsRecordType::MX, DnsRecordType::TXT]
        );

        assert!("A,PTR".parse::<RecordFilter>().is_err());
    }

    #[test]
    fn test_record_filter_dedups() {
        let filter = RecordFilter::Only(vec![DnsRecordType::MX, DnsRecordType::MX]);
        assert_eq!(filter.types(), vec![DnsRecordType::MX]);
        assert_eq!(RecordFilter::All.types().len(), 8);
    }

    #[test]
    fn test_lookup_kind_parsing() {
        assert_eq!("WHOIS".parse::<LookupKind>().unwrap(), LookupKind::Whois);
        assert_eq!("dns".parse::<LookupKind>().unwrap(), LookupKind::Dns);
        assert_eq!("lookup".parse::<LookupKind>().unwrap(), LookupKind::Both);
        assert!("ftp".parse::<LookupKind>().is_err());
        assert!(LookupKind::Both.includes_whois() && LookupKind::Both.includes_dns());
        assert!(!LookupKind::Dns.includes_whois());
    }

    #[test]
    fn test_domain_query_normalizes() {
        let query = DomainQuery::new("  Example.COM. ", LookupKind::Whois).unwrap();
        assert_eq!(query.domain(), "example.com");
        assert_eq!(query.kind(), LookupKind::Whois);
        assert_eq!(query.filter(), &RecordFilter::All);

        assert!(DomainQuery::new("not a domain", LookupKind::Both).is_err());
    }

    #[test]
    fn test_raw_only_record() {
        let record = WhoisRecord::raw_only("some text", Layer::DirectSocket);
        assert!(!record.has_structured_data());
        assert_eq!(record.winning_layer, Layer::DirectSocket);
        assert_eq!(record.raw_text, "some text");
    }

    #[test]
    fn test_dns_record_set_serializes_type_keys() {
        let mut set = DnsRecordSet::new();
        set.insert(DnsRecordType::MX, vec!["10 mail.example.com.".to_string()]);
        set.insert(DnsRecordType::A, vec![]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["records"]["MX"][0], "10 mail.example.com.");
        assert!(json["records"]["A"].as_array().unwrap().is_empty());
        assert_eq!(set.answer_count(), 1);
    }

    #[test]
    fn test_config_builders() {
        let config = LookupConfig::default()
            .with_concurrency(500)
            .with_deadline(Duration::from_secs(3))
            .with_rdap_fallback(None);
        assert_eq!(config.concurrency, 100);
        assert_eq!(config.deadline, Duration::from_secs(3));
        assert!(config.rdap_fallback.is_none());
        assert_eq!(config.whois_port, 43);
    }
}
