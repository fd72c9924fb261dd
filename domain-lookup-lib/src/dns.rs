//! DNS query engine.
//!
//! Record types are queried concurrently and independently. A type that
//! fails or has no answers contributes an empty list; only when every
//! queried type fails at the resolver level does the request as a whole
//! fail with `ResolverUnavailable`.

use crate::error::LookupError;
use crate::types::{DnsRecordSet, DnsRecordType, LookupConfig, RecordFilter};
use async_trait::async_trait;
use futures::future::join_all;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::TokioAsyncResolver;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Source of DNS answers for a single record type.
///
/// Implementations return `Ok(vec![])` for NXDOMAIN and empty answers, and
/// `ResolverUnavailable` when the resolver itself cannot be reached.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    async fn lookup(
        &self,
        domain: &str,
        record_type: DnsRecordType,
    ) -> Result<Vec<String>, LookupError>;
}

/// `RecordLookup` backed by hickory-resolver.
pub struct HickoryLookup {
    resolver: TokioAsyncResolver,
}

impl HickoryLookup {
    /// Resolver using the system configuration (`/etc/resolv.conf` on Unix).
    ///
    /// Falls back to hickory's default upstreams when the system
    /// configuration cannot be read.
    pub fn from_system(timeout: Duration) -> Self {
        let (config, mut opts) = hickory_resolver::system_conf::read_system_conf()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "System DNS configuration unreadable, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            });
        apply_timeouts(&mut opts, timeout);
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }

    /// Resolver using explicit upstream name servers over UDP.
    pub fn with_nameservers(nameservers: &[SocketAddr], timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        for addr in nameservers {
            config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
        }
        let mut opts = ResolverOpts::default();
        apply_timeouts(&mut opts, timeout);
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

fn apply_timeouts(opts: &mut ResolverOpts, timeout: Duration) {
    opts.timeout = timeout;
    opts.attempts = 2;
}

#[async_trait]
impl RecordLookup for HickoryLookup {
    async fn lookup(
        &self,
        domain: &str,
        record_type: DnsRecordType,
    ) -> Result<Vec<String>, LookupError> {
        let wanted = to_hickory(record_type);
        // Trailing dot keeps search domains out of the query
        let fqdn = format!("{}.", domain.trim_end_matches('.'));

        match self.resolver.lookup(fqdn.as_str(), wanted).await {
            Ok(lookup) => Ok(lookup
                .record_iter()
                .filter(|record| record.record_type() == wanted)
                .filter_map(|record| record.data())
                .map(|data| data.to_string())
                .collect()),
            Err(err) => map_resolve_error(err),
        }
    }
}

fn to_hickory(record_type: DnsRecordType) -> RecordType {
    match record_type {
        DnsRecordType::A => RecordType::A,
        DnsRecordType::AAAA => RecordType::AAAA,
        DnsRecordType::CNAME => RecordType::CNAME,
        DnsRecordType::MX => RecordType::MX,
        DnsRecordType::NS => RecordType::NS,
        DnsRecordType::TXT => RecordType::TXT,
        DnsRecordType::SOA => RecordType::SOA,
        DnsRecordType::CAA => RecordType::CAA,
    }
}

fn map_resolve_error(err: ResolveError) -> Result<Vec<String>, LookupError> {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
        ResolveErrorKind::NoConnections | ResolveErrorKind::Io(_) | ResolveErrorKind::Timeout => {
            Err(LookupError::resolver_unavailable(err.to_string()))
        }
        _ => Err(LookupError::parse(format!("DNS query failed: {}", err))),
    }
}

/// Concurrent per-type DNS lookups.
#[derive(Clone)]
pub struct DnsEngine {
    lookup: Arc<dyn RecordLookup>,
    timeout: Duration,
}

impl DnsEngine {
    /// Create an engine over any `RecordLookup` implementation.
    pub fn new(lookup: Arc<dyn RecordLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Create an engine backed by hickory, honoring `config.nameservers`.
    pub fn from_config(config: &LookupConfig) -> Self {
        let lookup: Arc<dyn RecordLookup> = if config.nameservers.is_empty() {
            Arc::new(HickoryLookup::from_system(config.dns_timeout))
        } else {
            Arc::new(HickoryLookup::with_nameservers(
                &config.nameservers,
                config.dns_timeout,
            ))
        };
        Self::new(lookup, config.dns_timeout)
    }

    /// Query every record type selected by `filter`.
    ///
    /// # Returns
    ///
    /// A `DnsRecordSet` with one entry per queried type, empty where the type
    /// had no answers or failed.
    ///
    /// # Errors
    ///
    /// `ResolverUnavailable` only if every queried type failed because the
    /// resolver could not be reached (or timed out).
    pub async fn query(
        &self,
        domain: &str,
        filter: &RecordFilter,
    ) -> Result<DnsRecordSet, LookupError> {
        let types = filter.types();

        let queries = types.iter().map(|&record_type| async move {
            let outcome =
                tokio::time::timeout(self.timeout, self.lookup.lookup(domain, record_type)).await;
            (record_type, outcome)
        });
        let results = join_all(queries).await;

        let mut records = DnsRecordSet::new();
        let mut resolver_failures = 0;
        let mut last_failure = String::new();

        for (record_type, outcome) in results {
            let answers = match outcome {
                Ok(Ok(answers)) => answers,
                Ok(Err(e)) => {
                    tracing::debug!(domain, %record_type, error = %e, "DNS query failed");
                    if matches!(e, LookupError::ResolverUnavailable { .. }) {
                        resolver_failures += 1;
                        last_failure = e.to_string();
                    }
                    Vec::new()
                }
                Err(_) => {
                    tracing::debug!(domain, %record_type, "DNS query timed out");
                    resolver_failures += 1;
                    last_failure = format!("{} query timed out after {:?}", record_type, self.timeout);
                    Vec::new()
                }
            };
            records.insert(record_type, answers);
        }

        if !types.is_empty() && resolver_failures == types.len() {
            tracing::warn!(domain, "DNS resolver unavailable for every record type");
            return Err(LookupError::resolver_unavailable(last_failure));
        }

        Ok(records)
    }
}
