//! Main lookup engine.
//!
//! `LookupEngine` ties the routing table, the WHOIS fallback chain and the DNS
//! engine together behind a small async API.

use crate::dns::{DnsEngine, RecordLookup};
use crate::error::LookupError;
use crate::orchestrator::FallbackOrchestrator;
use crate::protocols::registry::{TldProfile, TldTable};
use crate::types::{
    DnsRecordSet, DomainQuery, LookupConfig, LookupKind, LookupResult, RecordFilter, WhoisRecord,
};
use crate::utils::normalize_domain;
use chrono::Utc;
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

/// Resolves registration data and DNS records for domains.
///
/// The engine holds no mutable state. One instance can serve any number of
/// concurrent lookups.
///
/// # Example
///
/// ```rust,no_run
/// use domain_lookup_lib::{DomainQuery, LookupConfig, LookupEngine, LookupKind};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let engine = LookupEngine::new(LookupConfig::default())?;
///     let query = DomainQuery::new("example.com", LookupKind::Both)?;
///     let result = engine.lookup(&query).await?;
///     println!("{} answered by {:?}", result.domain, result.winning_layer());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct LookupEngine {
    config: LookupConfig,
    table: Arc<TldTable>,
    orchestrator: FallbackOrchestrator,
    dns: DnsEngine,
}

impl LookupEngine {
    /// Create an engine using the system DNS configuration (or the
    /// configured nameservers).
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        let dns = DnsEngine::from_config(&config);
        Self::build(config, dns)
    }

    /// Create an engine with a custom DNS backend.
    pub fn with_dns(
        config: LookupConfig,
        lookup: Arc<dyn RecordLookup>,
    ) -> Result<Self, LookupError> {
        let dns = DnsEngine::new(lookup, config.dns_timeout);
        Self::build(config, dns)
    }

    fn build(config: LookupConfig, dns: DnsEngine) -> Result<Self, LookupError> {
        let table = if config.tld_overrides.is_empty() {
            TldTable::builtin()
        } else {
            Arc::new(TldTable::builtin().with_overrides(&config.tld_overrides))
        };
        let orchestrator = FallbackOrchestrator::new(&config)?;

        Ok(Self {
            config,
            table,
            orchestrator,
            dns,
        })
    }

    /// Run the lookup described by `query`.
    ///
    /// For `LookupKind::Both` the WHOIS chain and DNS queries run
    /// concurrently. If one side fails the result still carries the other
    /// side, with the failure reported in `whois_error` or `dns_error`.
    ///
    /// # Errors
    ///
    /// * `Exhausted` when no WHOIS layer produced data (WHOIS-only, or both
    ///   sides failed)
    /// * `ResolverUnavailable` when DNS-only and the resolver is unreachable
    /// * `Timeout` when DNS-only and the deadline fired first
    pub async fn lookup(&self, query: &DomainQuery) -> Result<LookupResult, LookupError> {
        let domain = query.domain();
        let kind = query.kind();
        let started = Instant::now();
        let queried_at = Utc::now();

        let (whois, dns) = match kind {
            LookupKind::Whois => (Some(self.resolve_whois(domain).await), None),
            LookupKind::Dns => (None, Some(self.bounded_dns(domain, query.filter()).await)),
            LookupKind::Both => {
                let (whois, dns) = tokio::join!(
                    self.resolve_whois(domain),
                    self.bounded_dns(domain, query.filter())
                );
                (Some(whois), Some(dns))
            }
        };

        let (whois, whois_error) = split(whois);
        let (dns, dns_error) = split(dns);

        match (whois_error, dns_error) {
            (Some(whois_err), Some(_)) => return Err(whois_err),
            (Some(err), None) if kind == LookupKind::Whois => return Err(err),
            (None, Some(err)) if kind == LookupKind::Dns => return Err(err),
            (whois_error, dns_error) => {
                if let Some(e) = &dns_error {
                    tracing::warn!(domain, error = %e, "DNS lookup failed, returning WHOIS only");
                }

                Ok(LookupResult {
                    domain: domain.to_string(),
                    kind,
                    whois,
                    dns,
                    whois_error: whois_error.map(|e| e.to_string()),
                    dns_error: dns_error.map(|e| e.to_string()),
                    queried_at,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                })
            }
        }
    }

    /// Resolve registration data for a raw domain string.
    pub async fn whois(&self, domain: &str) -> Result<WhoisRecord, LookupError> {
        let domain = normalize_domain(domain)?;
        self.resolve_whois(&domain).await
    }

    /// Query DNS records for a raw domain string.
    pub async fn dns(
        &self,
        domain: &str,
        filter: &RecordFilter,
    ) -> Result<DnsRecordSet, LookupError> {
        let domain = normalize_domain(domain)?;
        self.bounded_dns(&domain, filter).await
    }

    /// DNS queries under the same per-query deadline as the WHOIS chain.
    async fn bounded_dns(
        &self,
        domain: &str,
        filter: &RecordFilter,
    ) -> Result<DnsRecordSet, LookupError> {
        let deadline = self.config.deadline;
        match tokio::time::timeout(deadline, self.dns.query(domain, filter)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(domain, ?deadline, "DNS lookup cut off by deadline");
                Err(LookupError::timeout("DNS lookup", deadline))
            }
        }
    }

    /// Run many lookups with bounded concurrency.
    ///
    /// Results are returned in input order; each query succeeds or fails on
    /// its own.
    pub async fn lookup_many(
        &self,
        queries: &[DomainQuery],
    ) -> Vec<Result<LookupResult, LookupError>> {
        let mut indexed: Vec<(usize, Result<LookupResult, LookupError>)> = stream::iter(
            queries.iter().enumerate(),
        )
        .map(|(index, query)| async move { (index, self.lookup(query).await) })
        .buffer_unordered(self.config.concurrency)
        .collect()
        .await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }

    /// Run many lookups and yield results as they complete.
    pub fn lookup_stream<'a>(
        &'a self,
        queries: &'a [DomainQuery],
    ) -> Pin<Box<dyn Stream<Item = Result<LookupResult, LookupError>> + Send + 'a>> {
        let stream = stream::iter(queries)
            .map(move |query| self.lookup(query))
            .buffer_unordered(self.config.concurrency);

        Box::pin(stream)
    }

    /// The routing profile a domain would use.
    pub fn profile_for(&self, domain: &str) -> &TldProfile {
        self.table.resolve_profile(domain)
    }

    /// The routing table in use, including configured overrides.
    pub fn table(&self) -> &TldTable {
        &self.table
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    async fn resolve_whois(&self, domain: &str) -> Result<WhoisRecord, LookupError> {
        let profile = self.table.resolve_profile(domain);
        tracing::debug!(
            domain,
            suffix = %profile.suffix,
            whois_host = ?profile.whois_host,
            "Starting WHOIS resolution"
        );
        self.orchestrator.resolve(domain, profile).await
    }
}

fn split<T>(result: Option<Result<T, LookupError>>) -> (Option<T>, Option<LookupError>) {
    match result {
        Some(Ok(value)) => (Some(value), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    }
}
