//! # Domain Lookup Library
//!
//! Resolves domain registration data (WHOIS/RDAP) and DNS records.
//!
//! Registration data comes from a fallback chain: the registry's WHOIS server
//! with a strict parser, the same server with a lenient parser, the server
//! IANA refers to, and finally RDAP. The first layer that answers wins, and
//! every answer is normalized into one `WhoisRecord` shape with the winning
//! layer attached.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_lookup_lib::{DomainQuery, LookupConfig, LookupEngine, LookupKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = LookupEngine::new(LookupConfig::default())?;
//!     let query = DomainQuery::new("https://Example.COM/about", LookupKind::Whois)?;
//!     let result = engine.lookup(&query).await?;
//!
//!     if let Some(whois) = &result.whois {
//!         println!("{} via {}: {:?}", result.domain, whois.winning_layer, whois.registrar);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Fallback chain**: four WHOIS/RDAP layers under one global deadline
//! - **Routing table**: built-in WHOIS/RDAP endpoints per TLD, overridable
//! - **Normalization**: registrar, dates, status, nameservers, DNSSEC, contacts
//! - **DNS**: A, AAAA, CNAME, MX, NS, TXT, SOA and CAA queried concurrently

pub use config::{
    load_env_config, parse_nameserver, parse_timeout_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig, OutputConfig, ResolverConfig,
};
pub use dns::{DnsEngine, HickoryLookup, RecordLookup};
pub use engine::LookupEngine;
pub use error::LookupError;
pub use normalize::{normalize, parse_date, ResponseSource};
pub use orchestrator::{FallbackOrchestrator, FallbackState, ParsePolicy};
pub use protocols::iana::IanaResolver;
pub use protocols::rdap::RdapClient;
pub use protocols::registry::{TldOverride, TldProfile, TldTable, TLD_TABLE_VERSION};
pub use protocols::whois::WhoisClient;
pub use types::{
    AttemptOutcome, DnsRecordSet, DnsRecordType, DomainQuery, Layer, LookupConfig, LookupKind,
    LookupResult, RecordFilter, ResolutionAttempt, WhoisRecord,
};
pub use utils::{normalize_domain, parse_domain_list};

mod config;
mod dns;
mod engine;
mod error;
mod normalize;
mod orchestrator;
mod protocols;
mod types;
mod utils;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, LookupError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        table_version: TLD_TABLE_VERSION,
        tld_count: TldTable::builtin().len(),
    }
}

/// Information about the library build and its routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub table_version: &'static str,
    /// Suffixes in the built-in routing table
    pub tld_count: usize,
}
