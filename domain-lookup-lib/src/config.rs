//! Configuration file parsing and management.
//!
//! Configuration comes from TOML files and `DL_*` environment variables.
//! Files are merged in precedence order (XDG < global < local < explicit),
//! and each layer only overrides the values it sets.

use crate::error::LookupError;
use crate::protocols::registry::TldOverride;
use crate::types::{DnsRecordType, LookupConfig, LookupKind, RecordFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// deadline = "15s"
/// timeout = "5s"
/// concurrency = 20
/// kind = "both"
/// record_types = ["A", "MX"]
///
/// [resolver]
/// nameservers = ["1.1.1.1:53", "9.9.9.9"]
///
/// [tld_overrides.io]
/// whois = "whois.nic.io"
///
/// [output]
/// json = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for lookups and CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// DNS resolver and WHOIS endpoint settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverConfig>,

    /// Per-suffix routing table changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tld_overrides: Option<BTreeMap<String, TldOverride>>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default values that map to lookup settings and CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Total WHOIS budget (as string, e.g. "10s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    /// Shorthand setting every per-layer network timeout at once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdap_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_timeout: Option<String>,

    /// Concurrent lookups for batches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Default lookup kind ("whois", "dns" or "both")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Default DNS record types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_types: Option<Vec<String>>,
}

/// Network endpoints used by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolverConfig {
    /// DNS nameservers ("1.1.1.1:53" or a bare IP for port 53)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_port: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iana_host: Option<String>,

    /// Universal RDAP base; an empty string disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdap_fallback: Option<String>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,

    /// Print raw registry text after the parsed fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
}

impl FileConfig {
    /// Apply this file's settings on top of `base`.
    pub fn apply(&self, mut base: LookupConfig) -> Result<LookupConfig, LookupError> {
        if let Some(defaults) = &self.defaults {
            if let Some(deadline) = &defaults.deadline {
                base = base.with_deadline(require_duration("deadline", deadline)?);
            }
            if let Some(timeout) = &defaults.timeout {
                base = with_all_timeouts(base, require_duration("timeout", timeout)?);
            }
            if let Some(value) = &defaults.connect_timeout {
                base.connect_timeout = require_duration("connect_timeout", value)?;
            }
            if let Some(value) = &defaults.read_timeout {
                base.read_timeout = require_duration("read_timeout", value)?;
            }
            if let Some(value) = &defaults.rdap_timeout {
                base.rdap_timeout = require_duration("rdap_timeout", value)?;
            }
            if let Some(value) = &defaults.dns_timeout {
                base.dns_timeout = require_duration("dns_timeout", value)?;
            }
            if let Some(concurrency) = defaults.concurrency {
                base = base.with_concurrency(concurrency);
            }
        }

        if let Some(resolver) = &self.resolver {
            if let Some(nameservers) = &resolver.nameservers {
                let addrs = nameservers
                    .iter()
                    .map(|s| parse_nameserver(s))
                    .collect::<Result<Vec<_>, _>>()?;
                base = base.with_nameservers(addrs);
            }
            if let Some(port) = resolver.whois_port {
                base = base.with_whois_port(port);
            }
            if let Some(host) = &resolver.iana_host {
                base = base.with_iana_host(host.trim());
            }
            if let Some(fallback) = &resolver.rdap_fallback {
                let fallback = fallback.trim();
                base = base.with_rdap_fallback(if fallback.is_empty() {
                    None
                } else {
                    Some(fallback.to_string())
                });
            }
        }

        if let Some(overrides) = &self.tld_overrides {
            for (suffix, entry) in overrides {
                base = base.with_tld_override(suffix.as_str(), entry.clone());
            }
        }

        Ok(base)
    }

    /// The default lookup kind, if configured.
    pub fn kind(&self) -> Result<Option<LookupKind>, LookupError> {
        self.defaults
            .as_ref()
            .and_then(|d| d.kind.as_deref())
            .map(str::parse)
            .transpose()
    }

    /// The default record filter, if configured.
    pub fn record_filter(&self) -> Result<Option<RecordFilter>, LookupError> {
        match self.defaults.as_ref().and_then(|d| d.record_types.as_ref()) {
            Some(types) => types
                .iter()
                .map(|t| t.parse::<DnsRecordType>())
                .collect::<Result<Vec<_>, _>>()
                .map(|types| Some(RecordFilter::Only(types))),
            None => Ok(None),
        }
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were used
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if reading, parsing or
    /// validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, LookupError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LookupError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LookupError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)
            .map_err(|e| LookupError::config(format!("Failed to parse TOML configuration: {}", e)))?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Files that fail to load are skipped with a warning; a broken file in
    /// the home directory should not make every lookup fail.
    pub fn discover_and_load(&self) -> Result<FileConfig, LookupError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping configuration file");
                }
            }
        }

        if self.verbose && !loaded_files.is_empty() {
            for (i, path) in loaded_files.iter().enumerate() {
                let precedence = if i == loaded_files.len() - 1 {
                    "highest"
                } else {
                    "overridden where set later"
                };
                tracing::info!(path = %path.display(), precedence, "Loaded configuration file");
            }
        }

        Ok(merged_config)
    }

    /// Load discovered files, then an explicit file on top of them.
    pub fn load_with_explicit<P: AsRef<Path>>(
        &self,
        explicit: Option<P>,
    ) -> Result<FileConfig, LookupError> {
        let discovered = self.discover_and_load()?;
        match explicit {
            Some(path) => {
                let explicit = self.load_file(path)?;
                Ok(self.merge_configs(discovered, explicit))
            }
            None => Ok(discovered),
        }
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-lookup.toml", "./.domain-lookup.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".domain-lookup.toml", "domain-lookup.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-lookup").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations. Values from `higher` win.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut low), Some(high)) => {
                    merge_option(&mut low.deadline, high.deadline);
                    merge_option(&mut low.timeout, high.timeout);
                    merge_option(&mut low.connect_timeout, high.connect_timeout);
                    merge_option(&mut low.read_timeout, high.read_timeout);
                    merge_option(&mut low.rdap_timeout, high.rdap_timeout);
                    merge_option(&mut low.dns_timeout, high.dns_timeout);
                    merge_option(&mut low.concurrency, high.concurrency);
                    merge_option(&mut low.kind, high.kind);
                    merge_option(&mut low.record_types, high.record_types);
                    Some(low)
                }
                (low, high) => high.or(low),
            },
            resolver: match (lower.resolver, higher.resolver) {
                (Some(mut low), Some(high)) => {
                    merge_option(&mut low.nameservers, high.nameservers);
                    merge_option(&mut low.whois_port, high.whois_port);
                    merge_option(&mut low.iana_host, high.iana_host);
                    merge_option(&mut low.rdap_fallback, high.rdap_fallback);
                    Some(low)
                }
                (low, high) => high.or(low),
            },
            tld_overrides: match (lower.tld_overrides, higher.tld_overrides) {
                (Some(mut low), Some(high)) => {
                    // Whole entries are replaced per suffix
                    low.extend(high);
                    Some(low)
                }
                (low, high) => high.or(low),
            },
            output: higher.output.or(lower.output),
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), LookupError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(LookupError::config("Concurrency must be between 1 and 100"));
                }
            }

            let timeouts = [
                ("deadline", &defaults.deadline),
                ("timeout", &defaults.timeout),
                ("connect_timeout", &defaults.connect_timeout),
                ("read_timeout", &defaults.read_timeout),
                ("rdap_timeout", &defaults.rdap_timeout),
                ("dns_timeout", &defaults.dns_timeout),
            ];
            for (name, value) in timeouts {
                if let Some(value) = value {
                    require_duration(name, value)?;
                }
            }
        }

        config.kind()?;
        config.record_filter()?;

        if let Some(resolver) = &config.resolver {
            for ns in resolver.nameservers.iter().flatten() {
                parse_nameserver(ns)?;
            }
            if resolver.whois_port == Some(0) {
                return Err(LookupError::config("whois_port cannot be 0"));
            }
            if let Some(fallback) = &resolver.rdap_fallback {
                validate_rdap_url("rdap_fallback", fallback)?;
            }
        }

        if let Some(overrides) = &config.tld_overrides {
            for (suffix, entry) in overrides {
                validate_override(suffix, entry)?;
            }
        }

        Ok(())
    }
}

fn merge_option<T>(low: &mut Option<T>, high: Option<T>) {
    if high.is_some() {
        *low = high;
    }
}

fn validate_override(suffix: &str, entry: &TldOverride) -> Result<(), LookupError> {
    let trimmed = suffix.trim().trim_matches('.');
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return Err(LookupError::config(format!(
            "Invalid suffix '{}' in tld_overrides",
            suffix
        )));
    }

    if let Some(template) = &entry.query_template {
        if !template.contains("{domain}") {
            return Err(LookupError::config(format!(
                "query_template for '{}' must contain {{domain}}",
                suffix
            )));
        }
    }

    if let Some(host) = &entry.whois {
        // Empty clears the host
        if host.trim().contains(char::is_whitespace) {
            return Err(LookupError::config(format!(
                "Invalid WHOIS host '{}' for '{}'",
                host, suffix
            )));
        }
    }

    if let Some(rdap) = &entry.rdap {
        validate_rdap_url(suffix, rdap)?;
    }

    Ok(())
}

/// An empty URL is allowed and means "none".
fn validate_rdap_url(name: &str, url: &str) -> Result<(), LookupError> {
    let url = url.trim();
    if url.is_empty() {
        return Ok(());
    }
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(LookupError::config(format!(
            "RDAP base for '{}' must be an http(s) URL, got '{}'",
            name, url
        )))
    }
}

/// Parse a nameserver address; a bare IP means port 53.
pub fn parse_nameserver(value: &str) -> Result<SocketAddr, LookupError> {
    let value = value.trim();
    value
        .parse::<SocketAddr>()
        .or_else(|_| value.parse::<IpAddr>().map(|ip| SocketAddr::new(ip, 53)))
        .map_err(|_| LookupError::config(format!("Invalid nameserver address '{}'", value)))
}

fn require_duration(name: &str, value: &str) -> Result<Duration, LookupError> {
    parse_timeout_string(value).ok_or_else(|| {
        LookupError::config(format!(
            "Invalid {} '{}'. Use a format like '500ms', '5s', '2m'",
            name, value
        ))
    })
}

fn with_all_timeouts(config: LookupConfig, timeout: Duration) -> LookupConfig {
    config
        .with_whois_timeouts(timeout, timeout)
        .with_rdap_timeout(timeout)
        .with_dns_timeout(timeout)
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DL_* environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub deadline: Option<Duration>,
    pub timeout: Option<Duration>,
    pub concurrency: Option<usize>,
    pub kind: Option<LookupKind>,
    pub record_filter: Option<RecordFilter>,
    pub json: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Build from any variable source. Invalid values are logged and ignored.
    pub fn from_source<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env_config = EnvConfig::default();

        if let Some(val) = get("DL_DEADLINE") {
            env_config.deadline = env_value("DL_DEADLINE", &val, parse_timeout_string);
        }

        if let Some(val) = get("DL_TIMEOUT") {
            env_config.timeout = env_value("DL_TIMEOUT", &val, parse_timeout_string);
        }

        if let Some(val) = get("DL_CONCURRENCY") {
            env_config.concurrency = env_value("DL_CONCURRENCY", &val, |v| {
                v.trim().parse::<usize>().ok().filter(|c| (1..=100).contains(c))
            });
        }

        if let Some(val) = get("DL_KIND") {
            env_config.kind = env_value("DL_KIND", &val, |v| v.parse().ok());
        }

        if let Some(val) = get("DL_RECORD_TYPES") {
            env_config.record_filter = env_value("DL_RECORD_TYPES", &val, |v| v.parse().ok());
        }

        if let Some(val) = get("DL_JSON") {
            env_config.json = env_value("DL_JSON", &val, parse_bool);
        }

        if let Some(path) = get("DL_CONFIG") {
            if !path.trim().is_empty() {
                tracing::debug!(value = %path, "Using DL_CONFIG");
                env_config.config = Some(path);
            }
        }

        env_config
    }

    /// Apply these settings on top of `base`.
    pub fn apply(&self, mut base: LookupConfig) -> LookupConfig {
        if let Some(timeout) = self.timeout {
            base = with_all_timeouts(base, timeout);
        }
        if let Some(deadline) = self.deadline {
            base = base.with_deadline(deadline);
        }
        if let Some(concurrency) = self.concurrency {
            base = base.with_concurrency(concurrency);
        }
        base
    }
}

/// Load configuration from the process environment.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_source(|key| env::var(key).ok())
}

fn env_value<T, F>(name: &str, raw: &str, parse: F) -> Option<T>
where
    F: FnOnce(&str) -> Option<T>,
{
    let parsed = parse(raw);
    if parsed.is_some() {
        tracing::debug!(value = %raw, "Using {}", name);
    } else {
        tracing::warn!(value = %raw, "Ignoring invalid {}", name);
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "500ms", "5s" or "2m".
///
/// A bare number is taken as seconds. Zero durations are rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let duration = if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }?;

    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}
