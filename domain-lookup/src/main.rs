//! Domain Lookup CLI Application
//!
//! A command-line interface for WHOIS, RDAP and DNS lookups.
//! This CLI application provides a user-friendly interface to the domain-lookup-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_lookup_lib::{
    load_env_config, parse_domain_list, parse_timeout_string, ConfigManager, DomainQuery,
    EnvConfig, LookupConfig, LookupEngine, LookupError, LookupKind, LookupResult, RecordFilter,
    TLD_TABLE_VERSION,
};
use serde::Serialize;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Exit code when every lookup failed for a reason other than "no data".
const EXIT_LOOKUP_FAILED: i32 = 2;

/// CLI arguments for domain-lookup
#[derive(Parser, Debug)]
#[command(name = "domain-lookup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "WHOIS, RDAP and DNS lookups with automatic registry fallback")]
#[command(
    long_about = "Look up domain registration data and DNS records.\n\nRegistration data is resolved through the registry's WHOIS server, the server IANA refers to, and finally RDAP, under one overall deadline."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to look up (URLs are accepted and cleaned up)
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// Input file with domains (one per line, # comments allowed)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Domain Selection"
    )]
    pub file: Option<String>,

    /// What to look up: whois, dns or both
    #[arg(
        short = 'k',
        long = "kind",
        value_name = "KIND",
        help_heading = "Lookup"
    )]
    pub kind: Option<LookupKind>,

    /// DNS record types (comma-separated, e.g. A,MX,TXT; default: all)
    #[arg(
        short = 't',
        long = "type",
        value_name = "TYPES",
        help_heading = "Lookup"
    )]
    pub record_types: Option<RecordFilter>,

    /// Overall deadline per domain, WHOIS and DNS (e.g. 10s, 1500ms)
    #[arg(long = "deadline", value_name = "DURATION", help_heading = "Lookup")]
    pub deadline: Option<String>,

    /// Max concurrent lookups (default: 10, max: 100)
    #[arg(
        short = 'c',
        long = "concurrency",
        value_name = "N",
        help_heading = "Lookup"
    )]
    pub concurrency: Option<usize>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Detailed multi-line output per domain
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Include the raw registry response in text output
    #[arg(long = "raw", help_heading = "Output Format")]
    pub raw: bool,

    /// List the built-in WHOIS/RDAP routing table and exit
    #[arg(long = "list-tlds", help_heading = "Output Format")]
    pub list_tlds: bool,

    /// Use specific config file on top of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show detailed debug information and error messages
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Settings after merging config files, environment and CLI flags.
#[derive(Debug, Clone)]
struct Settings {
    config: LookupConfig,
    kind: LookupKind,
    filter: RecordFilter,
    json: bool,
    pretty: bool,
    raw: bool,
}

/// One line of JSON output.
#[derive(Serialize)]
#[serde(untagged)]
enum JsonOutcome<'a> {
    Resolved(&'a LookupResult),
    Failed {
        domain: &'a str,
        error: String,
        no_data: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_tracing(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    tracing::info!("domain-lookup v{} starting", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`/`-d`.
fn init_tracing(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("domain_lookup_lib={0},domain_lookup={0}", level))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // --list-tlds is self-contained, skip other validation
    if args.list_tlds {
        return Ok(());
    }

    if args.domains.is_empty() && args.file.is_none() {
        return Err("You must specify domain names or a file with --file".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    if let Some(deadline) = &args.deadline {
        if parse_timeout_string(deadline).is_none() {
            return Err(format!(
                "Invalid deadline '{}'. Use a format like '500ms', '10s', '2m'",
                deadline
            ));
        }
    }

    if args.kind == Some(LookupKind::Whois) && args.record_types.is_some() {
        return Err("--type only applies to dns or both lookups".to_string());
    }

    Ok(())
}

/// Main lookup logic. Returns the process exit code.
async fn run(args: Args) -> Result<i32, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let settings = resolve_settings(&args, &env_config)?;
    let engine = LookupEngine::new(settings.config.clone())?;

    if args.list_tlds {
        ui::print_tld_table(engine.table(), TLD_TABLE_VERSION);
        return Ok(0);
    }

    let inputs = collect_inputs(&args)?;

    // Invalid names are reported in place without a network call
    let prepared: Vec<Result<DomainQuery, LookupError>> = inputs
        .iter()
        .map(|raw| {
            DomainQuery::new(raw, settings.kind).map(|q| q.with_filter(settings.filter.clone()))
        })
        .collect();
    let queries: Vec<DomainQuery> = prepared.iter().filter_map(|p| p.clone().ok()).collect();

    if settings.pretty && !settings.json && queries.len() > 1 {
        ui::print_header(queries.len(), settings.kind, settings.config.concurrency);
    }

    let spinner = if !settings.json && queries.len() > 1 {
        ui::Spinner::start(format!("Looking up {} domains...", queries.len()))
    } else {
        None
    };

    let start_time = Instant::now();
    let mut results = engine.lookup_many(&queries).await.into_iter();
    let duration = start_time.elapsed();

    if let Some(s) = spinner {
        s.stop().await;
    }

    let outcomes: Vec<(String, Result<LookupResult, LookupError>)> = inputs
        .into_iter()
        .zip(prepared)
        .map(|(raw, prepared)| match prepared {
            Ok(query) => {
                let result = results.next().unwrap_or_else(|| {
                    Err(LookupError::internal("missing result for query"))
                });
                (query.domain().to_string(), result)
            }
            Err(e) => (raw, Err(e)),
        })
        .collect();

    if settings.json {
        display_json_results(&outcomes)?;
    } else {
        display_text_results(&outcomes, &settings, args.debug, duration);
    }

    Ok(exit_code(&outcomes))
}

/// Merge configuration sources.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (DL_*)
/// 3. Explicit config file (--config or DL_CONFIG)
/// 4. Local config file (./domain-lookup.toml)
/// 5. Global config file (~/.domain-lookup.toml)
/// 6. XDG config file (~/.config/domain-lookup/config.toml)
/// 7. Built-in defaults
fn resolve_settings(args: &Args, env_config: &EnvConfig) -> Result<Settings, LookupError> {
    let manager = ConfigManager::new(args.verbose);
    let explicit = args.config.as_deref().or(env_config.config.as_deref());
    if let Some(path) = explicit {
        tracing::info!(path, "Using explicit config file");
    }

    let file_config = manager.load_with_explicit(explicit)?;
    let mut config = file_config.apply(LookupConfig::default())?;
    config = env_config.apply(config);

    if let Some(deadline) = &args.deadline {
        let deadline = parse_timeout_string(deadline)
            .ok_or_else(|| LookupError::config(format!("Invalid deadline '{}'", deadline)))?;
        config = config.with_deadline(deadline);
    }
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }

    let kind = match args.kind.or(env_config.kind) {
        Some(kind) => kind,
        None => file_config.kind()?.unwrap_or_default(),
    };
    let filter = match args.record_types.clone().or_else(|| env_config.record_filter.clone()) {
        Some(filter) => filter,
        None => file_config.record_filter()?.unwrap_or_default(),
    };

    let output = file_config.output.clone().unwrap_or_default();

    Ok(Settings {
        config,
        kind,
        filter,
        json: args.json || env_config.json.or(output.json).unwrap_or(false),
        pretty: args.pretty || output.pretty.unwrap_or(false),
        raw: args.raw || output.raw.unwrap_or(false),
    })
}

/// Domains from the command line followed by the ones in `--file`.
fn collect_inputs(args: &Args) -> Result<Vec<String>, LookupError> {
    let mut inputs = args.domains.clone();

    if let Some(path) = &args.file {
        tracing::info!(path = %path, "Reading domains from file");
        inputs.extend(read_domains_from_file(path)?);
    }

    if inputs.is_empty() {
        return Err(LookupError::config("No domains to look up"));
    }

    Ok(inputs)
}

/// Read domains from a file
fn read_domains_from_file(file_path: &str) -> Result<Vec<String>, LookupError> {
    let content = std::fs::read_to_string(file_path)
        .map_err(|e| LookupError::file_error(file_path, e.to_string()))?;

    let domains = parse_domain_list(&content);
    if domains.is_empty() {
        return Err(LookupError::file_error(
            file_path,
            "No domains found in the file",
        ));
    }

    Ok(domains)
}

/// 0 if anything resolved or every failure was "no data".
fn exit_code(outcomes: &[(String, Result<LookupResult, LookupError>)]) -> i32 {
    let any_resolved = outcomes.iter().any(|(_, r)| r.is_ok());
    let all_no_data = outcomes
        .iter()
        .filter_map(|(_, r)| r.as_ref().err())
        .all(LookupError::is_no_data);

    if any_resolved || all_no_data {
        0
    } else {
        EXIT_LOOKUP_FAILED
    }
}

/// Display results in JSON format
fn display_json_results(
    outcomes: &[(String, Result<LookupResult, LookupError>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let entries: Vec<JsonOutcome<'_>> = outcomes
        .iter()
        .map(|(domain, result)| match result {
            Ok(result) => JsonOutcome::Resolved(result),
            Err(e) => JsonOutcome::Failed {
                domain,
                error: e.to_string(),
                no_data: e.is_no_data(),
            },
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Display results in human-readable text format
fn display_text_results(
    outcomes: &[(String, Result<LookupResult, LookupError>)],
    settings: &Settings,
    debug: bool,
    duration: std::time::Duration,
) {
    for (domain, result) in outcomes {
        match result {
            Ok(result) if settings.pretty => ui::print_result_block(result, settings.raw),
            Ok(result) => ui::print_result(result, settings.raw, debug),
            Err(e) => ui::print_failure(domain, e, debug),
        }
    }

    if outcomes.len() > 1 {
        let resolved = outcomes.iter().filter(|(_, r)| r.is_ok()).count();
        let no_data = outcomes
            .iter()
            .filter(|(_, r)| r.as_ref().is_err_and(LookupError::is_no_data))
            .count();
        println!();
        ui::print_summary(
            outcomes.len(),
            resolved,
            no_data,
            outcomes.len() - resolved - no_data,
            duration,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_test_args() -> Args {
        Args {
            domains: vec!["example.com".to_string()],
            file: None,
            kind: None,
            record_types: None,
            deadline: None,
            concurrency: None,
            json: false,
            pretty: false,
            raw: false,
            list_tlds: false,
            config: None,
            debug: false,
            verbose: false,
        }
    }

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_validate_args() {
        assert!(validate_args(&create_test_args()).is_ok());

        let args = Args {
            domains: vec![],
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            domains: vec![],
            list_tlds: true,
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());

        let args = Args {
            concurrency: Some(0),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            deadline: Some("soon".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            kind: Some(LookupKind::Whois),
            record_types: Some(RecordFilter::All),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_args_parse_kind_and_types() {
        let args = Args::try_parse_from([
            "domain-lookup",
            "example.com",
            "--kind",
            "dns",
            "-t",
            "a,MX",
            "--deadline",
            "1500ms",
        ])
        .unwrap();

        assert_eq!(args.kind, Some(LookupKind::Dns));
        assert_eq!(args.record_types.unwrap().types().len(), 2);
        assert_eq!(args.deadline.as_deref(), Some("1500ms"));

        assert!(Args::try_parse_from(["domain-lookup", "x.com", "--kind", "ftp"]).is_err());
        assert!(Args::try_parse_from(["domain-lookup", "x.com", "-t", "PTR"]).is_err());
    }

    #[test]
    fn test_settings_precedence() {
        let file = write_temp(
            "[defaults]\ndeadline = \"30s\"\nconcurrency = 7\nkind = \"dns\"\n\n[output]\npretty = true\n",
        );

        // File only
        let args = Args {
            config: Some(file.path().to_string_lossy().to_string()),
            ..create_test_args()
        };
        let settings = resolve_settings(&args, &EnvConfig::default()).unwrap();
        assert_eq!(settings.config.deadline, Duration::from_secs(30));
        assert_eq!(settings.config.concurrency, 7);
        assert_eq!(settings.kind, LookupKind::Dns);
        assert!(settings.pretty);
        assert!(!settings.json);

        // Environment beats file
        let env_config = EnvConfig {
            deadline: Some(Duration::from_secs(12)),
            kind: Some(LookupKind::Whois),
            json: Some(true),
            ..Default::default()
        };
        let settings = resolve_settings(&args, &env_config).unwrap();
        assert_eq!(settings.config.deadline, Duration::from_secs(12));
        assert_eq!(settings.kind, LookupKind::Whois);
        assert!(settings.json);

        // CLI beats environment
        let args = Args {
            deadline: Some("3s".to_string()),
            concurrency: Some(2),
            kind: Some(LookupKind::Both),
            ..args
        };
        let settings = resolve_settings(&args, &env_config).unwrap();
        assert_eq!(settings.config.deadline, Duration::from_secs(3));
        assert_eq!(settings.config.concurrency, 2);
        assert_eq!(settings.kind, LookupKind::Both);
    }

    #[test]
    fn test_explicit_config_errors_are_reported() {
        let args = Args {
            config: Some("/nonexistent/domain-lookup.toml".to_string()),
            ..create_test_args()
        };
        assert!(resolve_settings(&args, &EnvConfig::default()).is_err());

        let file = write_temp("[defaults]\nconcurrency = 500\n");
        let env_config = EnvConfig {
            config: Some(file.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        let err = resolve_settings(&create_test_args(), &env_config).unwrap_err();
        assert!(matches!(err, LookupError::ConfigError { .. }));
    }

    #[test]
    fn test_collect_inputs_from_file() {
        let file = write_temp("# watchlist\nexample.org\n\nexample.net  # inline\n");
        let args = Args {
            file: Some(file.path().to_string_lossy().to_string()),
            ..create_test_args()
        };

        let inputs = collect_inputs(&args).unwrap();
        assert_eq!(inputs, ["example.com", "example.org", "example.net"]);

        let empty = write_temp("# nothing here\n\n");
        let args = Args {
            file: Some(empty.path().to_string_lossy().to_string()),
            ..create_test_args()
        };
        assert!(matches!(
            collect_inputs(&args),
            Err(LookupError::FileError { .. })
        ));
    }

    #[test]
    fn test_exit_code() {
        type Outcome = (String, Result<LookupResult, LookupError>);
        let no_data: Outcome = ("a.test".to_string(), Err(LookupError::exhausted("a.test", 4)));
        let failed: Outcome = (
            "b.test".to_string(),
            Err(LookupError::resolver_unavailable("down")),
        );

        assert_eq!(exit_code(&[no_data.clone()]), 0);
        assert_eq!(exit_code(&[failed.clone()]), EXIT_LOOKUP_FAILED);
        assert_eq!(exit_code(&[no_data, failed]), EXIT_LOOKUP_FAILED);
    }
}
