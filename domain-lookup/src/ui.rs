//! Terminal display logic for the domain-lookup CLI.
//!
//! Compact one-line-per-domain output by default, detailed blocks with
//! `--pretty`, plus the spinner, summary bar and TLD listing. Uses only the
//! `console` crate.

use console::{pad_str, style, Alignment, Term};
use domain_lookup_lib::{
    DnsRecordSet, LookupError, LookupKind, LookupResult, TldTable, WhoisRecord,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const DOMAIN_WIDTH: usize = 30;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner, or return `None` when stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header(domain_count: usize, kind: LookupKind, concurrency: usize) {
    println!(
        "{} {} {}",
        style("domain-lookup").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "· {} lookup of {} domain{}",
            kind,
            domain_count,
            if domain_count == 1 { "" } else { "s" }
        ))
        .dim(),
    );
    println!("{}", style(format!("Concurrency: {}", concurrency)).dim());
    println!();
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Print one successful lookup in the compact layout.
pub fn print_result(result: &LookupResult, raw: bool, debug: bool) {
    let padded = pad_str(&result.domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    match &result.whois {
        Some(whois) => println!(
            "  {}  {}  {}",
            style(&padded).white(),
            style(format_whois_summary(whois)).green(),
            style(format!("[{}]", whois.winning_layer)).dim(),
        ),
        None => {
            let note = match &result.whois_error {
                Some(e) => style(format!("no registration data ({})", e)).yellow(),
                None => style("DNS".to_string()).cyan(),
            };
            println!("  {}  {}", style(&padded).white(), note);
        }
    }

    if let Some(dns) = &result.dns {
        for line in format_dns_lines(dns) {
            println!("      {}", line);
        }
    }
    if let Some(e) = &result.dns_error {
        println!("      {}", style(format!("DNS failed: {}", e)).yellow());
    }

    if raw {
        print_raw(result.whois.as_ref());
    }

    if debug {
        println!(
            "    {} Resolved in {}ms",
            style("└─").dim(),
            result.elapsed_ms
        );
    }
}

/// Print one successful lookup as a detailed block.
pub fn print_result_block(result: &LookupResult, raw: bool) {
    println!("{}", style(&result.domain).bold().underlined());

    if let Some(whois) = &result.whois {
        println!("  {}", style("Registration").yellow().bold());
        for (label, value) in whois_fields(whois) {
            println!("    {}  {}", style(format!("{:<12}", label)).dim(), value);
        }
        println!(
            "    {}  {}",
            style(format!("{:<12}", "Source")).dim(),
            whois.winning_layer
        );
    } else if let Some(e) = &result.whois_error {
        println!("  {}", style("Registration").yellow().bold());
        println!("    {}", style(e).yellow());
    }

    if let Some(dns) = &result.dns {
        println!("  {}", style("DNS").cyan().bold());
        let lines = format_dns_lines(dns);
        if lines.is_empty() {
            println!("    {}", style("no records").dim());
        }
        for line in lines {
            println!("    {}", line);
        }
    } else if let Some(e) = &result.dns_error {
        println!("  {}", style("DNS").cyan().bold());
        println!("    {}", style(e).yellow());
    }

    if raw {
        print_raw(result.whois.as_ref());
    }

    println!(
        "  {}",
        style(format!(
            "queried {} in {}ms",
            result.queried_at.format("%Y-%m-%d %H:%M:%S UTC"),
            result.elapsed_ms
        ))
        .dim()
    );
    println!();
}

/// Print a failed lookup.
pub fn print_failure(domain: &str, error: &LookupError, debug: bool) {
    let padded = pad_str(domain, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    if error.is_no_data() {
        println!(
            "  {}  {}  {}",
            style(&padded).white(),
            style("NO DATA").yellow().bold(),
            style(brief_error(error)).dim(),
        );
    } else {
        println!(
            "  {}  {}  {}",
            style(&padded).white(),
            style("ERROR").red().bold(),
            style(brief_error(error)).dim(),
        );
    }

    if debug {
        println!("    {} {}", style("└─").dim(), error);
    }
}

fn print_raw(whois: Option<&WhoisRecord>) {
    if let Some(whois) = whois {
        println!("  {}", style("Raw response").dim());
        for line in whois.raw_text.lines() {
            println!("    {}", line);
        }
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(total: usize, resolved: usize, no_data: usize, failed: usize, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} resolved", resolved)).green(),
        style("|").dim(),
        style(format!("{} no data", no_data)).yellow(),
        style("|").dim(),
        style(format!("{} failed", failed)).red(),
    );
}

/// Print every suffix in the routing table with its endpoints.
pub fn print_tld_table(table: &TldTable, version: &str) {
    println!();
    println!(
        "{} {}",
        style("Routing table").yellow().bold(),
        style(format!("(version {}, {} suffixes)", version, table.len())).dim()
    );
    println!();

    for suffix in table.suffixes() {
        if let Some(profile) = table.get(suffix) {
            let whois = if profile.whois_absent {
                style("no WHOIS".to_string()).dim()
            } else {
                style(profile.whois_host.clone().unwrap_or_else(|| "(IANA referral)".to_string()))
                    .white()
            };
            let rdap = profile.rdap_base.as_deref().unwrap_or("-");
            println!(
                "  {}  {}  {}",
                style(format!("{:<14}", suffix)).green().bold(),
                pad_str(&whois.to_string(), 32, Alignment::Left, Some("..")),
                style(rdap).dim()
            );
        }
    }
    println!();
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Registrar and expiry in one short string.
pub fn format_whois_summary(whois: &WhoisRecord) -> String {
    let mut parts = Vec::new();
    if let Some(registrar) = &whois.registrar {
        parts.push(registrar.clone());
    }
    if let Some(expires) = whois.expiration_date {
        parts.push(format!("expires {}", expires.format("%Y-%m-%d")));
    }
    if parts.is_empty() {
        if whois.has_structured_data() {
            "registered".to_string()
        } else {
            "raw response only".to_string()
        }
    } else {
        parts.join(", ")
    }
}

/// Labelled registration fields, skipping the ones that are absent.
pub fn whois_fields(whois: &WhoisRecord) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    let date = |d: &chrono::DateTime<chrono::Utc>| d.format("%Y-%m-%d %H:%M UTC").to_string();

    if let Some(v) = &whois.registrar {
        fields.push(("Registrar", v.clone()));
    }
    if let Some(v) = &whois.registrant {
        fields.push(("Registrant", v.clone()));
    }
    if let Some(v) = &whois.creation_date {
        fields.push(("Created", date(v)));
    }
    if let Some(v) = &whois.updated_date {
        fields.push(("Updated", date(v)));
    }
    if let Some(v) = &whois.expiration_date {
        fields.push(("Expires", date(v)));
    }
    if !whois.status.is_empty() {
        fields.push((
            "Status",
            whois.status.iter().cloned().collect::<Vec<_>>().join(", "),
        ));
    }
    if !whois.name_servers.is_empty() {
        fields.push(("Nameservers", whois.name_servers.join(", ")));
    }
    if let Some(v) = &whois.dnssec {
        fields.push(("DNSSEC", v.clone()));
    }
    if !whois.emails.is_empty() {
        fields.push(("Contacts", whois.emails.join(", ")));
    }
    fields
}

/// One "TYPE  value" line per answer, in record-type order.
pub fn format_dns_lines(dns: &DnsRecordSet) -> Vec<String> {
    dns.records
        .iter()
        .flat_map(|(record_type, answers)| {
            answers
                .iter()
                .map(move |answer| format!("{:<6} {}", record_type.as_str(), answer))
        })
        .collect()
}

/// A short reason for a failed lookup.
pub fn brief_error(error: &LookupError) -> String {
    match error {
        LookupError::Exhausted { layers_tried, .. } => {
            format!("(no registration data, {} layers tried)", layers_tried)
        }
        LookupError::UnsupportedDomain { reason, .. } => format!("(invalid domain: {})", reason),
        LookupError::NotFound { .. } => "(not found)".to_string(),
        LookupError::Timeout { .. } => "(timeout)".to_string(),
        LookupError::ConnectionRefused { .. } | LookupError::RateLimited { .. } => {
            "(network error)".to_string()
        }
        LookupError::ResolverUnavailable { .. } => "(DNS resolver unavailable)".to_string(),
        LookupError::ParseFailure { .. } => "(parsing error)".to_string(),
        _ => "(error)".to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain_lookup_lib::{DnsRecordType, Layer};

    fn record() -> WhoisRecord {
        WhoisRecord {
            registrar: Some("Example Registrar".to_string()),
            expiration_date: Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
            ..WhoisRecord::raw_only("Registrar: Example Registrar", Layer::LibraryParsed)
        }
    }

    #[test]
    fn test_format_whois_summary() {
        assert_eq!(
            format_whois_summary(&record()),
            "Example Registrar, expires 2030-01-01"
        );
        assert_eq!(
            format_whois_summary(&WhoisRecord::raw_only("banner", Layer::DirectSocket)),
            "raw response only"
        );
    }

    #[test]
    fn test_whois_fields_skip_absent() {
        let fields = whois_fields(&record());
        let labels: Vec<&str> = fields.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, ["Registrar", "Expires"]);
        assert_eq!(fields[1].1, "2030-01-01 00:00 UTC");
    }

    #[test]
    fn test_format_dns_lines() {
        let mut dns = DnsRecordSet::new();
        dns.insert(DnsRecordType::MX, vec!["10 mail.example.com.".to_string()]);
        dns.insert(
            DnsRecordType::A,
            vec!["192.0.2.1".to_string(), "192.0.2.2".to_string()],
        );
        dns.insert(DnsRecordType::TXT, Vec::new());

        assert_eq!(
            format_dns_lines(&dns),
            [
                "A      192.0.2.1",
                "A      192.0.2.2",
                "MX     10 mail.example.com."
            ]
        );
    }

    #[test]
    fn test_brief_error() {
        assert_eq!(
            brief_error(&LookupError::exhausted("a.com", 4)),
            "(no registration data, 4 layers tried)"
        );
        assert_eq!(
            brief_error(&LookupError::timeout("x", Duration::from_secs(1))),
            "(timeout)"
        );
        assert_eq!(
            brief_error(&LookupError::resolver_unavailable("down")),
            "(DNS resolver unavailable)"
        );
    }
}
