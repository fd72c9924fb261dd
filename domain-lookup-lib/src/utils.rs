//! Utility functions for domain processing and validation.
//!
//! Domain names arrive from users in all shapes: pasted URLs, mixed case,
//! trailing dots, Unicode labels. Everything downstream (routing, WHOIS
//! query templates, DNS) expects one canonical ASCII form, produced here.

use crate::error::LookupError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// One or more LDH labels followed by an alphabetic (or punycode) TLD.
    static ref DOMAIN_PATTERN: Regex = Regex::new(
        r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*\.([a-z]{2,63}|xn--[a-z0-9-]{1,59})$"
    )
    .expect("domain pattern is valid");

    static ref SCHEME_PREFIX: Regex = Regex::new(r"^(?i)[a-z][a-z0-9+.-]*://").expect("scheme pattern is valid");
}

/// Maximum length of a full domain name in ASCII form.
const MAX_DOMAIN_LEN: usize = 253;

/// Normalize user input into a canonical lowercase ASCII domain.
///
/// Strips a URL scheme, any path or port, surrounding whitespace and a single
/// trailing dot, converts Unicode labels to punycode, then checks the label
/// syntax.
///
/// # Arguments
///
/// * `input` - Raw domain as typed or pasted by the user
///
/// # Returns
///
/// The normalized domain, or `UnsupportedDomain` if it cannot be a
/// registrable name.
pub fn normalize_domain(input: &str) -> Result<String, LookupError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LookupError::unsupported_domain(
            input,
            "Domain name cannot be empty",
        ));
    }

    let without_scheme = SCHEME_PREFIX.replace(trimmed, "");
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    // Drop userinfo and port, as in "user@example.com:8080"
    let host = host.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    let host = host.strip_suffix('.').unwrap_or(host);

    if host.is_empty() {
        return Err(LookupError::unsupported_domain(
            input,
            "No host name found in input",
        ));
    }

    let ascii = if host.is_ascii() {
        host.to_ascii_lowercase()
    } else {
        idna::domain_to_ascii(host).map_err(|_| {
            LookupError::unsupported_domain(input, "Invalid internationalized domain name")
        })?
    };

    if ascii.len() > MAX_DOMAIN_LEN {
        return Err(LookupError::unsupported_domain(
            input,
            "Domain name exceeds 253 characters",
        ));
    }

    if !DOMAIN_PATTERN.is_match(&ascii) {
        return Err(LookupError::unsupported_domain(
            input,
            "Invalid domain name format",
        ));
    }

    Ok(ascii)
}

/// Returns the label suffixes of a domain from longest to shortest.
///
/// `"a.b.co.uk"` yields `["a.b.co.uk", "b.co.uk", "co.uk", "uk"]`.
pub fn domain_suffixes(domain: &str) -> Vec<&str> {
    let mut suffixes = vec![domain];
    let mut rest = domain;
    while let Some(pos) = rest.find('.') {
        rest = &rest[pos + 1..];
        if rest.is_empty() {
            break;
        }
        suffixes.push(rest);
    }
    suffixes
}

/// Parse the contents of a domain list file.
///
/// One domain per line; blank lines and `#` comments (whole-line or trailing)
/// are ignored. Entries are returned as written, normalization happens later
/// so that invalid lines can be reported individually.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
