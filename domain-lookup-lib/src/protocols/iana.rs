//! IANA referral discovery.
//!
//! `whois.iana.org` knows the authoritative WHOIS server for every delegated
//! TLD and answers with a `refer:` line:
//!
//! ```text
//! % IANA WHOIS server
//! refer:        whois.verisign-grs.com
//!
//! domain:       COM
//! ```

use super::whois::WhoisClient;
use crate::error::LookupError;

/// Resolves the authoritative WHOIS host for a domain through IANA.
#[derive(Debug, Clone)]
pub struct IanaResolver {
    client: WhoisClient,
    host: String,
    port: u16,
}

impl IanaResolver {
    /// Create a resolver that queries `host:port` through `client`.
    pub fn new(client: WhoisClient, host: impl Into<String>, port: u16) -> Self {
        Self {
            client,
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Ask IANA which server is authoritative for `domain`.
    ///
    /// # Errors
    ///
    /// Transport errors pass through unchanged; a response without a usable
    /// `refer:` line is `NotFound`.
    pub async fn resolve_referral(&self, domain: &str) -> Result<String, LookupError> {
        let response = self.client.query(&self.host, self.port, domain).await?;

        match parse_refer_line(&response) {
            Some(server) => {
                tracing::debug!(domain, referral = %server, "IANA referral found");
                Ok(server)
            }
            None => Err(LookupError::not_found(
                domain,
                format!("{} returned no referral", self.host),
            )),
        }
    }
}

/// Extract the value of the first `refer:` line.
///
/// The field name is matched case-insensitively and the value trimmed. Only
/// the first `refer:` line counts; if it is empty there is no referral.
pub fn parse_refer_line(response: &str) -> Option<String> {
    let line = response
        .lines()
        .map(str::trim)
        .find(|line| {
            line.get(..6)
                .is_some_and(|field| field.eq_ignore_ascii_case("refer:"))
        })?;

    let server = line[6..].trim();
    if server.is_empty() {
        None
    } else {
        Some(server.to_lowercase())
    }
}
