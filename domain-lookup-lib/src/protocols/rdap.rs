//! RDAP (Registration Data Access Protocol) client.
//!
//! RDAP is the structured JSON successor to WHOIS. It is the last layer of
//! the fallback chain and the only source for registries that never ran a
//! WHOIS service. Requests go to the registry's own base URL first and then
//! to the universal bootstrap redirector, which forwards to whichever server
//! IANA lists for the TLD.

use crate::error::LookupError;
use crate::protocols::registry::TldProfile;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

const RDAP_MEDIA_TYPE: &str = "application/rdap+json";

/// RDAP client bound to one HTTP connection pool.
#[derive(Clone)]
pub struct RdapClient {
    /// HTTP client for making RDAP requests
    http_client: reqwest::Client,
    /// Timeout for a single base URL, including one rate-limit retry
    timeout: Duration,
    /// Universal base tried after the profile's own endpoint
    fallback_base: Option<String>,
}

impl RdapClient {
    /// Create a new RDAP client with default settings (8s, rdap.org fallback).
    pub fn new() -> Result<Self, LookupError> {
        Self::with_config(
            Duration::from_secs(8),
            Some("https://rdap.org".to_string()),
        )
    }

    /// Create a new RDAP client with custom settings.
    pub fn with_config(
        timeout: Duration,
        fallback_base: Option<String>,
    ) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("domain-lookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::internal(format!("Failed to create RDAP HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            timeout,
            fallback_base: fallback_base
                .map(|b| b.trim().trim_end_matches('/').to_string())
                .filter(|b| !b.is_empty()),
        })
    }

    /// Fetch the RDAP domain object for `domain`.
    ///
    /// Tries the profile's base URL, then the fallback base. A 404 from the
    /// profile's own registry is authoritative and ends the search.
    ///
    /// # Errors
    ///
    /// * `NotFound` on HTTP 404 or when no RDAP base is known
    /// * `ParseFailure` when a 2xx body is not an RDAP domain object
    /// * `Timeout` / `ConnectionRefused` for transport failures and other statuses
    pub async fn query(&self, domain: &str, profile: &TldProfile) -> Result<Value, LookupError> {
        let mut bases: Vec<&str> = Vec::with_capacity(2);
        if let Some(base) = profile.rdap_base.as_deref() {
            bases.push(base);
        }
        if let Some(fallback) = self.fallback_base.as_deref() {
            if !bases.contains(&fallback) {
                bases.push(fallback);
            }
        }

        let mut last_error = LookupError::not_found(domain, "No RDAP service known for this TLD");

        for base in bases {
            let url = domain_url(base, domain);
            match self.fetch(&url, domain).await {
                Ok(json) => return Ok(json),
                Err(e @ LookupError::NotFound { .. }) => return Err(e),
                Err(e) => {
                    tracing::debug!(domain, url = %url, error = %e, "RDAP endpoint failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn fetch(&self, url: &str, domain: &str) -> Result<Value, LookupError> {
        match tokio::time::timeout(self.timeout, self.request(url, domain)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::timeout(
                format!("RDAP request to {}", url),
                self.timeout,
            )),
        }
    }

    async fn request(&self, url: &str, domain: &str) -> Result<Value, LookupError> {
        let mut response = self.send(url).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            // Rate limited, try once more after a short delay
            tokio::time::sleep(Duration::from_millis(500)).await;
            response = self.send(url).await?;
        }

        match response.status() {
            status if status.is_success() => {
                let body = response.text().await.map_err(|e| self.map_transport(url, e))?;
                parse_domain_object(&body)
            }
            StatusCode::NOT_FOUND => Err(LookupError::not_found(
                domain,
                format!("RDAP server returned 404 for {}", url),
            )),
            status => Err(LookupError::refused(
                url,
                format!("RDAP server returned HTTP {}", status),
            )),
        }
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, LookupError> {
        self.http_client
            .get(url)
            .header(ACCEPT, RDAP_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| self.map_transport(url, e))
    }

    fn map_transport(&self, url: &str, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::timeout(format!("RDAP request to {}", url), self.timeout)
        } else {
            err.into()
        }
    }
}

/// Build the domain lookup URL for an RDAP base.
pub fn domain_url(base: &str, domain: &str) -> String {
    format!("{}/domain/{}", base.trim_end_matches('/'), domain)
}

/// Parse a response body and check that it is an RDAP domain object.
///
/// Objects without `objectClassName` are accepted when they carry an
/// `ldhName`, which some older servers omit the class name for.
pub fn parse_domain_object(body: &str) -> Result<Value, LookupError> {
    let json: Value = serde_json::from_str(body).map_err(|e| {
        LookupError::parse_with_content(format!("RDAP body is not JSON: {}", e), truncate(body))
    })?;

    let is_domain = match json.get("objectClassName").and_then(Value::as_str) {
        Some(class) => class.eq_ignore_ascii_case("domain"),
        None => json.get("ldhName").and_then(Value::as_str).is_some(),
    };

    if is_domain {
        Ok(json)
    } else {
        Err(LookupError::parse_with_content(
            "RDAP body is not a domain object",
            truncate(body),
        ))
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(512).collect()
}
