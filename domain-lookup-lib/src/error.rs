//! Error handling for domain resolution.
//!
//! Layer-level failures (`Timeout`, `ConnectionRefused`, `ParseFailure`,
//! `NotFound`) are produced by the individual backends and absorbed by the
//! fallback orchestrator. Only `Exhausted`, `UnsupportedDomain` and the DNS
//! `ResolverUnavailable` normally cross the engine boundary.

use crate::types::AttemptOutcome;
use std::fmt;
use std::time::Duration;

/// Main error type for lookup operations.
#[derive(Debug, Clone)]
pub enum LookupError {
    /// Malformed domain name, rejected before any network call
    UnsupportedDomain { domain: String, reason: String },

    /// A connect, read or HTTP operation exceeded its timeout
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The backend could not be reached or refused to serve the query
    ConnectionRefused { target: String, message: String },

    /// Authoritative "no data" (unregistered domain, no referral, HTTP 404)
    NotFound { domain: String, message: String },

    /// The backend answered but the content was unrecognizable
    ParseFailure {
        message: String,
        content: Option<String>,
    },

    /// Server answered with a rate-limit banner
    RateLimited { service: String, message: String },

    /// Every eligible layer failed, or the global deadline fired first
    Exhausted { domain: String, layers_tried: usize },

    /// The DNS resolver itself is unreachable
    ResolverUnavailable { message: String },

    /// Configuration errors (invalid settings, bad TOML, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading configuration or domain lists
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl LookupError {
    /// Create a new unsupported-domain error.
    pub fn unsupported_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::UnsupportedDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new connection-refused error.
    pub fn refused<T: Into<String>, M: Into<String>>(target: T, message: M) -> Self {
        Self::ConnectionRefused {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a new not-found error.
    pub fn not_found<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::NotFound {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new parse failure.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseFailure {
            message: message.into(),
            content: None,
        }
    }

    /// Create a new parse failure keeping the offending content.
    pub fn parse_with_content<M: Into<String>, C: Into<String>>(message: M, content: C) -> Self {
        Self::ParseFailure {
            message: message.into(),
            content: Some(content.into()),
        }
    }

    /// Create a new rate-limit error.
    pub fn rate_limited<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::RateLimited {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new exhausted error.
    pub fn exhausted<D: Into<String>>(domain: D, layers_tried: usize) -> Self {
        Self::Exhausted {
            domain: domain.into(),
            layers_tried,
        }
    }

    /// Create a new resolver-unavailable error.
    pub fn resolver_unavailable<M: Into<String>>(message: M) -> Self {
        Self::ResolverUnavailable {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map this error onto the outcome recorded for a single layer attempt.
    ///
    /// Rate limiting counts as a refusal: the server is reachable but will not
    /// serve us right now, so the next layer should be tried.
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Timeout { .. } => AttemptOutcome::Timeout,
            Self::NotFound { .. } => AttemptOutcome::NotFound,
            Self::ParseFailure { .. } => AttemptOutcome::ParseFailure,
            Self::ConnectionRefused { .. }
            | Self::RateLimited { .. }
            | Self::ResolverUnavailable { .. } => AttemptOutcome::ConnectionRefused,
            _ => AttemptOutcome::ParseFailure,
        }
    }

    /// Whether a client-facing layer should present this as "no data available"
    /// rather than as a server error.
    ///
    /// True for `Exhausted`, `UnsupportedDomain` and a registry's own
    /// `NotFound` reply; a timeout or refusal is never "no data".
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            Self::Exhausted { .. } | Self::UnsupportedDomain { .. } | Self::NotFound { .. }
        )
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDomain { domain, reason } => {
                write!(f, "Unsupported domain '{}': {}", domain, reason)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::ConnectionRefused { target, message } => {
                write!(f, "Connection to {} refused: {}", target, message)
            }
            Self::NotFound { domain, message } => {
                write!(f, "No data for '{}': {}", domain, message)
            }
            Self::ParseFailure { message, content: _ } => {
                write!(f, "Parse failure: {}", message)
            }
            Self::RateLimited { service, message } => {
                write!(f, "Rate limited by {}: {}", service, message)
            }
            Self::Exhausted {
                domain,
                layers_tried,
            } => {
                write!(
                    f,
                    "No registration data available for '{}' ({} layer{} tried)",
                    domain,
                    layers_tried,
                    if *layers_tried == 1 { "" } else { "s" }
                )
            }
            Self::ResolverUnavailable { message } => {
                write!(f, "DNS resolver unavailable: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for LookupError {}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        let target = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "RDAP server".to_string());
        if err.is_timeout() {
            Self::timeout(format!("HTTP request to {}", target), Duration::ZERO)
        } else if err.is_decode() {
            Self::parse(format!("Response body could not be decoded: {}", err))
        } else {
            Self::refused(target, err.to_string())
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailure {
            message: format!("JSON parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<std::io::Error> for LookupError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => {
                Self::timeout(format!("socket I/O: {}", err), Duration::ZERO)
            }
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::AddrNotAvailable => Self::refused("socket", err.to_string()),
            _ => Self::Internal {
                message: format!("I/O error: {}", err),
            },
        }
    }
}
