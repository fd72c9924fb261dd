//! WHOIS transport (RFC 3912).
//!
//! A WHOIS exchange is one TCP connection per query: send the query line,
//! read until the server closes. Registries are slow, flaky and occasionally
//! hostile, so connect and read are bounded independently and the response
//! size is capped.

use crate::error::LookupError;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Upper bound on the bytes kept from a single response.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Responses longer than this are real records, not rate-limit banners.
const BANNER_MAX_LEN: usize = 1024;

/// Raw WHOIS client.
///
/// Holds no connection state; every `query` opens and closes its own socket,
/// so one client can be shared freely across concurrent lookups.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    connect_timeout: Duration,
    read_timeout: Duration,
    max_response_bytes: usize,
}

impl WhoisClient {
    /// Create a new WHOIS client with default timeouts (5s connect, 10s read).
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Create a new WHOIS client with custom timeouts.
    pub fn with_timeouts(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
            ..Self::new()
        }
    }

    /// Change the response size cap.
    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max.max(1);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Send `query` to `host:port` and return the decoded response.
    ///
    /// # Arguments
    ///
    /// * `host` - WHOIS server host name or IP address
    /// * `port` - TCP port, normally 43
    /// * `query` - Query line without terminator; `\r\n` is appended
    ///
    /// # Errors
    ///
    /// * `Timeout` if the connect or the read phase exceeds its timeout
    /// * `ConnectionRefused` if the host cannot be reached or resets
    /// * `RateLimited` if the server answered with a rate-limit banner
    pub async fn query(&self, host: &str, port: u16, query: &str) -> Result<String, LookupError> {
        let target = format!("{}:{}", host, port);

        let mut stream =
            match tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port)))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(LookupError::refused(&target, e.to_string())),
                Err(_) => {
                    return Err(LookupError::timeout(
                        format!("connect to {}", target),
                        self.connect_timeout,
                    ))
                }
            };

        let exchange = async {
            stream.write_all(format!("{}\r\n", query).as_bytes()).await?;
            stream.flush().await?;
            read_capped(&mut stream, self.max_response_bytes).await
        };

        let bytes = match tokio::time::timeout(self.read_timeout, exchange).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                return Err(match LookupError::from(e) {
                    LookupError::Internal { message } => LookupError::refused(&target, message),
                    other => other,
                })
            }
            Err(_) => {
                return Err(LookupError::timeout(
                    format!("read from {}", target),
                    self.read_timeout,
                ))
            }
        };

        let text = decode_response(&bytes);

        if text.len() <= BANNER_MAX_LEN && is_rate_limited(&text) {
            let banner = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            return Err(LookupError::rate_limited(host, banner.trim()));
        }

        tracing::trace!(host, port, bytes = bytes.len(), "WHOIS response received");
        Ok(text)
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Read until EOF or until `max` bytes have been collected.
async fn read_capped(stream: &mut TcpStream, max: usize) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if data.len() >= max {
            data.truncate(max);
            break;
        }
    }

    Ok(data)
}

/// Decode a response as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// fallback never fails.
pub fn decode_response(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Check if a WHOIS response is a rate-limit banner.
pub fn is_rate_limited(output: &str) -> bool {
    let output_lower = output.to_lowercase();
    let rate_limit_patterns = [
        "rate limit exceeded",
        "too many requests",
        "try again later",
        "quota exceeded",
        "limit exceeded",
        "throttled",
        "rate-limited",
        "query rate",
    ];

    rate_limit_patterns
        .iter()
        .any(|pattern| output_lower.contains(pattern))
}
