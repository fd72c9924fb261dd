//! WHOIS fallback orchestration.
//!
//! Registration data is resolved through an explicit state machine:
//!
//! ```text
//! Idle -> LibraryParsed -> DirectSocket -> IanaReferral -> Rdap -> Exhausted
//!              |                |               |           |
//!              +----------------+---------------+-----------+--> Succeeded
//! ```
//!
//! The first layer to succeed wins. Any failure moves to the next layer.
//! Profiles without a WHOIS host enter at `IanaReferral`; registries with no
//! WHOIS service at all enter at `Rdap`. A global deadline is checked before
//! each layer and also bounds the layer in flight, whose socket or HTTP
//! request is dropped when the deadline fires.

use crate::error::LookupError;
use crate::normalize::{is_not_found_response, normalize, ResponseSource};
use crate::protocols::iana::IanaResolver;
use crate::protocols::rdap::RdapClient;
use crate::protocols::registry::TldProfile;
use crate::protocols::whois::WhoisClient;
use crate::types::{AttemptOutcome, Layer, LookupConfig, ResolutionAttempt, WhoisRecord};
use std::time::Duration;
use tokio::time::Instant;

/// Position in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    /// Before routing; left through [`FallbackState::start`]
    Idle,
    /// About to run (or running) the given layer
    Attempt(Layer),
    /// Terminal: the given layer produced a record
    Succeeded(Layer),
    /// Terminal: every eligible layer failed or the deadline fired
    Exhausted,
}

impl FallbackState {
    /// The first state for a profile.
    pub fn entry(profile: &TldProfile) -> FallbackState {
        if profile.whois_absent {
            FallbackState::Attempt(Layer::Rdap)
        } else if profile.whois_host.is_none() {
            FallbackState::Attempt(Layer::IanaReferral)
        } else {
            FallbackState::Attempt(Layer::LibraryParsed)
        }
    }

    /// Leave `Idle` for the profile's entry layer. Other states are unchanged.
    pub fn start(self, profile: &TldProfile) -> FallbackState {
        match self {
            FallbackState::Idle => FallbackState::entry(profile),
            other => other,
        }
    }

    /// Transition on the outcome of the current layer.
    ///
    /// Terminal states and `Idle` are unchanged by any outcome.
    pub fn advance(self, outcome: AttemptOutcome) -> FallbackState {
        match self {
            FallbackState::Attempt(layer) if outcome == AttemptOutcome::Success => {
                FallbackState::Succeeded(layer)
            }
            FallbackState::Attempt(layer) => match next_layer(layer) {
                Some(next) => FallbackState::Attempt(next),
                None => FallbackState::Exhausted,
            },
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FallbackState::Succeeded(_) | FallbackState::Exhausted)
    }
}

fn next_layer(layer: Layer) -> Option<Layer> {
    match layer {
        Layer::LibraryParsed => Some(Layer::DirectSocket),
        Layer::DirectSocket => Some(Layer::IanaReferral),
        Layer::IanaReferral => Some(Layer::Rdap),
        Layer::Rdap => None,
    }
}

/// How much a WHOIS text response must contain to count as a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    /// At least one recognized field is required
    Strict,
    /// Any non-blank, non-"no match" body is kept as raw text
    Lenient,
}

impl ParsePolicy {
    /// Normalize `text` and decide whether it is a usable answer.
    ///
    /// # Errors
    ///
    /// * `NotFound` for blank bodies and registry "no match" replies
    /// * `ParseFailure` under `Strict` when no field was recognized
    pub fn apply(self, domain: &str, text: &str, layer: Layer) -> Result<WhoisRecord, LookupError> {
        // "Status: free" style replies parse as a status, so check them first
        if is_not_found_response(text) {
            let reply = text
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("empty response");
            return Err(LookupError::not_found(domain, reply));
        }

        let record = normalize(ResponseSource::Text(text), layer);
        if record.has_structured_data() {
            return Ok(record);
        }

        match self {
            ParsePolicy::Strict => Err(LookupError::parse_with_content(
                "No recognizable WHOIS fields",
                text.chars().take(512).collect::<String>(),
            )),
            ParsePolicy::Lenient => Ok(record),
        }
    }
}

/// Runs the fallback chain for one domain at a time.
#[derive(Clone)]
pub struct FallbackOrchestrator {
    whois: WhoisClient,
    iana: IanaResolver,
    rdap: RdapClient,
    whois_port: u16,
    deadline: Duration,
}

impl FallbackOrchestrator {
    /// Build the orchestrator and its transports from configuration.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let whois = WhoisClient::with_timeouts(config.connect_timeout, config.read_timeout);
        let iana = IanaResolver::new(whois.clone(), config.iana_host.clone(), config.whois_port);
        let rdap = RdapClient::with_config(config.rdap_timeout, config.rdap_fallback.clone())?;

        Ok(Self {
            whois,
            iana,
            rdap,
            whois_port: config.whois_port,
            deadline: config.deadline,
        })
    }

    /// Resolve registration data using the configured deadline.
    pub async fn resolve(
        &self,
        domain: &str,
        profile: &TldProfile,
    ) -> Result<WhoisRecord, LookupError> {
        self.resolve_with_trail(domain, profile, self.deadline).await.0
    }

    /// Resolve registration data and return every attempt made on the way.
    ///
    /// # Arguments
    ///
    /// * `domain` - Normalized domain name
    /// * `profile` - Routing profile for the domain
    /// * `budget` - Total time allowed across all layers
    ///
    /// # Returns
    ///
    /// The record from the first successful layer, or `Exhausted` carrying
    /// the number of layers tried, together with the attempt trail.
    pub async fn resolve_with_trail(
        &self,
        domain: &str,
        profile: &TldProfile,
        budget: Duration,
    ) -> (Result<WhoisRecord, LookupError>, Vec<ResolutionAttempt>) {
        let deadline = Instant::now() + budget;
        let mut attempts = Vec::new();
        let mut state = FallbackState::Idle.start(profile);

        while let FallbackState::Attempt(layer) = state {
            if Instant::now() >= deadline {
                tracing::debug!(domain, %layer, "Deadline reached before layer");
                state = FallbackState::Exhausted;
                break;
            }

            let started = Instant::now();
            let result =
                match tokio::time::timeout_at(deadline, self.attempt(layer, domain, profile)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(LookupError::timeout(format!("{} layer", layer), budget)),
                };
            let elapsed = started.elapsed();

            match result {
                Ok(record) => {
                    tracing::info!(domain, %layer, ?elapsed, "Registration data resolved");
                    attempts.push(ResolutionAttempt::success(
                        layer,
                        elapsed,
                        record.raw_text.clone(),
                    ));
                    return (Ok(record), attempts);
                }
                Err(e) => {
                    let outcome = e.outcome();
                    tracing::debug!(domain, %layer, %outcome, ?elapsed, error = %e, "Layer failed");
                    attempts.push(ResolutionAttempt::failure(layer, outcome, elapsed));
                    state = state.advance(outcome);
                }
            }
        }

        debug_assert_eq!(state, FallbackState::Exhausted);
        tracing::info!(
            domain,
            layers_tried = attempts.len(),
            "No registration data available"
        );
        (Err(LookupError::exhausted(domain, attempts.len())), attempts)
    }

    async fn attempt(
        &self,
        layer: Layer,
        domain: &str,
        profile: &TldProfile,
    ) -> Result<WhoisRecord, LookupError> {
        match layer {
            Layer::LibraryParsed => {
                let host = self.registry_host(domain, profile)?;
                let text = self
                    .whois
                    .query(host, self.whois_port, &profile.format_query(domain))
                    .await?;
                ParsePolicy::Strict.apply(domain, &text, layer)
            }
            Layer::DirectSocket => {
                let host = self.registry_host(domain, profile)?;
                let text = self.whois.query(host, self.whois_port, domain).await?;
                ParsePolicy::Lenient.apply(domain, &text, layer)
            }
            Layer::IanaReferral => {
                let referral = self.iana.resolve_referral(domain).await?;
                if profile
                    .whois_host
                    .as_deref()
                    .is_some_and(|host| host.eq_ignore_ascii_case(&referral))
                {
                    return Err(LookupError::not_found(
                        domain,
                        format!("IANA refers to {}, which was already tried", referral),
                    ));
                }
                let text = self.whois.query(&referral, self.whois_port, domain).await?;
                ParsePolicy::Lenient.apply(domain, &text, layer)
            }
            Layer::Rdap => {
                let json = self.rdap.query(domain, profile).await?;
                Ok(normalize(ResponseSource::Rdap(&json), layer))
            }
        }
    }

    fn registry_host<'a>(
        &self,
        domain: &str,
        profile: &'a TldProfile,
    ) -> Result<&'a str, LookupError> {
        profile
            .whois_host
            .as_deref()
            .ok_or_else(|| LookupError::not_found(domain, "No WHOIS host for this TLD"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(whois_host: Option<&str>, whois_absent: bool) -> TldProfile {
        TldProfile {
            suffix: "test".to_string(),
            whois_host: whois_host.map(String::from),
            whois_absent,
            ..TldProfile::generic()
        }
    }

    #[test]
    fn test_entry_states() {
        assert_eq!(
            FallbackState::entry(&profile(Some("whois.nic.test"), false)),
            FallbackState::Attempt(Layer::LibraryParsed)
        );
        assert_eq!(
            FallbackState::entry(&profile(None, false)),
            FallbackState::Attempt(Layer::IanaReferral)
        );
        assert_eq!(
            FallbackState::entry(&profile(None, true)),
            FallbackState::Attempt(Layer::Rdap)
        );
        assert_eq!(
            FallbackState::entry(&TldProfile::generic()),
            FallbackState::Attempt(Layer::IanaReferral)
        );
    }

    #[test]
    fn test_success_is_terminal_at_every_layer() {
        for layer in [
            Layer::LibraryParsed,
            Layer::DirectSocket,
            Layer::IanaReferral,
            Layer::Rdap,
        ] {
            let next = FallbackState::Attempt(layer).advance(AttemptOutcome::Success);
            assert_eq!(next, FallbackState::Succeeded(layer));
            assert!(next.is_terminal());
        }
    }

    #[test]
    fn test_every_failure_advances() {
        let failures = [
            AttemptOutcome::Timeout,
            AttemptOutcome::ConnectionRefused,
            AttemptOutcome::ParseFailure,
            AttemptOutcome::NotFound,
        ];

        for outcome in failures {
            assert_eq!(
                FallbackState::Attempt(Layer::LibraryParsed).advance(outcome),
                FallbackState::Attempt(Layer::DirectSocket)
            );
            assert_eq!(
                FallbackState::Attempt(Layer::DirectSocket).advance(outcome),
                FallbackState::Attempt(Layer::IanaReferral)
            );
            assert_eq!(
                FallbackState::Attempt(Layer::IanaReferral).advance(outcome),
                FallbackState::Attempt(Layer::Rdap)
            );
            assert_eq!(
                FallbackState::Attempt(Layer::Rdap).advance(outcome),
                FallbackState::Exhausted
            );
        }
    }

    #[test]
    fn test_terminal_and_idle_states_are_stable() {
        for state in [
            FallbackState::Idle,
            FallbackState::Exhausted,
            FallbackState::Succeeded(Layer::Rdap),
        ] {
            assert_eq!(state.advance(AttemptOutcome::Timeout), state);
            assert_eq!(state.advance(AttemptOutcome::Success), state);
        }
        assert!(!FallbackState::Idle.is_terminal());
    }

    #[test]
    fn test_start_leaves_idle_only() {
        let registry = profile(Some("whois.nic.test"), false);
        assert_eq!(
            FallbackState::Idle.start(&registry),
            FallbackState::Attempt(Layer::LibraryParsed)
        );
        assert_eq!(
            FallbackState::Idle.start(&profile(None, true)),
            FallbackState::Attempt(Layer::Rdap)
        );

        for state in [
            FallbackState::Attempt(Layer::DirectSocket),
            FallbackState::Succeeded(Layer::IanaReferral),
            FallbackState::Exhausted,
        ] {
            assert_eq!(state.start(&registry), state);
        }
    }

    #[test]
    fn test_status_free_replies_are_not_found() {
        let denic = "Domain: nonexistent-xyz123.de\nStatus: free\n";
        let eurid = "% The WHOIS service offered by EURid\n\nDomain: nonexistent-xyz123.eu\nStatus: AVAILABLE\n";

        for policy in [ParsePolicy::Strict, ParsePolicy::Lenient] {
            for (domain, body) in [("nonexistent-xyz123.de", denic), ("nonexistent-xyz123.eu", eurid)] {
                let err = policy
                    .apply(domain, body, Layer::LibraryParsed)
                    .unwrap_err();
                assert!(
                    matches!(err, LookupError::NotFound { .. }),
                    "{:?} accepted {:?}",
                    policy,
                    body
                );
            }
        }

        // A registered name's status still counts as data
        let record = ParsePolicy::Strict
            .apply(
                "example.de",
                "Domain: example.de\nStatus: connect\n",
                Layer::LibraryParsed,
            )
            .unwrap();
        assert!(record.status.contains("connect"));
    }

    #[test]
    fn test_strict_policy() {
        let record = ParsePolicy::Strict
            .apply(
                "example.com",
                "Registrar: Example Registrar\nExpiry Date: 2030-01-01",
                Layer::LibraryParsed,
            )
            .unwrap();
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar"));

        let err = ParsePolicy::Strict
            .apply("example.com", "Welcome to the registry", Layer::LibraryParsed)
            .unwrap_err();
        assert!(matches!(err, LookupError::ParseFailure { .. }));

        let err = ParsePolicy::Strict
            .apply("example.com", "No match for \"EXAMPLE.COM\".", Layer::LibraryParsed)
            .unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_lenient_policy() {
        let record = ParsePolicy::Lenient
            .apply("example.com", "Welcome to the registry", Layer::DirectSocket)
            .unwrap();
        assert!(!record.has_structured_data());
        assert_eq!(record.raw_text, "Welcome to the registry");
        assert_eq!(record.winning_layer, Layer::DirectSocket);

        for body in ["", "  \r\n ", "NOT FOUND", "No entries found for the selected source(s)."] {
            let err = ParsePolicy::Lenient
                .apply("example.com", body, Layer::DirectSocket)
                .unwrap_err();
            assert!(matches!(err, LookupError::NotFound { .. }), "body {:?}", body);
        }
    }
}
