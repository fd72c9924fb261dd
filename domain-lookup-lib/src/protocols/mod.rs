//! Network protocols and endpoint routing.
//!
//! WHOIS (TCP port 43), IANA referral discovery on top of WHOIS, RDAP over
//! HTTPS, and the table that decides which servers a domain is sent to.

/// Per-TLD WHOIS/RDAP endpoint table
pub mod registry;

/// WHOIS transport
pub mod whois;

/// IANA `refer:` discovery
pub mod iana;

/// RDAP client
pub mod rdap;

