//! Response normalization.
//!
//! Turns registry output, either free-form WHOIS text or an RDAP JSON
//! domain object, into a canonical [`WhoisRecord`]. Normalization never
//! fails: whatever cannot be recognized is simply left out, and a record with
//! only the raw text and the winning layer is a valid result.

use crate::types::{Layer, WhoisRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;

/// Maximum number of contact e-mails kept on a record.
pub const MAX_EMAILS: usize = 5;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid");

    /// JPRS style: `a. [Domain Name]   EXAMPLE.JP`
    static ref BRACKET_FIELD: Regex =
        Regex::new(r"^(?:[a-z]\.\s*)?\[([^\]]+)\]\s*(.*)$").expect("bracket pattern is valid");
}

/// The input to [`normalize`].
#[derive(Debug, Clone, Copy)]
pub enum ResponseSource<'a> {
    /// WHOIS text as received
    Text(&'a str),
    /// RDAP domain object
    Rdap(&'a Value),
}

/// Record attributes the text parser knows synonyms for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Registrar,
    Registrant,
    Created,
    Expires,
    Updated,
    NameServer,
    Status,
    Dnssec,
}

/// Field name synonyms, compared after lowercasing and whitespace collapsing.
const SYNONYMS: &[(Field, &[&str])] = &[
    (
        Field::Registrar,
        &[
            "registrar",
            "sponsoring registrar",
            "registrar name",
            "registrar_name",
            "registrar organization",
        ],
    ),
    (
        Field::Registrant,
        &[
            "registrant organization",
            "registrant organisation",
            "registrant",
            "registrant name",
            "org",
        ],
    ),
    (
        Field::Created,
        &[
            "creation date",
            "created date",
            "created",
            "created on",
            "registration date",
            "registration time",
            "domain registration date",
            "registered on",
            "registered",
            "domain record activated",
        ],
    ),
    (
        Field::Expires,
        &[
            "registry expiry date",
            "registrar registration expiration date",
            "expiry date",
            "expiration date",
            "expiration time",
            "expire date",
            "expires",
            "expires on",
            "paid-till",
            "renewal date",
        ],
    ),
    (
        Field::Updated,
        &[
            "updated date",
            "last updated",
            "last update",
            "last-update",
            "last modified",
            "modified",
            "changed",
        ],
    ),
    (
        Field::NameServer,
        &[
            "name server",
            "name servers",
            "nameserver",
            "nameservers",
            "nserver",
            "dns",
        ],
    ),
    (Field::Status, &["domain status", "status"]),
    (Field::Dnssec, &["dnssec"]),
];

/// Not-found phrases used by registries for unregistered names.
const NOT_FOUND_INDICATORS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "no information available",
    "no matching record",
    "no object found",
    "object does not exist",
    "status: free",
    "status: available",
    "this domain name has not been registered",
];

/// Normalize a registry response into a [`WhoisRecord`].
pub fn normalize(source: ResponseSource<'_>, layer: Layer) -> WhoisRecord {
    match source {
        ResponseSource::Text(text) => normalize_text(text, layer),
        ResponseSource::Rdap(json) => normalize_rdap(json, layer),
    }
}

/// Whether a WHOIS body is blank or one of the registry "no match" replies.
pub fn is_not_found_response(text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    NOT_FOUND_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
}

/// Parse free-form WHOIS text.
///
/// Lines are `key: value` pairs. A key with an empty value opens a section
/// whose more-indented continuation lines are values for that key, which is
/// how Nominet and a few other registries lay out their output. Comment
/// lines (`%`, `#`, `>>>`) are skipped.
pub fn normalize_text(text: &str, layer: Layer) -> WhoisRecord {
    let mut record = WhoisRecord::raw_only(text, layer);

    for (key, value) in extract_pairs(text) {
        let Some(field) = classify_key(&key) else {
            continue;
        };
        apply_text_field(&mut record, field, &value);
    }

    record.emails = collect_emails(EMAIL_PATTERN.find_iter(text).map(|m| m.as_str()));
    record
}

fn extract_pairs(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    // (key, indentation of the header line)
    let mut section: Option<(String, usize)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            section = None;
            continue;
        }
        if trimmed.starts_with('%') || trimmed.starts_with('#') || trimmed.starts_with(">>>") {
            continue;
        }

        let indent = line.len() - line.trim_start().len();

        if let Some((section_key, section_indent)) = &section {
            if indent > *section_indent {
                match split_pair(trimmed) {
                    Some((key, value)) if classify_key(&key).is_some() => {
                        pairs.push((key, value));
                    }
                    _ => pairs.push((section_key.clone(), trimmed.to_string())),
                }
                continue;
            }
            section = None;
        }

        if let Some(caps) = BRACKET_FIELD.captures(trimmed) {
            let key = normalize_key(&caps[1]);
            let value = caps[2].trim().to_string();
            if !value.is_empty() {
                pairs.push((key, value));
            }
            continue;
        }

        if let Some((key, value)) = split_pair(trimmed) {
            if value.is_empty() {
                section = Some((key, indent));
            } else {
                pairs.push((key, value));
            }
        }
    }

    pairs
}

fn split_pair(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = normalize_key(key);
    if key.is_empty() || key.len() > 64 {
        return None;
    }
    Some((key, value.trim().to_string()))
}

fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('.')
        .to_lowercase()
}

fn classify_key(key: &str) -> Option<Field> {
    SYNONYMS
        .iter()
        .find(|(_, names)| names.contains(&key))
        .map(|(field, _)| *field)
        .or_else(|| {
            // "Expiration Date", "Domain Expiration Date", "Expiry date" ...
            (key.starts_with("expir") && key.ends_with("date")).then_some(Field::Expires)
        })
}

fn apply_text_field(record: &mut WhoisRecord, field: Field, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    match field {
        Field::Registrar => {
            record.registrar.get_or_insert_with(|| value.to_string());
        }
        Field::Registrant => {
            record.registrant.get_or_insert_with(|| value.to_string());
        }
        Field::Created => {
            if record.creation_date.is_none() {
                record.creation_date = parse_date(value);
            }
        }
        Field::Expires => {
            if record.expiration_date.is_none() {
                record.expiration_date = parse_date(value);
            }
        }
        Field::Updated => {
            if record.updated_date.is_none() {
                record.updated_date = parse_date(value);
            }
        }
        Field::NameServer => {
            if let Some(host) = value.split_whitespace().next() {
                push_nameserver(&mut record.name_servers, host);
            }
        }
        Field::Status => {
            let status = status_code(value);
            if !status.is_empty() {
                record.status.insert(status.to_string());
            }
        }
        Field::Dnssec => {
            record.dnssec.get_or_insert_with(|| value.to_lowercase());
        }
    }
}

/// Drop the ICANN explanation link that follows EPP status codes.
fn status_code(value: &str) -> &str {
    let end = [" http", " ("]
        .iter()
        .filter_map(|marker| value.find(marker))
        .min()
        .unwrap_or(value.len());
    value[..end].trim()
}

fn push_nameserver(name_servers: &mut Vec<String>, host: &str) {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    if !host.is_empty() && !name_servers.contains(&host) {
        name_servers.push(host);
    }
}

fn collect_emails<'a>(candidates: impl Iterator<Item = &'a str>) -> Vec<String> {
    candidates
        .map(|e| e.trim_end_matches('.').to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_EMAILS)
        .collect()
}

/// Date-time formats without an offset; values are taken as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

/// Date-time formats carrying an explicit offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Date-only formats; values become midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%B %d %Y",
];

/// Parse a registry date, trying each known format in order.
///
/// First match wins. A trailing zone label such as `(JST)` is ignored. When
/// the full value does not parse, its first whitespace-separated token is
/// tried.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let value = match value.rfind(" (") {
        Some(pos) if value.ends_with(')') => value[..pos].trim_end(),
        _ => value,
    };
    let value = value
        .strip_suffix(" UTC")
        .or_else(|| value.strip_suffix(" GMT"))
        .unwrap_or(value)
        .trim();
    if value.is_empty() {
        return None;
    }

    parse_date_exact(value).or_else(|| {
        let first = value.split_whitespace().next()?;
        if first == value {
            None
        } else {
            parse_date_exact(first)
        }
    })
}

fn parse_date_exact(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Extract registration data from an RDAP domain object.
///
/// The raw text of the resulting record is the pretty-printed JSON.
pub fn normalize_rdap(json: &Value, layer: Layer) -> WhoisRecord {
    let raw = serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string());
    let mut record = WhoisRecord::raw_only(raw, layer);

    let entities = json
        .get("entities")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for entity in entities {
        if has_role(entity, "registrar") && record.registrar.is_none() {
            record.registrar = extract_vcard_field(entity, "fn")
                .or_else(|| extract_entity_identifier(entity));
        }
        if has_role(entity, "registrant") && record.registrant.is_none() {
            record.registrant = extract_vcard_field(entity, "org")
                .or_else(|| extract_vcard_field(entity, "fn"));
        }
    }

    let mut last_changed = None;
    let mut database_updated = None;
    if let Some(events) = json.get("events").and_then(Value::as_array) {
        for event in events {
            let (Some(action), Some(date)) = (
                event.get("eventAction").and_then(Value::as_str),
                event.get("eventDate").and_then(Value::as_str),
            ) else {
                continue;
            };
            match action {
                "registration" => record.creation_date = parse_date(date),
                "expiration" => record.expiration_date = parse_date(date),
                "last changed" => last_changed = parse_date(date),
                "last update of RDAP database" => database_updated = parse_date(date),
                _ => {}
            }
        }
    }
    record.updated_date = last_changed.or(database_updated);

    if let Some(statuses) = json.get("status").and_then(Value::as_array) {
        record.status = statuses
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }

    if let Some(nameservers) = json.get("nameservers").and_then(Value::as_array) {
        for nameserver in nameservers {
            if let Some(name) = nameserver.get("ldhName").and_then(Value::as_str) {
                push_nameserver(&mut record.name_servers, name);
            }
        }
    }

    record.dnssec = json
        .get("secureDNS")
        .and_then(|s| s.get("delegationSigned"))
        .and_then(Value::as_bool)
        .map(|signed| if signed { "signed" } else { "unsigned" }.to_string());

    let mut emails = Vec::new();
    collect_entity_emails(entities, &mut emails);
    record.emails = collect_emails(emails.iter().map(String::as_str));

    record
}

fn has_role(entity: &Value, role: &str) -> bool {
    entity
        .get("roles")
        .and_then(Value::as_array)
        .is_some_and(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
}

/// Iterate the property arrays of an entity's jCard.
fn vcard_properties(entity: &Value) -> impl Iterator<Item = &Vec<Value>> {
    entity
        .get("vcardArray")
        .and_then(Value::as_array)
        .and_then(|a| a.get(1))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
}

/// Value of the first jCard property named `name` (e.g. `fn`, `org`, `email`).
fn extract_vcard_field(entity: &Value, name: &str) -> Option<String> {
    vcard_properties(entity)
        .filter(|item| item.len() >= 4)
        .find(|item| item.first().and_then(Value::as_str) == Some(name))
        .and_then(|item| item.get(3))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Registrar identification when no name is published.
fn extract_entity_identifier(entity: &Value) -> Option<String> {
    if let Some(id) = entity
        .get("publicIds")
        .and_then(Value::as_array)
        .and_then(|ids| ids.first())
        .and_then(|id| id.get("identifier"))
        .and_then(Value::as_str)
    {
        return Some(format!("Registrar ID: {}", id));
    }

    entity
        .get("handle")
        .and_then(Value::as_str)
        .map(String::from)
}

fn collect_entity_emails(entities: &[Value], out: &mut Vec<String>) {
    for entity in entities {
        for item in vcard_properties(entity) {
            if item.first().and_then(Value::as_str) == Some("email") {
                if let Some(email) = item.get(3).and_then(Value::as_str) {
                    out.push(email.to_string());
                }
            }
        }
        if let Some(nested) = entity.get("entities").and_then(Value::as_array) {
            collect_entity_emails(nested, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_simple_registry_response() {
        let record = normalize_text(
            "Registrar: Example Registrar\nExpiry Date: 2030-01-01",
            Layer::LibraryParsed,
        );
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar"));
        assert_eq!(record.expiration_date, Some(utc(2030, 1, 1)));
        assert_eq!(record.winning_layer, Layer::LibraryParsed);
    }

    #[test]
    fn test_every_synonym_is_recognized() {
        for (field, names) in SYNONYMS {
            for name in *names {
                let value = match field {
                    Field::Created | Field::Expires | Field::Updated => "2021-03-04",
                    Field::NameServer => "ns1.example.net",
                    _ => "value",
                };
                let text = format!("{}: {}", name, value);
                let record = normalize_text(&text, Layer::DirectSocket);
                let found = match field {
                    Field::Registrar => record.registrar.is_some(),
                    Field::Registrant => record.registrant.is_some(),
                    Field::Created => record.creation_date == Some(utc(2021, 3, 4)),
                    Field::Expires => record.expiration_date == Some(utc(2021, 3, 4)),
                    Field::Updated => record.updated_date == Some(utc(2021, 3, 4)),
                    Field::NameServer => record.name_servers == vec!["ns1.example.net"],
                    Field::Status => record.status.contains("value"),
                    Field::Dnssec => record.dnssec.as_deref() == Some("value"),
                };
                assert!(found, "synonym '{}' was not recognized", name);
            }
        }
    }

    #[test]
    fn test_verisign_style_response() {
        let text = "   Domain Name: EXAMPLE.COM\r\n\
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN\r\n\
   Registrar WHOIS Server: whois.iana.org\r\n\
   Updated Date: 2024-08-14T07:01:34Z\r\n\
   Creation Date: 1995-08-14T04:00:00Z\r\n\
   Registry Expiry Date: 2025-08-13T04:00:00Z\r\n\
   Registrar: RESERVED-Internet Assigned Numbers Authority\r\n\
   Registrar Abuse Contact Email: abuse@iana.org\r\n\
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited\r\n\
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r\n\
   Name Server: A.IANA-SERVERS.NET\r\n\
   Name Server: B.IANA-SERVERS.NET\r\n\
   Name Server: a.iana-servers.net.\r\n\
   DNSSEC: signedDelegation\r\n\
>>> Last update of whois database: 2024-10-01T00:00:00Z <<<\r\n";

        let record = normalize_text(text, Layer::LibraryParsed);
        assert_eq!(
            record.registrar.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(
            record.creation_date,
            Some(Utc.with_ymd_and_hms(1995, 8, 14, 4, 0, 0).unwrap())
        );
        assert_eq!(
            record.updated_date,
            Some(Utc.with_ymd_and_hms(2024, 8, 14, 7, 1, 34).unwrap())
        );
        assert_eq!(
            record.name_servers,
            vec!["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert_eq!(record.status.len(), 2);
        assert!(record.status.contains("clientDeleteProhibited"));
        assert_eq!(record.dnssec.as_deref(), Some("signeddelegation"));
        assert_eq!(record.emails, vec!["abuse@iana.org"]);
        assert_eq!(record.raw_text, text);
    }

    #[test]
    fn test_nominet_section_response() {
        let text = "\n    Domain name:\n        example.co.uk\n\n    Registrar:\n        Example Registrar Ltd [Tag = EXAMPLE]\n        URL: https://registrar.example\n\n    Relevant dates:\n        Registered on: 11-Feb-1999\n        Expiry date:  14-Feb-2026\n        Last updated:  10-Jan-2024\n\n    Registration status:\n        Registered until expiry date.\n\n    Name servers:\n        ns1.example.net\n        ns2.example.net   192.0.2.1\n\n";

        let record = normalize_text(text, Layer::DirectSocket);
        assert_eq!(
            record.registrar.as_deref(),
            Some("Example Registrar Ltd [Tag = EXAMPLE]")
        );
        assert_eq!(record.creation_date, Some(utc(1999, 2, 11)));
        assert_eq!(record.expiration_date, Some(utc(2026, 2, 14)));
        assert_eq!(record.updated_date, Some(utc(2024, 1, 10)));
        assert_eq!(record.name_servers, vec!["ns1.example.net", "ns2.example.net"]);
    }

    #[test]
    fn test_jprs_bracket_response() {
        let text = "[ JPRS database provides information on network administration. ]\n\nDomain Information:\na. [Domain Name]                EXAMPLE.JP\np. [Name Server]                ns1.example.jp\np. [Name Server]                ns2.example.jp\n[Created on]                    2001/05/09\n[Expires on]                    2026/05/31\n[Last Updated]                  2025/06/01 01:05:08 (JST)\n";
        let record = normalize_text(text, Layer::LibraryParsed);
        assert_eq!(record.name_servers, vec!["ns1.example.jp", "ns2.example.jp"]);
        assert_eq!(record.creation_date, Some(utc(2001, 5, 9)));
        assert_eq!(record.expiration_date, Some(utc(2026, 5, 31)));
        assert_eq!(
            record.updated_date,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 1, 5, 8).unwrap())
        );
    }

    #[test]
    fn test_empty_input_is_raw_only() {
        let record = normalize_text("", Layer::DirectSocket);
        assert!(!record.has_structured_data());
        assert!(record.raw_text.is_empty());
        assert_eq!(record.winning_layer, Layer::DirectSocket);
    }

    #[test]
    fn test_unrecognized_text_is_raw_only() {
        let record = normalize_text("% comment only\nfoo: bar\n", Layer::DirectSocket);
        assert!(!record.has_structured_data());
        assert_eq!(record.raw_text, "% comment only\nfoo: bar\n");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2030-01-01"), Some(utc(2030, 1, 1)));
        assert_eq!(parse_date("2030.01.01"), Some(utc(2030, 1, 1)));
        assert_eq!(parse_date("01-Jan-2030"), Some(utc(2030, 1, 1)));
        assert_eq!(parse_date("01.01.2030"), Some(utc(2030, 1, 1)));
        assert_eq!(
            parse_date("2030-01-01T12:30:00Z"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2030-01-01T12:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2030-01-01 12:30:00"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2030-01-01 12:30:00 UTC"),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(parse_date("2030-01-01 (JST)"), Some(utc(2030, 1, 1)));
        assert_eq!(parse_date("before Aug-1996"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_email_cap() {
        let text = (0..8)
            .map(|i| format!("Contact: user{}@example.com", i))
            .collect::<Vec<_>>()
            .join("\n");
        let record = normalize_text(&text, Layer::DirectSocket);
        assert_eq!(record.emails.len(), MAX_EMAILS);
        assert_eq!(record.emails[0], "user0@example.com");
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found_response("No match for \"EXAMPLE-NOPE.COM\"."));
        assert!(is_not_found_response("   \r\n"));
        assert!(is_not_found_response("Status: free"));
        assert!(!is_not_found_response("Registrar: Example"));
    }

    #[test]
    fn test_normalize_rdap() {
        let json = serde_json::json!({
            "objectClassName": "domain",
            "ldhName": "EXAMPLE.COM",
            "entities": [
                {
                    "objectClassName": "entity",
                    "roles": ["registrar"],
                    "publicIds": [{"type": "IANA Registrar ID", "identifier": "376"}],
                    "vcardArray": ["vcard", [
                        ["version", {}, "text", "4.0"],
                        ["fn", {}, "text", "Example Registrar Inc."]
                    ]],
                    "entities": [{
                        "roles": ["abuse"],
                        "vcardArray": ["vcard", [
                            ["email", {}, "text", "Abuse@Registrar.Example"]
                        ]]
                    }]
                },
                {
                    "roles": ["registrant"],
                    "vcardArray": ["vcard", [
                        ["fn", {}, "text", "Jane Doe"],
                        ["org", {}, "text", "Example Org"]
                    ]]
                }
            ],
            "events": [
                {"eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z"},
                {"eventAction": "expiration", "eventDate": "2030-08-13T04:00:00Z"},
                {"eventAction": "last update of RDAP database", "eventDate": "2024-10-01T00:00:00Z"},
                {"eventAction": "last changed", "eventDate": "2024-08-14T07:01:34Z"}
            ],
            "status": ["client delete prohibited", "client transfer prohibited"],
            "nameservers": [
                {"objectClassName": "nameserver", "ldhName": "A.IANA-SERVERS.NET"},
                {"objectClassName": "nameserver", "ldhName": "b.iana-servers.net"}
            ],
            "secureDNS": {"delegationSigned": true}
        });

        let record = normalize(ResponseSource::Rdap(&json), Layer::Rdap);
        assert_eq!(record.registrar.as_deref(), Some("Example Registrar Inc."));
        assert_eq!(record.registrant.as_deref(), Some("Example Org"));
        assert_eq!(
            record.creation_date,
            Some(Utc.with_ymd_and_hms(1995, 8, 14, 4, 0, 0).unwrap())
        );
        assert_eq!(
            record.updated_date,
            Some(Utc.with_ymd_and_hms(2024, 8, 14, 7, 1, 34).unwrap())
        );
        assert_eq!(
            record.name_servers,
            vec!["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert_eq!(record.status.len(), 2);
        assert_eq!(record.dnssec.as_deref(), Some("signed"));
        assert_eq!(record.emails, vec!["abuse@registrar.example"]);
        assert_eq!(record.winning_layer, Layer::Rdap);
        assert!(record.raw_text.contains("\"ldhName\": \"EXAMPLE.COM\""));
    }

    #[test]
    fn test_rdap_registrar_id_fallback() {
        let json = serde_json::json!({
            "objectClassName": "domain",
            "entities": [{
                "roles": ["registrar"],
                "publicIds": [{"identifier": "9999"}]
            }]
        });
        let record = normalize_rdap(&json, Layer::Rdap);
        assert_eq!(record.registrar.as_deref(), Some("Registrar ID: 9999"));
    }

    #[test]
    fn test_rdap_minimal_object() {
        let json = serde_json::json!({"objectClassName": "domain", "ldhName": "example.dev"});
        let record = normalize_rdap(&json, Layer::Rdap);
        assert!(!record.has_structured_data());
        assert!(!record.raw_text.is_empty());
    }
}
