//! Post-extraction field cleanup.
//!
//! The model recopies what it reads, so dates arrive in whatever format the
//! scanned document used and nationality may be an ISO code. Everything
//! date-like is coerced to `DD/MM/YYYY` here, once, before the payload
//! reaches the client or a contract record.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Formats tried in order by [`to_dd_mm_yyyy`]. Broader than the contract
/// renderer's list: scanned documents produce much wilder input than store
/// staff do.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y", "%Y.%m.%d", "%m/%d/%Y",
    "%d %m %Y", "%d %b %Y", "%d %B %Y", "%Y%m%d",
];

/// Last-resort recognizer: three digit groups with arbitrary separators.
static LOOSE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\D*(\d{1,4})\D+(\d{1,2})\D+(\d{1,4})\D*$").unwrap());

/// Field-name aliases that should be treated as dates. Only the first
/// alias present in the payload is rewritten for each group.
const DATE_KEY_GROUPS: &[&[&str]] = &[
    &["date_naissance", "date de naissance", "birthdate", "dob"],
    &["date_debut", "date debut", "start_date"],
    &["date_expiration", "date expiration", "expiry", "expiration_date"],
];

const NATIONALITY_KEYS: &[&str] = &["nationalite", "nationalit\u{e9}", "nationality"];

/// Normalizes an extracted payload in place and returns it.
/// Non-object payloads pass through untouched.
pub fn normalize_fields(mut payload: Value) -> Value {
    let Some(map) = payload.as_object_mut() else {
        return payload;
    };

    for key in NATIONALITY_KEYS {
        if let Some(Value::String(v)) = map.get_mut(*key) {
            if matches!(v.trim().to_uppercase().as_str(), "FRA" | "FR") {
                *v = "Fran\u{e7}aise".to_string();
            }
        }
    }

    // Case-insensitive key lookup, preserving the payload's own spelling.
    let lower_to_key: Vec<(String, String)> = map
        .keys()
        .map(|k| (k.to_lowercase(), k.clone()))
        .collect();

    for group in DATE_KEY_GROUPS {
        for alias in *group {
            let Some((_, real_key)) = lower_to_key.iter().find(|(low, _)| low == alias) else {
                continue;
            };
            if let Some(Value::String(v)) = map.get_mut(real_key) {
                *v = to_dd_mm_yyyy(v);
            }
            break;
        }
    }

    payload
}

/// Coerces a date-like string to `DD/MM/YYYY`. Tolerates a trailing time
/// part (`2024-01-05T00:00:00`). Returns the input unchanged when nothing
/// matches.
pub fn to_dd_mm_yyyy(value: &str) -> String {
    let raw = value.trim();
    if raw.is_empty() {
        return raw.to_string();
    }
    let date_part = raw
        .split('T')
        .next()
        .unwrap_or(raw)
        .split(' ')
        .next()
        .unwrap_or(raw);

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
            return date.format("%d/%m/%Y").to_string();
        }
    }
    // Space-separated formats were split off above; retry them on the raw
    // string so "7 juin"-style inputs keep a chance. English month names
    // only — chrono has no French locale table.
    for fmt in &["%d %m %Y", "%d %b %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.format("%d/%m/%Y").to_string();
        }
    }

    if let Some(caps) = LOOSE_DATE_RE.captures(date_part) {
        let (a, b, c) = (&caps[1], &caps[2], &caps[3]);
        let ymd = if a.len() == 4 {
            Some((a.to_string(), b.to_string(), c.to_string()))
        } else if c.len() == 4 {
            Some((c.to_string(), b.to_string(), a.to_string()))
        } else {
            None
        };
        if let Some((y, m, d)) = ymd {
            let candidate = format!("{y}-{:0>2}-{:0>2}", m, d);
            if let Ok(date) = NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
                return date.format("%d/%m/%Y").to_string();
            }
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_dd_mm_yyyy_common_formats() {
        assert_eq!(to_dd_mm_yyyy("1998-06-07"), "07/06/1998");
        assert_eq!(to_dd_mm_yyyy("07/06/1998"), "07/06/1998");
        assert_eq!(to_dd_mm_yyyy("7.6.1998"), "07/06/1998");
        assert_eq!(to_dd_mm_yyyy("19980607"), "07/06/1998");
    }

    #[test]
    fn test_to_dd_mm_yyyy_strips_time_suffix() {
        assert_eq!(to_dd_mm_yyyy("1998-06-07T00:00:00"), "07/06/1998");
        assert_eq!(to_dd_mm_yyyy("1998-06-07 12:30:00"), "07/06/1998");
    }

    #[test]
    fn test_to_dd_mm_yyyy_loose_groups() {
        assert_eq!(to_dd_mm_yyyy("7-6-1998."), "07/06/1998");
        assert_eq!(to_dd_mm_yyyy("1998/6/7"), "07/06/1998");
    }

    #[test]
    fn test_to_dd_mm_yyyy_english_month_names() {
        assert_eq!(to_dd_mm_yyyy("7 Jun 1998"), "07/06/1998");
        assert_eq!(to_dd_mm_yyyy("7 June 1998"), "07/06/1998");
    }

    #[test]
    fn test_to_dd_mm_yyyy_garbage_passes_through() {
        assert_eq!(to_dd_mm_yyyy("inconnue"), "inconnue");
        assert_eq!(to_dd_mm_yyyy("12/34"), "12/34");
    }

    #[test]
    fn test_normalize_rewrites_nationality_codes() {
        let data = normalize_fields(json!({"nationalite": "FRA"}));
        assert_eq!(data["nationalite"], "Fran\u{e7}aise");
        let data = normalize_fields(json!({"nationalite": "fr"}));
        assert_eq!(data["nationalite"], "Fran\u{e7}aise");
        let data = normalize_fields(json!({"nationalite": "Italienne"}));
        assert_eq!(data["nationalite"], "Italienne");
    }

    #[test]
    fn test_normalize_rewrites_date_aliases_case_insensitive() {
        let data = normalize_fields(json!({
            "Date_Naissance": "1998-06-07",
            "date_expiration": "2030-01-02",
            "lieu_naissance": "Lyon"
        }));
        assert_eq!(data["Date_Naissance"], "07/06/1998");
        assert_eq!(data["date_expiration"], "02/01/2030");
        assert_eq!(data["lieu_naissance"], "Lyon");
    }

    #[test]
    fn test_normalize_non_object_passthrough() {
        let data = normalize_fields(json!("raw text"));
        assert_eq!(data, json!("raw text"));
    }
}
