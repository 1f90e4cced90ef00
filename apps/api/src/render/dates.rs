//! Date helpers for contract token preparation.
//!
//! Contract fields arrive as free-form strings (extracted from scanned
//! documents or typed by store staff), so every date passes through
//! [`format_fr_date`] before it reaches a template token. The trial-period
//! end date is derived from the start date with calendar-correct month
//! addition.

use chrono::{Months, NaiveDate};

/// Display format used everywhere in generated contracts.
const FR_DATE: &str = "%d/%m/%Y";

/// Input formats recognized by [`format_fr_date`], tried in order.
/// Day-first formats come before `%m/%d/%Y` so ambiguous slashed dates
/// resolve the French way.
const INPUT_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y"];

/// Normalizes a date string to `DD/MM/YYYY`, zero-padded.
///
/// Unparseable input is returned unchanged — callers never get an error,
/// the raw value simply flows through to the document.
pub fn format_fr_date(s: &str) -> String {
    let raw = s.trim();
    if raw.is_empty() {
        return String::new();
    }
    for fmt in INPUT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.format(FR_DATE).to_string();
        }
    }
    raw.to_string()
}

/// Advances a date by exactly `months` calendar months, clamping the
/// day-of-month to the last valid day of the target month (Feb 29 in leap
/// years, Feb 28 otherwise).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    // checked_add_months only fails past year ±262143; keep the input then.
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Computes the trial-period end token: contract start + 2 months.
///
/// `start` is expected in `DD/MM/YYYY` (the output of [`format_fr_date`]).
/// If it does not parse, the start string is reused unchanged so the
/// template still receives a value.
pub fn trial_period_end(start: &str) -> String {
    match NaiveDate::parse_from_str(start, FR_DATE) {
        Ok(date) => add_months(date, 2).format(FR_DATE).to_string(),
        Err(_) => start.to_string(),
    }
}
