// crates/rackwatch-core/src/timestamp.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Formats accepted for timestamps without an offset. Naive times are taken
/// as already being UTC.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Lenient parse of a device-supplied timestamp. Tries RFC 3339, RFC 2822,
/// then the common naive layouts, then a bare date.
pub fn parse_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    None
}

/// Canonical stored form of an instant: UTC ISO-8601 with a `Z` suffix,
/// fractional seconds only when non-zero, and colons replaced by dashes so
/// the string is safe inside object keys. Deterministic for a given
/// instant.
pub fn canonical(instant: DateTime<Utc>) -> String {
    instant
        .to_rfc3339_opts(SecondsFormat::AutoSi, true)
        .replace(':', "-")
}
