// crates/rackwatch-core/src/validate.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::{Rejection, RejectionReason};
use crate::timestamp;
use crate::types::{Reading, REQUIRED_FIELDS, UNKNOWN_DEVICE_ID};

/// A reading that passed every check: coerced values plus the canonical
/// timestamp the stored artifact will be keyed by.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidReading {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub vibration: f64,
    pub timestamp: String,
}

/// Validates a raw reading. Checks run in order: field presence, numeric
/// coercion, timestamp normalization, range. An unparseable timestamp is
/// the one degradation that does not reject; it is replaced with `now`.
///
/// A missing `device_id` is a `MissingFields` rejection like any other
/// required key; the `"unknown"` sentinel is only ever substituted when the
/// field is present but not usable as a key segment.
pub fn validate(reading: &Reading, now: DateTime<Utc>) -> Result<ValidReading, Rejection> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !reading.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Rejection {
            reason: RejectionReason::MissingFields(missing),
            device_id: resolve_device_id(reading),
            timestamp: normalize_timestamp(reading.get("timestamp"), now),
        });
    }

    let device_id = resolve_device_id(reading);

    let (Some(temperature), Some(humidity), Some(vibration)) = (
        coerce_f64(reading.get("temperature")),
        coerce_f64(reading.get("humidity")),
        coerce_f64(reading.get("vibration")),
    ) else {
        return Err(Rejection {
            reason: RejectionReason::InvalidTypes,
            device_id,
            timestamp: normalize_timestamp(reading.get("timestamp"), now),
        });
    };

    let timestamp = normalize_timestamp(reading.get("timestamp"), now);

    if !(0.0..=100.0).contains(&humidity)
        || !(0.0..=200.0).contains(&temperature)
        || !(0.0..=5.0).contains(&vibration)
    {
        warn!(temperature, humidity, vibration, "reading out of expected range");
        return Err(Rejection {
            reason: RejectionReason::OutOfRange,
            device_id,
            timestamp,
        });
    }

    Ok(ValidReading {
        device_id,
        temperature,
        humidity,
        vibration,
        timestamp,
    })
}

fn resolve_device_id(reading: &Reading) -> String {
    match reading.get("device_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        Some(_) => {
            warn!("device_id is not textual; using fallback id");
            UNKNOWN_DEVICE_ID.to_string()
        }
        None => UNKNOWN_DEVICE_ID.to_string(),
    }
}

fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn normalize_timestamp(value: Option<&Value>, now: DateTime<Utc>) -> String {
    match value.and_then(Value::as_str) {
        Some(raw) => match timestamp::parse_lenient(raw) {
            Some(instant) => timestamp::canonical(instant),
            None => {
                warn!(raw, "invalid timestamp format, using current UTC time");
                timestamp::canonical(now)
            }
        },
        None => timestamp::canonical(now),
    }
}
