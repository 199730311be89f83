mod common;

use chrono::{TimeZone, Utc};
use common::reading;
use rackwatch_core::error::RejectionReason;
use rackwatch_core::validate::validate;
use serde_json::json;

fn now() -> chrono::DateTime<chrono::Utc> {
    Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap()
}

#[test]
fn valid_reading_is_coerced_and_normalized() {
    let input = reading(json!({
        "device_id": "rack-01",
        "temperature": 70,
        "humidity": 45,
        "vibration": 0.1,
        "timestamp": "2024-01-01T00:00:00Z",
    }));

    let valid = validate(&input, now()).expect("valid");
    assert_eq!(valid.device_id, "rack-01");
    assert_eq!(valid.temperature, 70.0);
    assert_eq!(valid.humidity, 45.0);
    assert_eq!(valid.vibration, 0.1);
    assert_eq!(valid.timestamp, "2024-01-01T00-00-00Z");
}

#[test]
fn numeric_strings_are_coerced() {
    let input = reading(json!({
        "device_id": "rack-01",
        "temperature": "70.5",
        "humidity": " 45 ",
        "vibration": "0.1",
        "timestamp": "2024-01-01T00:00:00Z",
    }));

    let valid = validate(&input, now()).expect("valid");
    assert_eq!(valid.temperature, 70.5);
    assert_eq!(valid.humidity, 45.0);
}

#[test]
fn missing_fields_are_reported_in_required_order() {
    let input = reading(json!({
        "temperature": 70,
        "humidity": 45,
        "timestamp": "2024-01-01T00:00:00Z",
    }));

    let rejection = validate(&input, now()).expect_err("rejected");
    assert_eq!(
        rejection.reason,
        RejectionReason::MissingFields(vec!["device_id".to_string(), "vibration".to_string()])
    );
    assert_eq!(rejection.reason.message(), "Missing fields: device_id, vibration");
    // device_id was absent, so the archive falls back to the sentinel.
    assert_eq!(rejection.device_id, "unknown");
}

#[test]
fn non_numeric_values_reject_with_invalid_types() {
    let input = reading(json!({
        "device_id": "r1",
        "temperature": "hot",
        "humidity": 50,
        "vibration": 0.1,
        "timestamp": "2024-01-01T00:00:00Z",
    }));

    let rejection = validate(&input, now()).expect_err("rejected");
    assert_eq!(rejection.reason, RejectionReason::InvalidTypes);
    assert_eq!(rejection.reason.message(), "Invalid data types");
    assert_eq!(rejection.device_id, "r1");
    assert_eq!(rejection.timestamp, "2024-01-01T00-00-00Z");
}

#[test]
fn out_of_range_values_reject() {
    for (temperature, humidity, vibration) in
        [(250.0, 45.0, 0.1), (70.0, 120.0, 0.1), (70.0, 45.0, 7.5), (-1.0, 45.0, 0.1)]
    {
        let input = reading(json!({
            "device_id": "rack-01",
            "temperature": temperature,
            "humidity": humidity,
            "vibration": vibration,
            "timestamp": "2024-01-01T00:00:00Z",
        }));

        let rejection = validate(&input, now()).expect_err("rejected");
        assert_eq!(rejection.reason, RejectionReason::OutOfRange);
        assert_eq!(rejection.reason.message(), "Values out of expected range");
    }
}

#[test]
fn boundary_values_are_accepted() {
    let input = reading(json!({
        "device_id": "rack-01",
        "temperature": 200,
        "humidity": 0,
        "vibration": 5,
        "timestamp": "2024-01-01T00:00:00Z",
    }));

    assert!(validate(&input, now()).is_ok());
}

#[test]
fn unparseable_timestamp_degrades_to_now() {
    let input = reading(json!({
        "device_id": "rack-01",
        "temperature": 70,
        "humidity": 45,
        "vibration": 0.1,
        "timestamp": "not-a-date",
    }));

    let valid = validate(&input, now()).expect("valid despite bad timestamp");
    assert_eq!(valid.timestamp, "2024-05-05T12-00-00Z");
}

#[test]
fn offset_timestamps_normalize_to_utc() {
    let input = reading(json!({
        "device_id": "rack-01",
        "temperature": 70,
        "humidity": 45,
        "vibration": 0.1,
        "timestamp": "2024-01-01T05:30:00+05:30",
    }));

    let valid = validate(&input, now()).expect("valid");
    assert_eq!(valid.timestamp, "2024-01-01T00-00-00Z");
}

#[test]
fn numeric_device_id_is_stringified() {
    let input = reading(json!({
        "device_id": 17,
        "temperature": 70,
        "humidity": 45,
        "vibration": 0.1,
        "timestamp": "2024-01-01T00:00:00Z",
    }));

    let valid = validate(&input, now()).expect("valid");
    assert_eq!(valid.device_id, "17");
}

#[test]
fn non_textual_device_id_falls_back_to_sentinel() {
    let input = reading(json!({
        "device_id": {"rack": 1},
        "temperature": 70,
        "humidity": 45,
        "vibration": 0.1,
        "timestamp": "2024-01-01T00:00:00Z",
    }));

    let valid = validate(&input, now()).expect("valid");
    assert_eq!(valid.device_id, "unknown");
}
