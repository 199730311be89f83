// crates/rackwatch-core/src/types.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw inbound reading: an unordered JSON object as submitted by a device
/// or the pub/sub trigger. Validation decides what it actually contains.
pub type Reading = Map<String, Value>;

/// Keys a reading must carry to be accepted, in the order they are reported
/// when missing.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "device_id",
    "temperature",
    "humidity",
    "vibration",
    "timestamp",
];

/// Sentinel used when a reading carries a `device_id` that is present but
/// not usable as a key segment.
pub const UNKNOWN_DEVICE_ID: &str = "unknown";

/// Storage namespace a payload is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Raw,
    Alerts,
    Invalid,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Raw => "raw",
            Category::Alerts => "alerts",
            Category::Invalid => "invalid",
        }
    }

    /// Object key for a payload stored under this category. Unique per
    /// (category, device, timestamp); sub-second collisions for substituted
    /// timestamps are an accepted limitation of the key scheme.
    pub fn object_key(&self, device_id: &str, timestamp: &str) -> String {
        format!("{}/{}/{}.json", self.as_str(), device_id, timestamp)
    }
}

/// The normalized record written to storage and returned to the caller.
/// Constructed once per accepted reading and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPayload {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub vibration: f64,
    /// Canonical UTC ISO-8601 with colons replaced by dashes, so it is safe
    /// to embed in object keys.
    pub timestamp: String,
    pub alert: bool,
    /// `"Normal"` or `"Anomalies: <comma-joined descriptions>"`.
    pub note: String,
}
