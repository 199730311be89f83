// crates/rackwatch-core/src/classify.rs

use crate::config::Thresholds;

/// Outcome of comparing a validated reading against the thresholds. The
/// notes accumulate; the anomaly flag is derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub notes: Vec<&'static str>,
}

impl Classification {
    pub fn is_anomaly(&self) -> bool {
        !self.notes.is_empty()
    }

    /// Presentation form stored on the payload.
    pub fn note(&self) -> String {
        if self.notes.is_empty() {
            "Normal".to_string()
        } else {
            format!("Anomalies: {}", self.notes.join(", "))
        }
    }
}

/// Pure threshold classification. Rules are independent and all applicable
/// notes accumulate; only the two humidity checks are mutually exclusive.
pub fn classify(
    temperature: f64,
    humidity: f64,
    vibration: f64,
    thresholds: &Thresholds,
) -> Classification {
    let mut notes = Vec::new();

    if temperature > thresholds.temperature_high_f {
        notes.push("High temperature");
    }
    if humidity < thresholds.humidity_low_pct {
        notes.push("Low humidity");
    } else if humidity > thresholds.humidity_high_pct {
        notes.push("High humidity");
    }
    if vibration > thresholds.vibration_high {
        notes.push("Excessive vibration");
    }

    Classification { notes }
}
