// crates/rackwatch-core/src/error.rs

use thiserror::Error;

use crate::sinks::SinkError;

/// Why a reading was rejected before classification. These are client
/// errors (status 400); each carries the exact message surfaced to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    MissingFields(Vec<String>),
    InvalidTypes,
    OutOfRange,
}

impl RejectionReason {
    pub fn message(&self) -> String {
        match self {
            RejectionReason::MissingFields(fields) => {
                format!("Missing fields: {}", fields.join(", "))
            }
            RejectionReason::InvalidTypes => "Invalid data types".to_string(),
            RejectionReason::OutOfRange => "Values out of expected range".to_string(),
        }
    }
}

/// A rejected reading together with whatever identity could still be
/// resolved from it, so the original input can be archived for forensic
/// replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: RejectionReason,
    pub device_id: String,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("sink operation failed: {0}")]
    Sink(#[from] SinkError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
