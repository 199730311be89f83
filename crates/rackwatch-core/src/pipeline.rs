// crates/rackwatch-core/src/pipeline.rs
//
// The single source of truth for ingestion: validate, classify, route.
// One reading per invocation, stages sequential, no retries; redelivery is
// the trigger's responsibility.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::classify::classify;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Rejection};
use crate::sinks::{MetricsSink, Notifier, ObjectStore, SinkError};
use crate::types::{Category, NormalizedPayload, Reading, UNKNOWN_DEVICE_ID};
use crate::validate::validate;

pub const METRIC_READINGS_PROCESSED: &str = "ReadingsProcessed";
pub const METRIC_ANOMALIES_DETECTED: &str = "AnomaliesDetected";

const ALERT_SUBJECT: &str = "Sensor alert detected";
const CONTENT_TYPE_JSON: &str = "application/json";

/// Client-facing response. The body is always a JSON document; callers
/// never see a raw error trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Response {
    fn ok(body: String) -> Self {
        Response {
            status_code: 200,
            body,
        }
    }

    fn bad_request(body: String) -> Self {
        Response {
            status_code: 400,
            body,
        }
    }

    fn internal(message: &str) -> Self {
        Response {
            status_code: 500,
            body: json!({ "error": message }).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Store,
    Notify,
    Metrics,
}

/// Record of one best-effort side effect: which sink was attempted, against
/// what target, and whether it failed. Failures here are logged and
/// contained; they never fail the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkAttempt {
    pub sink: SinkKind,
    pub target: String,
    pub error: Option<String>,
}

impl SinkAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A response together with the side-effect ledger for the invocation.
#[derive(Debug)]
pub struct HandleReport {
    pub response: Response,
    pub attempts: Vec<SinkAttempt>,
}

/// The ingestion pipeline. Collaborators are injected so tests can
/// substitute fakes; there is no shared mutable state across invocations.
pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn MetricsSink>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<dyn MetricsSink>,
        config: PipelineConfig,
    ) -> Self {
        Pipeline {
            store,
            notifier,
            metrics,
            config,
        }
    }

    /// Processes one reading and always produces a structured response.
    pub async fn handle(&self, reading: Reading) -> Response {
        self.handle_with_report(reading).await.response
    }

    /// Like [`handle`](Self::handle), but also returns the side-effect
    /// ledger so callers (and tests) can see which best-effort sinks were
    /// attempted and which failed.
    pub async fn handle_with_report(&self, reading: Reading) -> HandleReport {
        let mut attempts = Vec::new();
        let response = match self.process(&reading, &mut attempts).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "reading processing failed");
                Response::internal(&err.to_string())
            }
        };
        HandleReport { response, attempts }
    }

    async fn process(
        &self,
        reading: &Reading,
        attempts: &mut Vec<SinkAttempt>,
    ) -> Result<Response, PipelineError> {
        self.record_metric(METRIC_READINGS_PROCESSED, &[], attempts)
            .await;

        let valid = match validate(reading, Utc::now()) {
            Ok(valid) => valid,
            Err(rejection) => return Ok(self.reject(reading, rejection, attempts).await),
        };

        let classification = classify(
            valid.temperature,
            valid.humidity,
            valid.vibration,
            &self.config.thresholds,
        );

        let payload = NormalizedPayload {
            device_id: valid.device_id,
            temperature: valid.temperature,
            humidity: valid.humidity,
            vibration: valid.vibration,
            timestamp: valid.timestamp,
            alert: classification.is_anomaly(),
            note: classification.note(),
        };

        if payload.device_id == UNKNOWN_DEVICE_ID {
            warn!("device id is unknown; using fallback id");
        }

        let body = serde_json::to_string(&payload)?;

        // The raw/ write is the durability guarantee; it is the one sink
        // failure that surfaces to the caller.
        let raw_key = Category::Raw.object_key(&payload.device_id, &payload.timestamp);
        self.put_object(&raw_key, body.clone()).await?;
        info!(key = %raw_key, "stored normalized payload");

        if payload.alert {
            // Alert storage, notification, and the anomaly counter are
            // independent; a failure in one must not block the others.
            self.record_metric(
                METRIC_ANOMALIES_DETECTED,
                &[("DeviceId", payload.device_id.as_str())],
                attempts,
            )
            .await;

            let alert_key = Category::Alerts.object_key(&payload.device_id, &payload.timestamp);
            let attempt = self.try_put(&alert_key, body.clone()).await;
            attempts.push(attempt);

            self.notify(&payload, attempts).await;
        }

        info!(
            device_id = %payload.device_id,
            timestamp = %payload.timestamp,
            alert = payload.alert,
            "payload processed and stored"
        );
        Ok(Response::ok(body))
    }

    /// Archives the original raw reading for forensic replay and shapes the
    /// 400 response. The archive write is best-effort; losing it must not
    /// mask the rejection itself.
    async fn reject(
        &self,
        reading: &Reading,
        rejection: Rejection,
        attempts: &mut Vec<SinkAttempt>,
    ) -> Response {
        let key = Category::Invalid.object_key(&rejection.device_id, &rejection.timestamp);
        error!(
            reason = %rejection.reason.message(),
            device_id = %rejection.device_id,
            key = %key,
            "rejecting reading"
        );

        match serde_json::to_string(reading) {
            Ok(original) => {
                let attempt = self.try_put(&key, original).await;
                attempts.push(attempt);
            }
            Err(err) => attempts.push(SinkAttempt {
                sink: SinkKind::Store,
                target: key.clone(),
                error: Some(err.to_string()),
            }),
        }

        Response::bad_request(
            json!({
                "error": rejection.reason.message(),
                "saved_as": key,
            })
            .to_string(),
        )
    }

    async fn put_object(&self, key: &str, body: String) -> Result<(), SinkError> {
        self.bounded(
            "object store put",
            self.store.put(key, Bytes::from(body), CONTENT_TYPE_JSON),
        )
        .await
    }

    async fn try_put(&self, key: &str, body: String) -> SinkAttempt {
        let error = self.put_object(key, body).await.err().map(|err| err.to_string());
        match &error {
            Some(message) => warn!(key, error = %message, "best-effort store write failed"),
            None => info!(key, "stored object"),
        }
        SinkAttempt {
            sink: SinkKind::Store,
            target: key.to_string(),
            error,
        }
    }

    async fn record_metric(
        &self,
        name: &str,
        dimensions: &[(&str, &str)],
        attempts: &mut Vec<SinkAttempt>,
    ) {
        let error = self
            .bounded("metrics emit", self.metrics.increment(name, 1.0, dimensions))
            .await
            .err()
            .map(|err| err.to_string());
        if let Some(message) = &error {
            warn!(metric = name, error = %message, "metric emission failed");
        }
        attempts.push(SinkAttempt {
            sink: SinkKind::Metrics,
            target: name.to_string(),
            error,
        });
    }

    async fn notify(&self, payload: &NormalizedPayload, attempts: &mut Vec<SinkAttempt>) {
        let message = match serde_json::to_string_pretty(payload) {
            Ok(message) => message,
            Err(err) => {
                attempts.push(SinkAttempt {
                    sink: SinkKind::Notify,
                    target: ALERT_SUBJECT.to_string(),
                    error: Some(err.to_string()),
                });
                return;
            }
        };

        let error = self
            .bounded(
                "notification publish",
                self.notifier.publish(ALERT_SUBJECT, &message),
            )
            .await
            .err()
            .map(|err| err.to_string());
        match &error {
            Some(message) => {
                error!(device_id = %payload.device_id, error = %message, "failed to publish alert notification")
            }
            None => {
                info!(device_id = %payload.device_id, timestamp = %payload.timestamp, "alert notification published")
            }
        }
        attempts.push(SinkAttempt {
            sink: SinkKind::Notify,
            target: ALERT_SUBJECT.to_string(),
            error,
        });
    }

    /// Imposes the configured timeout on an external call; the pipeline
    /// must not hang indefinitely on any collaborator.
    async fn bounded<T>(
        &self,
        what: &'static str,
        call: impl Future<Output = Result<T, SinkError>>,
    ) -> Result<T, SinkError> {
        match tokio::time::timeout(self.config.sink_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout(what)),
        }
    }
}
