use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rackwatch_core::config::PipelineConfig;
use rackwatch_core::pipeline::Pipeline;
use rackwatch_core::sinks::{MemoryObjectStore, MetricsSink, Notifier, ObjectStore, SinkError};
use rackwatch_core::types::Reading;
use serde_json::Value;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store fake with failure and hang injection by key prefix.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryObjectStore,
    fail_prefix: Mutex<Option<String>>,
    hang_prefix: Mutex<Option<String>>,
}

impl FailingStore {
    pub fn fail_puts_under(&self, prefix: &str) {
        *lock(&self.fail_prefix) = Some(prefix.to_string());
    }

    /// Puts under this prefix block far past any reasonable sink timeout.
    pub fn hang_puts_under(&self, prefix: &str) {
        *lock(&self.hang_prefix) = Some(prefix.to_string());
    }

    pub fn body_of(&self, key: &str) -> Option<Value> {
        let bytes = self.inner.get(key)?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), SinkError> {
        let should_hang = lock(&self.hang_prefix)
            .as_deref()
            .is_some_and(|prefix| key.starts_with(prefix));
        if should_hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if let Some(prefix) = lock(&self.fail_prefix).as_deref() {
            if key.starts_with(prefix) {
                return Err(SinkError::Storage(format!("injected failure for {key}")));
            }
        }
        self.inner.put(key, body, content_type).await
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, SinkError> {
        self.inner.list_prefix(prefix).await
    }

    async fn delete(&self, key: &str) -> Result<(), SinkError> {
        self.inner.delete(key).await
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub published: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
    hang: AtomicBool,
}

impl RecordingNotifier {
    pub fn fail_next_publishes(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Publishes block far past any reasonable sink timeout.
    pub fn hang_next_publishes(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        lock(&self.published).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), SinkError> {
        if self.hang.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Notify("injected publish failure".to_string()));
        }
        lock(&self.published).push((subject.to_string(), message.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    pub emitted: Mutex<Vec<(String, Vec<(String, String)>)>>,
    fail: AtomicBool,
}

impl RecordingMetrics {
    pub fn fail_next_increments(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn counters(&self) -> Vec<(String, Vec<(String, String)>)> {
        lock(&self.emitted).clone()
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.counters()
            .iter()
            .filter(|(metric, _)| metric == name)
            .count()
    }
}

#[async_trait]
impl MetricsSink for RecordingMetrics {
    async fn increment(
        &self,
        name: &str,
        _value: f64,
        dimensions: &[(&str, &str)],
    ) -> Result<(), SinkError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Metrics("injected metric failure".to_string()));
        }
        let dims = dimensions
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        lock(&self.emitted).push((name.to_string(), dims));
        Ok(())
    }
}

pub struct Harness {
    pub store: Arc<FailingStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub metrics: Arc<RecordingMetrics>,
    pub pipeline: Pipeline,
}

pub fn harness() -> Harness {
    harness_with_config(PipelineConfig::default())
}

pub fn harness_with_config(config: PipelineConfig) -> Harness {
    let store = Arc::new(FailingStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let pipeline = Pipeline::new(
        store.clone(),
        notifier.clone(),
        metrics.clone(),
        config,
    );
    Harness {
        store,
        notifier,
        metrics,
        pipeline,
    }
}

/// Builds a `Reading` from a `json!` object literal.
pub fn reading(value: Value) -> Reading {
    match value {
        Value::Object(map) => map,
        other => panic!("reading fixture must be a JSON object, got {other}"),
    }
}

pub fn body_json(body: &str) -> Value {
    serde_json::from_str(body).expect("response body is JSON")
}
