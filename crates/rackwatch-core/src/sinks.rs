// crates/rackwatch-core/src/sinks.rs
//
// Collaborator interfaces the pipeline routes to. Implementations live
// outside this crate (see rackwatch-sinks for the AWS-backed ones); the
// pipeline only ever sees these traits, so tests substitute fakes.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("notify error: {0}")]
    Notify(String),

    #[error("metrics error: {0}")]
    Metrics(String),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// Durable object storage. `put` overwrites under an identical key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), SinkError>;

    /// All keys under a prefix, used by the bulk-purge maintenance path.
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, SinkError>;

    async fn delete(&self, key: &str) -> Result<(), SinkError>;
}

/// Best-effort alert channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), SinkError>;
}

/// Best-effort counter emission.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn increment(
        &self,
        name: &str,
        value: f64,
        dimensions: &[(&str, &str)],
    ) -> Result<(), SinkError>;
}

/// In-memory store for tests and local wiring without an object storage
/// backend.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, Bytes>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects().keys().cloned().collect()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<(), SinkError> {
        self.objects().insert(key.to_string(), body);
        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, SinkError> {
        Ok(self
            .objects()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> Result<(), SinkError> {
        self.objects().remove(key);
        Ok(())
    }
}

/// Notifier for deployments without an alert channel configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn publish(&self, _subject: &str, _message: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Metrics sink for deployments with metric emission disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

#[async_trait]
impl MetricsSink for NoopMetrics {
    async fn increment(
        &self,
        _name: &str,
        _value: f64,
        _dimensions: &[(&str, &str)],
    ) -> Result<(), SinkError> {
        Ok(())
    }
}
