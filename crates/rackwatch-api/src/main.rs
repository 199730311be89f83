mod routes;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{routing::post, Router};
use rackwatch_core::config::{PipelineConfig, Thresholds};
use rackwatch_core::pipeline::Pipeline;
use rackwatch_core::sinks::{MetricsSink, NoopMetrics, NoopNotifier, Notifier};
use rackwatch_sinks::{CloudWatchMetrics, S3Config, S3ObjectStore, SnsNotifier};
use routes::ingest;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    dotenvy::dotenv().ok();

    let bucket_name =
        std::env::var("RACKWATCH_BUCKET").unwrap_or_else(|_| "sensor-data-bucket".to_string());
    let region = std::env::var("RACKWATCH_REGION").unwrap_or_else(|_| "us-east-1".to_string());
    let bucket_endpoint = std::env::var("RACKWATCH_BUCKET_ENDPOINT").ok();
    let bucket_access_key = std::env::var("RACKWATCH_BUCKET_ACCESS_KEY").ok();
    let bucket_secret_key = std::env::var("RACKWATCH_BUCKET_SECRET_KEY").ok();

    let thresholds_file = std::env::var("RACKWATCH_THRESHOLDS_FILE").ok();
    let thresholds = Thresholds::load(thresholds_file.as_deref().map(Path::new))
        .context("failed to load thresholds")?;

    let sink_timeout_secs = match std::env::var("RACKWATCH_SINK_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .context("RACKWATCH_SINK_TIMEOUT_SECS must be an integer number of seconds")?,
        Err(_) => 5,
    };

    let store = S3ObjectStore::new(S3Config {
        bucket: bucket_name,
        region,
        endpoint: bucket_endpoint,
        access_key_id: bucket_access_key,
        secret_access_key: bucket_secret_key,
        force_path_style: true,
    })
    .await
    .context("failed to configure object store")?;

    let notifier: Arc<dyn Notifier> = match std::env::var("RACKWATCH_SNS_TOPIC_ARN") {
        Ok(topic_arn) => Arc::new(SnsNotifier::new(topic_arn).await),
        Err(_) => {
            warn!("RACKWATCH_SNS_TOPIC_ARN not set; alert notifications disabled");
            Arc::new(NoopNotifier)
        }
    };

    let metrics: Arc<dyn MetricsSink> = if std::env::var("RACKWATCH_DISABLE_METRICS").is_ok() {
        Arc::new(NoopMetrics)
    } else {
        let namespace = std::env::var("RACKWATCH_METRIC_NAMESPACE")
            .unwrap_or_else(|_| "ServerRoomMonitor".to_string());
        Arc::new(CloudWatchMetrics::new(namespace).await)
    };

    let config = PipelineConfig {
        thresholds,
        sink_timeout: Duration::from_secs(sink_timeout_secs),
    };
    let pipeline = Arc::new(Pipeline::new(Arc::new(store), notifier, metrics, config));
    let app_state = Arc::new(AppState { pipeline });

    let router = Router::new()
        .route("/readings", post(ingest))
        .with_state(app_state);

    let listener = TcpListener::bind((std::net::Ipv4Addr::UNSPECIFIED, 3000)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
