use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use aws_sdk_cloudwatch::Client;

use rackwatch_core::sinks::{MetricsSink, SinkError};

/// Emits counter metrics under a fixed CloudWatch namespace.
#[derive(Clone)]
pub struct CloudWatchMetrics {
    client: Client,
    namespace: String,
}

impl CloudWatchMetrics {
    pub async fn new(namespace: String) -> Self {
        let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&shared_config),
            namespace,
        }
    }
}

#[async_trait]
impl MetricsSink for CloudWatchMetrics {
    async fn increment(
        &self,
        name: &str,
        value: f64,
        dimensions: &[(&str, &str)],
    ) -> Result<(), SinkError> {
        let mut datum = MetricDatum::builder()
            .metric_name(name)
            .value(value)
            .unit(StandardUnit::Count);
        for (dimension_name, dimension_value) in dimensions {
            datum = datum.dimensions(
                Dimension::builder()
                    .name(*dimension_name)
                    .value(*dimension_value)
                    .build(),
            );
        }

        self.client
            .put_metric_data()
            .namespace(&self.namespace)
            .metric_data(datum.build())
            .send()
            .await
            .map_err(|err| SinkError::Metrics(err.to_string()))?;
        Ok(())
    }
}
