use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::Client;

use rackwatch_core::sinks::{Notifier, SinkError};

/// Publishes alert notifications to an SNS topic.
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    pub async fn new(topic_arn: String) -> Self {
        let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&shared_config),
            topic_arn,
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<(), SinkError> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|err| SinkError::Notify(err.to_string()))?;
        Ok(())
    }
}
