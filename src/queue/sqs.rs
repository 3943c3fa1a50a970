//! SQS publisher.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::error::DisplayErrorContext;

use crate::ingest::error::QueuePublishError;
use crate::queue::QueuePublisher;

#[derive(Debug, Clone)]
pub struct SqsPublisher {
    client: aws_sdk_sqs::Client,
}

impl SqsPublisher {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self::new(aws_sdk_sqs::Client::new(sdk_config))
    }
}

#[async_trait]
impl QueuePublisher for SqsPublisher {
    async fn send(&self, queue_url: &str, message: String) -> Result<(), QueuePublishError> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(message)
            .send()
            .await
            .map_err(|e| QueuePublishError::Backend {
                queue_url: queue_url.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::trace!(
            queue_url = %queue_url,
            message_id = output.message_id().unwrap_or_default(),
            "Message sent"
        );
        Ok(())
    }
}
