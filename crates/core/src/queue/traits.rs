use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{HandlerError, Result};

/// A message handed to a consumer, pending acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    /// Backend-specific token identifying this delivery for [`Queue::ack`].
    pub receipt: String,
    pub payload: Vec<u8>,
}

/// Publish/consume side channel with manual acknowledgment.
///
/// A delivery stays unacknowledged until [`Queue::ack`] is called for it.
/// Durable backends redeliver unacknowledged messages after a restart.
#[async_trait]
pub trait Queue: Send + Sync {
    /// Publishes a message to a topic.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Starts consuming a topic. Each topic accepts one consumer.
    ///
    /// Closing the returned receiver stops new deliveries; messages already
    /// buffered in it can still be drained.
    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<Delivery>>;

    /// Acknowledges a delivery, removing it from the queue for good.
    async fn ack(&self, delivery: &Delivery) -> Result<()>;
}

/// Processes one message payload.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> std::result::Result<(), HandlerError>;
}
