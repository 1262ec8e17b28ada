use thiserror::Error;

/// Errors that can occur during queue operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Publish failed: {0}")]
    PublishFailed(String),
    #[error("Subscribe failed: {0}")]
    SubscribeFailed(String),
    /// Topics have a single consumer.
    #[error("Topic already has a consumer: {0}")]
    AlreadyConsuming(String),
    #[error("Ack failed: {0}")]
    AckFailed(String),
}

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors returned by a [`MessageHandler`](super::MessageHandler).
///
/// Either way the message is acknowledged and dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Malformed message: {0}")]
    Decode(String),
    #[error("Handler failed: {0}")]
    Failed(String),
}
