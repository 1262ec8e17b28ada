//! In-memory queue implementation.
//!
//! One bounded `tokio::sync::mpsc` channel per topic. Messages published
//! before anyone subscribes wait in the channel buffer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use clientdesk_core::queue::{Delivery, Queue, QueueError, Result};

/// Default channel capacity per topic.
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug)]
struct Topic {
    sender: mpsc::Sender<Delivery>,
    /// Taken by the first subscriber.
    receiver: Option<mpsc::Receiver<Delivery>>,
    next_seq: u64,
    in_flight: HashSet<String>,
    acked: u64,
}

impl Topic {
    fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Some(receiver),
            next_seq: 0,
            in_flight: HashSet::new(),
            acked: 0,
        }
    }
}

/// In-memory queue implementation.
///
/// Publishing never blocks: when a topic's buffer is full the publish fails
/// with `QueueError::PublishFailed`. Each topic has a single consumer.
#[derive(Debug, Clone)]
pub struct MemoryQueue {
    capacity: usize,
    topics: Arc<RwLock<HashMap<String, Topic>>>,
}

impl MemoryQueue {
    /// Creates a queue whose topics buffer up to `capacity` messages.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Messages published to `topic` and not yet acknowledged.
    #[cfg(test)]
    pub async fn pending(&self, topic: &str) -> usize {
        let topics = self.topics.read().await;
        topics.get(topic).map_or(0, |t| t.in_flight.len())
    }

    /// Messages acknowledged on `topic`.
    #[cfg(test)]
    pub async fn acked(&self, topic: &str) -> u64 {
        let topics = self.topics.read().await;
        topics.get(topic).map_or(0, |t| t.acked)
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let mut topics = self.topics.write().await;
        let state = topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(self.capacity));

        let receipt = format!("{}:{}", topic, state.next_seq);
        let delivery = Delivery {
            topic: topic.to_string(),
            receipt: receipt.clone(),
            payload: payload.to_vec(),
        };

        state.sender.try_send(delivery).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                QueueError::PublishFailed(format!("topic '{topic}' is full"))
            }
            mpsc::error::TrySendError::Closed(_) => {
                QueueError::PublishFailed(format!("topic '{topic}' is closed"))
            }
        })?;

        state.next_seq += 1;
        state.in_flight.insert(receipt);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<Delivery>> {
        let mut topics = self.topics.write().await;
        let state = topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(self.capacity));

        state
            .receiver
            .take()
            .ok_or_else(|| QueueError::AlreadyConsuming(topic.to_string()))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        let mut topics = self.topics.write().await;
        let state = topics
            .get_mut(&delivery.topic)
            .ok_or_else(|| QueueError::AckFailed(format!("unknown topic '{}'", delivery.topic)))?;

        if !state.in_flight.remove(&delivery.receipt) {
            return Err(QueueError::AckFailed(format!(
                "unknown receipt '{}'",
                delivery.receipt
            )));
        }
        state.acked += 1;
        tracing::trace!(topic = %delivery.topic, acked = state.acked, "Message acknowledged");
        Ok(())
    }
}
