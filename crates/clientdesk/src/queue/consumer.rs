//! The consume-with-ack loop.
//!
//! Messages are handled one at a time. Every delivery is acknowledged once
//! the handler returns, whether it succeeded or not: a failed message is
//! logged and dropped, never retried.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

use clientdesk_core::queue::{Delivery, MessageHandler, Queue, Result};

/// Counts reported when a consumer stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeSummary {
    pub handled: usize,
    pub failed: usize,
}

/// Consumes `topic` until `shutdown` fires, then drains what is buffered.
///
/// On shutdown the delivery channel is closed so no new messages arrive;
/// everything already delivered to it is still processed before returning.
pub async fn consume(
    queue: Arc<dyn Queue>,
    topic: &str,
    handler: Arc<dyn MessageHandler>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<ConsumeSummary> {
    let mut rx = queue.subscribe(topic).await?;
    let mut summary = ConsumeSummary::default();
    info!(topic, "Consumer started");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                rx.close();
                break;
            }
            delivery = rx.recv() => match delivery {
                Some(delivery) => {
                    process(queue.as_ref(), handler.as_ref(), &delivery, &mut summary).await;
                }
                None => break,
            },
        }
    }

    while let Some(delivery) = rx.recv().await {
        process(queue.as_ref(), handler.as_ref(), &delivery, &mut summary).await;
    }

    info!(
        topic,
        handled = summary.handled,
        failed = summary.failed,
        "Consumer stopped"
    );
    Ok(summary)
}

async fn process(
    queue: &dyn Queue,
    handler: &dyn MessageHandler,
    delivery: &Delivery,
    summary: &mut ConsumeSummary,
) {
    match handler.handle(&delivery.payload).await {
        Ok(()) => summary.handled += 1,
        Err(e) => {
            summary.failed += 1;
            error!(
                topic = %delivery.topic,
                receipt = %delivery.receipt,
                error = %e,
                "Message handler failed, dropping message"
            );
        }
    }

    if let Err(e) = queue.ack(delivery).await {
        warn!(topic = %delivery.topic, error = %e, "Failed to acknowledge message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use clientdesk_core::queue::HandlerError;

    use crate::queue::MemoryQueue;

    const TOPIC: &str = "test-topic";

    /// Records payloads; fails on payloads equal to `b"bad"`.
    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<Vec<u8>>>,
    }

    impl RecordingHandler {
        fn seen(&self) -> Vec<Vec<u8>> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageHandler for RecordingHandler {
        async fn handle(&self, payload: &[u8]) -> std::result::Result<(), HandlerError> {
            self.seen.lock().unwrap().push(payload.to_vec());
            if payload == b"bad" {
                return Err(HandlerError::Failed("boom".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_handles_and_acks_each_message() {
        let queue = MemoryQueue::default();
        let handler = Arc::new(RecordingHandler::default());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        queue.publish(TOPIC, b"one").await.unwrap();
        queue.publish(TOPIC, b"two").await.unwrap();

        let task = tokio::spawn(consume(
            Arc::new(queue.clone()),
            TOPIC,
            handler.clone(),
            shutdown_rx,
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();
        let summary = task.await.unwrap().unwrap();

        assert_eq!(summary, ConsumeSummary { handled: 2, failed: 0 });
        assert_eq!(handler.seen(), vec![b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(queue.pending(TOPIC).await, 0);
    }

    #[tokio::test]
    async fn test_failed_message_is_acked_and_dropped() {
        let queue = MemoryQueue::default();
        let handler = Arc::new(RecordingHandler::default());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        queue.publish(TOPIC, b"bad").await.unwrap();
        queue.publish(TOPIC, b"good").await.unwrap();

        let task = tokio::spawn(consume(
            Arc::new(queue.clone()),
            TOPIC,
            handler.clone(),
            shutdown_rx,
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();
        let summary = task.await.unwrap().unwrap();

        assert_eq!(summary, ConsumeSummary { handled: 1, failed: 1 });
        // Handled exactly once: no retry.
        assert_eq!(handler.seen().len(), 2);
        assert_eq!(queue.pending(TOPIC).await, 0);
        assert_eq!(queue.acked(TOPIC).await, 2);
    }

    #[tokio::test]
    async fn test_shutdown_drains_buffered_messages() {
        let queue = MemoryQueue::default();
        let handler = Arc::new(RecordingHandler::default());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        // Shutdown is already signalled when the consumer starts; the
        // buffered messages must still be processed.
        for n in 0..5u8 {
            queue.publish(TOPIC, &[n]).await.unwrap();
        }
        shutdown_tx.send(()).unwrap();

        let summary = consume(
            Arc::new(queue.clone()),
            TOPIC,
            handler.clone(),
            shutdown_rx,
        )
        .await
        .unwrap();

        assert_eq!(summary.handled, 5);
        assert_eq!(queue.pending(TOPIC).await, 0);
    }

    #[tokio::test]
    async fn test_publish_after_shutdown_is_rejected() {
        let queue = MemoryQueue::default();
        let handler = Arc::new(RecordingHandler::default());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        shutdown_tx.send(()).unwrap();

        consume(Arc::new(queue.clone()), TOPIC, handler, shutdown_rx)
            .await
            .unwrap();

        assert!(queue.publish(TOPIC, b"late").await.is_err());
    }

    #[tokio::test]
    async fn test_second_consumer_fails_to_start() {
        let queue: Arc<dyn Queue> = Arc::new(MemoryQueue::default());
        let handler = Arc::new(RecordingHandler::default());
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let _rx = queue.subscribe(TOPIC).await.unwrap();
        let result = consume(queue, TOPIC, handler, shutdown_tx.subscribe()).await;

        assert!(result.is_err());
    }
}
