//! Redis queue implementation.
//!
//! - `publish`: `LPUSH queue:{topic}`
//! - delivery: `BRPOPLPUSH queue:{topic} queue:{topic}:processing`
//! - `ack`: `LREM queue:{topic}:processing 1 payload`
//!
//! One consumer per topic across all processes: `subscribe` claims
//! `queue:{topic}:consumer` with `SET NX PX` and the delivery loop keeps
//! renewing it. A consumer that dies between delivery and ack leaves the
//! message in the processing list; the next lock holder moves it back onto
//! the topic.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionLike;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use clientdesk_core::queue::{Delivery, Queue, QueueError, Result};

/// Seconds a `BRPOPLPUSH` blocks before re-checking the consumer.
const POLL_TIMEOUT_SECS: f64 = 1.0;

/// Backoff after a failed poll.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Lifetime of the consumer lock. Renewed after every poll.
const CONSUMER_LOCK_TTL_MS: u64 = 10_000;

const RENEW_LOCK: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("PEXPIRE", KEYS[1], ARGV[2])
end
return 0
"#;

const RELEASE_LOCK: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

fn queue_key(topic: &str) -> String {
    format!("queue:{}", topic)
}

fn processing_key(topic: &str) -> String {
    format!("queue:{}:processing", topic)
}

fn consumer_lock_key(topic: &str) -> String {
    format!("queue:{}:consumer", topic)
}

/// Maps Redis errors to QueueError.
fn map_redis_error(err: redis::RedisError) -> QueueError {
    if err.is_connection_refusal() || err.is_timeout() || err.is_connection_dropped() {
        QueueError::ConnectionFailed(err.to_string())
    } else {
        QueueError::SubscribeFailed(err.to_string())
    }
}

/// Cross-process claim on a topic, held by a random token.
///
/// Only the holder may renew or release it.
struct ConsumerLock {
    key: String,
    token: String,
}

impl ConsumerLock {
    /// Returns `None` when another consumer holds the topic.
    async fn acquire<C: ConnectionLike>(conn: &mut C, topic: &str) -> Result<Option<Self>> {
        let lock = Self {
            key: consumer_lock_key(topic),
            token: Uuid::new_v4().to_string(),
        };
        let reply: Option<String> = redis::cmd("SET")
            .arg(&lock.key)
            .arg(&lock.token)
            .arg("NX")
            .arg("PX")
            .arg(CONSUMER_LOCK_TTL_MS)
            .query_async(conn)
            .await
            .map_err(map_redis_error)?;

        Ok(reply.map(|_| lock))
    }

    /// Extends the lock. `false` means it expired and someone else may hold it.
    async fn renew<C: ConnectionLike>(&self, conn: &mut C) -> redis::RedisResult<bool> {
        let renewed: i64 = redis::Script::new(RENEW_LOCK)
            .key(&self.key)
            .arg(&self.token)
            .arg(CONSUMER_LOCK_TTL_MS)
            .invoke_async(conn)
            .await?;
        Ok(renewed == 1)
    }

    async fn release<C: ConnectionLike>(&self, conn: &mut C) {
        let released: redis::RedisResult<i64> = redis::Script::new(RELEASE_LOCK)
            .key(&self.key)
            .arg(&self.token)
            .invoke_async(conn)
            .await;
        if let Err(e) = released {
            warn!(key = %self.key, error = %e, "Failed to release consumer lock");
        }
    }
}

/// Redis queue backend.
///
/// Publishing and acking share a connection manager. Each subscription runs
/// on its own connection since `BRPOPLPUSH` blocks it.
#[derive(Clone)]
pub struct RedisQueue {
    client: redis::Client,
    conn: redis::aio::ConnectionManager,
    capacity: usize,
}

impl RedisQueue {
    /// Connects to Redis.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `capacity` - Deliveries buffered locally per subscription
    ///
    /// # Errors
    ///
    /// Returns `QueueError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str, capacity: usize) -> Result<Self> {
        let client =
            redis::Client::open(url).map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;
        let conn = redis::aio::ConnectionManager::new(client.clone())
            .await
            .map_err(|e| QueueError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            conn,
            capacity: capacity.max(1),
        })
    }

    /// Moves messages stranded in the processing list back onto the topic.
    ///
    /// Only the consumer lock holder calls this.
    async fn requeue_unacked(&self, topic: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let processing = processing_key(topic);
        let queue = queue_key(topic);
        let mut moved = 0;

        loop {
            let item: Option<Vec<u8>> = redis::cmd("RPOPLPUSH")
                .arg(&processing)
                .arg(&queue)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;
            if item.is_none() {
                return Ok(moved);
            }
            moved += 1;
        }
    }
}

#[async_trait]
impl Queue for RedisQueue {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(queue_key(topic), payload)
            .await
            .map_err(|e| QueueError::PublishFailed(e.to_string()))
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<Delivery>> {
        let mut conn = self.conn.clone();
        let Some(lock) = ConsumerLock::acquire(&mut conn, topic).await? else {
            return Err(QueueError::AlreadyConsuming(topic.to_string()));
        };

        let setup = async {
            let moved = self.requeue_unacked(topic).await?;
            if moved > 0 {
                info!(topic, moved, "Requeued unacknowledged messages");
            }
            self.client
                .get_multiplexed_async_connection()
                .await
                .map_err(map_redis_error)
        };
        let mut consumer_conn = match setup.await {
            Ok(consumer_conn) => consumer_conn,
            Err(e) => {
                lock.release(&mut conn).await;
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::channel(self.capacity);
        let topic = topic.to_string();

        tokio::spawn(async move {
            run_delivery_loop(&mut consumer_conn, &topic, &lock, tx).await;
            lock.release(&mut consumer_conn).await;
            debug!(topic = %topic, "Redis delivery loop stopped");
        });

        Ok(rx)
    }

    async fn ack(&self, delivery: &Delivery) -> Result<()> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn
            .lrem(processing_key(&delivery.topic), 1, delivery.payload.as_slice())
            .await
            .map_err(|e| QueueError::AckFailed(e.to_string()))?;

        if removed == 0 {
            return Err(QueueError::AckFailed(format!(
                "message not in processing list for '{}'",
                delivery.topic
            )));
        }
        Ok(())
    }
}

/// Forwards messages from Redis into the local channel until the receiver
/// is closed or the consumer lock is lost.
///
/// A message popped after the receiver closed stays in the processing list
/// and is requeued by the next subscriber.
async fn run_delivery_loop(
    conn: &mut redis::aio::MultiplexedConnection,
    topic: &str,
    lock: &ConsumerLock,
    tx: mpsc::Sender<Delivery>,
) {
    let queue = queue_key(topic);
    let processing = processing_key(topic);

    while !tx.is_closed() {
        let item: redis::RedisResult<Option<Vec<u8>>> = redis::cmd("BRPOPLPUSH")
            .arg(&queue)
            .arg(&processing)
            .arg(POLL_TIMEOUT_SECS)
            .query_async(conn)
            .await;

        match item {
            Ok(Some(payload)) => {
                let delivery = Delivery {
                    topic: topic.to_string(),
                    receipt: processing.clone(),
                    payload,
                };
                if tx.send(delivery).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(topic, error = %e, "Redis queue poll failed");
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }

        match lock.renew(conn).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(topic, "Consumer lock lost, stopping deliveries");
                break;
            }
            Err(e) => warn!(topic, error = %e, "Failed to renew consumer lock"),
        }
    }
}
