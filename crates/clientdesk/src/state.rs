//! Application state: the composition root.
//!
//! Builds the adapters selected by feature flags, wires them into the
//! client controller, and owns the welcome consumer's shutdown signal.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use clientdesk_core::cache::Cache;
use clientdesk_core::queue::{self, Queue, WELCOME_EMAIL_TOPIC};
use clientdesk_core::storage::ClientRepository;

use crate::clients::{
    ClientCache, ClientController, ClientService, WelcomeEmailHandler, WelcomeNotifier,
};
use crate::config::Config;
use crate::queue::{consume, ConsumeSummary};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub controller: ClientController,
    queue: Arc<dyn Queue>,
    /// Shutdown signal sender for background consumers.
    shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Creates an AppState from already-constructed adapters.
    pub fn build(
        repository: Arc<dyn ClientRepository>,
        cache: Arc<dyn Cache>,
        queue: Arc<dyn Queue>,
        config: &Config,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let service = ClientService::new(repository, ClientCache::new(cache, config.cache_ttl()));
        let notifier = WelcomeNotifier::new(queue.clone());

        Self {
            controller: ClientController::new(service, notifier),
            queue,
            shutdown_tx,
        }
    }

    /// Starts the welcome email consumer.
    ///
    /// Call once, after the state is built. The task runs until
    /// [`signal_shutdown`](Self::signal_shutdown), then drains buffered
    /// messages and returns.
    pub fn spawn_welcome_consumer(&self) -> JoinHandle<queue::Result<ConsumeSummary>> {
        let queue = self.queue.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            consume(
                queue,
                WELCOME_EMAIL_TOPIC,
                Arc::new(WelcomeEmailHandler),
                shutdown_rx,
            )
            .await
        })
    }

    /// Signal background consumers to stop.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::queue::MemoryQueue;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache and queue.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repository = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
            let queue = Arc::new(MemoryQueue::new(config.queue_capacity));

            Ok(Self::build(repository, cache, queue, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::queue::RedisQueue;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache and queue.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repository = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
            let queue = Arc::new(RedisQueue::new(&config.redis_url, config.queue_capacity).await?);

            Ok(Self::build(repository, cache, queue, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::queue::MemoryQueue;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage, cache and queue.
        /// Useful for trying the CLI without any external dependencies.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repository = Arc::new(InMemoryRepository::new());
            let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
            let queue = Arc::new(MemoryQueue::new(config.queue_capacity));

            Ok(Self::build(repository, cache, queue, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::queue::RedisQueue;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache and queue.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repository = Arc::new(InMemoryRepository::new());
            let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
            let queue = Arc::new(RedisQueue::new(&config.redis_url, config.queue_capacity).await?);

            Ok(Self::build(repository, cache, queue, config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use clientdesk_core::client::{CreateClientRequest, ErrorKind};

    use crate::cache::MemoryCache;
    use crate::queue::MemoryQueue;
    use crate::storage::InMemoryRepository;

    fn test_config() -> Config {
        Config {
            cache_ttl_seconds: 60,
            cache_max_entries: 100,
            queue_capacity: 10,
            sqlite_path: ":memory:".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            log_json: false,
        }
    }

    fn test_state(queue: MemoryQueue) -> AppState {
        AppState::build(
            Arc::new(InMemoryRepository::new()),
            Arc::new(MemoryCache::new(100)),
            Arc::new(queue),
            &test_config(),
        )
    }

    #[tokio::test]
    async fn test_created_clients_are_welcomed_before_shutdown_completes() {
        let queue = MemoryQueue::default();
        let state = test_state(queue.clone());
        let consumer = state.spawn_welcome_consumer();

        for n in 0..3 {
            state
                .controller
                .create(CreateClientRequest::new(
                    format!("Client {n}"),
                    format!("client{n}@example.com"),
                    format!("1199999000{n}"),
                ))
                .await
                .unwrap();
        }
        state.signal_shutdown();
        let summary = tokio::time::timeout(Duration::from_secs(5), consumer)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert_eq!(summary.handled, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(queue.pending(WELCOME_EMAIL_TOPIC).await, 0);
    }

    #[tokio::test]
    async fn test_create_after_shutdown_reports_dispatch_failure() {
        let state = test_state(MemoryQueue::default());
        let consumer = state.spawn_welcome_consumer();
        state.signal_shutdown();
        consumer.await.unwrap().unwrap();

        let err = state
            .controller
            .create(CreateClientRequest::new("Ana", "ana@x.com", "11999990000"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotificationDispatch);
        assert_eq!(state.controller.find_paginated(1, 10).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_cache_ttl_comes_from_config() {
        let mut config = test_config();
        config.cache_ttl_seconds = 0;
        let repository = Arc::new(InMemoryRepository::new());
        let state = AppState::build(
            repository.clone(),
            Arc::new(MemoryCache::new(100)),
            Arc::new(MemoryQueue::default()),
            &config,
        );
        let client = state
            .controller
            .create(CreateClientRequest::new("Ana", "ana@x.com", "11999990000"))
            .await
            .unwrap();
        state.controller.find_by_id(client.id).await.unwrap();

        // Zero TTL: the cached copy is already stale, so the deletion shows.
        repository.delete(client.id).await.unwrap();
        let err = state.controller.find_by_id(client.id).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
