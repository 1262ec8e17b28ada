//! Transport-facing entry point for client operations.

use uuid::Uuid;

use clientdesk_core::client::{Client, CreateClientRequest, UpdateClientRequest};
use clientdesk_core::storage::PaginatedResult;

use super::notifications::WelcomeNotifier;
use super::service::{ClientService, Result};

/// Fronts [`ClientService`] for any transport.
///
/// Creation also queues the welcome notification. A failed publish is
/// reported to the caller but the client stays persisted.
#[derive(Clone)]
pub struct ClientController {
    service: ClientService,
    notifier: WelcomeNotifier,
}

impl ClientController {
    pub fn new(service: ClientService, notifier: WelcomeNotifier) -> Self {
        Self { service, notifier }
    }

    pub async fn create(&self, request: CreateClientRequest) -> Result<Client> {
        let client = self.service.create(request).await?;
        self.notifier.send_welcome_email(&client).await?;
        Ok(client)
    }

    pub async fn update(&self, id: Uuid, request: UpdateClientRequest) -> Result<Client> {
        self.service.update(id, request).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Client> {
        self.service.find_by_id(id).await
    }

    pub async fn find_paginated(
        &self,
        page: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Client>> {
        self.service.find_paginated(page, limit).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.service.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use clientdesk_core::client::ErrorKind;
    use clientdesk_core::queue::{Queue, WELCOME_EMAIL_TOPIC};

    use crate::cache::MemoryCache;
    use crate::clients::ClientCache;
    use crate::queue::MemoryQueue;
    use crate::storage::InMemoryRepository;

    fn controller(queue: MemoryQueue) -> ClientController {
        let cache = ClientCache::new(Arc::new(MemoryCache::new(100)), Duration::from_secs(60));
        let service = ClientService::new(Arc::new(InMemoryRepository::new()), cache);
        ClientController::new(service, WelcomeNotifier::new(Arc::new(queue)))
    }

    fn ana() -> CreateClientRequest {
        CreateClientRequest::new("Ana", "ana@x.com", "11999990000")
    }

    #[tokio::test]
    async fn test_create_queues_one_welcome_message() {
        let queue = MemoryQueue::default();
        let controller = controller(queue.clone());

        let client = controller.create(ana()).await.unwrap();

        assert_eq!(queue.pending(WELCOME_EMAIL_TOPIC).await, 1);
        let mut rx = queue.subscribe(WELCOME_EMAIL_TOPIC).await.unwrap();
        let delivery = rx.recv().await.unwrap();
        let queued: Client = serde_json::from_slice(&delivery.payload).unwrap();
        assert_eq!(queued.id, client.id);
    }

    #[tokio::test]
    async fn test_failed_create_queues_nothing() {
        let queue = MemoryQueue::default();
        let controller = controller(queue.clone());
        controller.create(ana()).await.unwrap();

        let err = controller.create(ana()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(queue.pending(WELCOME_EMAIL_TOPIC).await, 1);
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_client_persisted() {
        let queue = MemoryQueue::default();
        let controller = controller(queue.clone());
        // Closing the consumer side makes every publish fail.
        let mut rx = queue.subscribe(WELCOME_EMAIL_TOPIC).await.unwrap();
        rx.close();

        let err = controller.create(ana()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotificationDispatch);
        let page = controller.find_paginated(1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].email, "ana@x.com");
    }

    #[tokio::test]
    async fn test_update_and_delete_do_not_publish() {
        let queue = MemoryQueue::default();
        let controller = controller(queue.clone());
        let client = controller.create(ana()).await.unwrap();

        controller
            .update(
                client.id,
                UpdateClientRequest::new("Ana Maria", "ana@x.com", "11999990000"),
            )
            .await
            .unwrap();
        controller.delete(client.id).await.unwrap();

        assert_eq!(queue.pending(WELCOME_EMAIL_TOPIC).await, 1);
    }

    #[tokio::test]
    async fn test_find_by_id_delegates() {
        let controller = controller(MemoryQueue::default());
        let client = controller.create(ana()).await.unwrap();

        let found = controller.find_by_id(client.id).await.unwrap();

        assert_eq!(found.id, client.id);
    }
}
