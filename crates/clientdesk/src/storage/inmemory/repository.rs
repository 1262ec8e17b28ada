//! In-memory repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use clientdesk_core::client::Client;
use clientdesk_core::storage::{
    page_offset, ClientRepository, PaginatedResult, RepositoryError, Result,
};

const ENTITY: &str = "Client";

/// In-memory storage backend.
///
/// Clients live in a `Vec` so listing follows insertion order. Email and
/// phone uniqueness is checked while holding the write lock, which makes
/// the check and the write a single atomic step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    clients: Arc<RwLock<Vec<Client>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Returns the first unique field of `client` already held by a record
/// other than `client` itself.
fn conflicting_field(clients: &[Client], client: &Client) -> Option<&'static str> {
    let others = || clients.iter().filter(|c| c.id != client.id);
    if others().any(|c| c.email == client.email) {
        Some("email")
    } else if others().any(|c| c.phone == client.phone) {
        Some("phone")
    } else {
        None
    }
}

#[async_trait]
impl ClientRepository for InMemoryRepository {
    async fn save(&self, client: &Client) -> Result<Client> {
        let mut clients = self.clients.write().await;

        if clients.iter().any(|c| c.id == client.id) {
            return Err(RepositoryError::Conflict {
                entity_type: ENTITY,
                field: "id",
            });
        }
        if let Some(field) = conflicting_field(&clients, client) {
            return Err(RepositoryError::Conflict {
                entity_type: ENTITY,
                field,
            });
        }

        clients.push(client.clone());
        Ok(client.clone())
    }

    async fn update(&self, id: Uuid, client: &Client) -> Result<Option<Client>> {
        let mut clients = self.clients.write().await;

        let Some(index) = clients.iter().position(|c| c.id == id) else {
            return Ok(None);
        };

        let mut updated = client.clone();
        updated.id = id;
        if let Some(field) = conflicting_field(&clients, &updated) {
            return Err(RepositoryError::Conflict {
                entity_type: ENTITY,
                field,
            });
        }

        clients[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut clients = self.clients.write().await;
        clients.retain(|c| c.id != id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.iter().find(|c| c.email == email).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.iter().find(|c| c.phone == phone).cloned())
    }

    async fn find_paginated(&self, page: usize, limit: usize) -> Result<PaginatedResult<Client>> {
        let clients = self.clients.read().await;
        let data: Vec<Client> = clients
            .iter()
            .skip(page_offset(page, limit))
            .take(limit)
            .cloned()
            .collect();
        Ok(PaginatedResult::new(page, limit, clients.len(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(n: usize) -> Client {
        Client::new(
            format!("Client {n}"),
            format!("client{n}@example.com"),
            format!("1199999{n:04}"),
        )
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let repo = InMemoryRepository::new();
        let ana = Client::new("Ana", "ana@x.com", "11999990000");

        let saved = repo.save(&ana).await.unwrap();

        assert_eq!(saved, ana);
        assert_eq!(repo.find_by_id(ana.id).await.unwrap(), Some(ana));
    }

    #[tokio::test]
    async fn test_find_by_email_and_phone() {
        let repo = InMemoryRepository::new();
        let ana = Client::new("Ana", "ana@x.com", "11999990000");
        repo.save(&ana).await.unwrap();

        assert_eq!(
            repo.find_by_email("ana@x.com").await.unwrap(),
            Some(ana.clone())
        );
        assert_eq!(repo.find_by_phone("11999990000").await.unwrap(), Some(ana));
        assert_eq!(repo.find_by_email("bob@x.com").await.unwrap(), None);
        assert_eq!(repo.find_by_phone("21999990000").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_duplicate_email_conflicts() {
        let repo = InMemoryRepository::new();
        repo.save(&Client::new("Ana", "ana@x.com", "11999990000"))
            .await
            .unwrap();

        let result = repo
            .save(&Client::new("Other", "ana@x.com", "21999990000"))
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::Conflict {
                entity_type: "Client",
                field: "email"
            })
        );
    }

    #[tokio::test]
    async fn test_save_duplicate_phone_conflicts() {
        let repo = InMemoryRepository::new();
        repo.save(&Client::new("Ana", "ana@x.com", "11999990000"))
            .await
            .unwrap();

        let result = repo
            .save(&Client::new("Bob", "bob@x.com", "11999990000"))
            .await;

        assert_eq!(
            result,
            Err(RepositoryError::Conflict {
                entity_type: "Client",
                field: "phone"
            })
        );
        assert_eq!(repo.find_paginated(1, 10).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let repo = InMemoryRepository::new();
        let ana = Client::new("Ana", "ana@x.com", "11999990000");
        repo.save(&ana).await.unwrap();

        let mut changed = ana.clone();
        changed.name = "Ana Maria".to_string();
        let updated = repo.update(ana.id, &changed).await.unwrap().unwrap();

        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(
            repo.find_by_id(ana.id).await.unwrap().unwrap().name,
            "Ana Maria"
        );
    }

    #[tokio::test]
    async fn test_update_keeping_own_email_is_not_a_conflict() {
        let repo = InMemoryRepository::new();
        let ana = Client::new("Ana", "ana@x.com", "11999990000");
        repo.save(&ana).await.unwrap();

        let result = repo.update(ana.id, &ana).await;

        assert!(matches!(result, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_update_to_other_clients_email_conflicts() {
        let repo = InMemoryRepository::new();
        let ana = Client::new("Ana", "ana@x.com", "11999990000");
        let bob = Client::new("Bob", "bob@x.com", "21999990000");
        repo.save(&ana).await.unwrap();
        repo.save(&bob).await.unwrap();

        let mut changed = bob.clone();
        changed.email = "ana@x.com".to_string();
        let result = repo.update(bob.id, &changed).await;

        assert!(matches!(
            result,
            Err(RepositoryError::Conflict { field: "email", .. })
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_id_returns_none() {
        let repo = InMemoryRepository::new();
        let ghost = Client::new("Ghost", "ghost@x.com", "11999990000");

        assert_eq!(repo.update(ghost.id, &ghost).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = InMemoryRepository::new();
        let ana = Client::new("Ana", "ana@x.com", "11999990000");
        repo.save(&ana).await.unwrap();

        repo.delete(ana.id).await.unwrap();
        repo.delete(ana.id).await.unwrap();

        assert_eq!(repo.find_by_id(ana.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_paginated_follows_insertion_order() {
        let repo = InMemoryRepository::new();
        for n in 0..50 {
            repo.save(&client(n)).await.unwrap();
        }

        let page = repo.find_paginated(2, 20).await.unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 20);
        assert_eq!(page.total, 50);
        assert_eq!(page.results, 20);
        assert_eq!(page.data[0].name, "Client 20");
        assert_eq!(page.data[19].name, "Client 39");
    }

    #[tokio::test]
    async fn test_paginated_last_partial_page() {
        let repo = InMemoryRepository::new();
        for n in 0..50 {
            repo.save(&client(n)).await.unwrap();
        }

        let page = repo.find_paginated(3, 20).await.unwrap();

        assert_eq!(page.results, 10);
        assert_eq!(page.total, 50);
    }

    #[tokio::test]
    async fn test_paginated_past_the_end_is_empty() {
        let repo = InMemoryRepository::new();
        repo.save(&client(1)).await.unwrap();

        let page = repo.find_paginated(5, 10).await.unwrap();

        assert_eq!(page.results, 0);
        assert!(page.data.is_empty());
        assert_eq!(page.total, 1);
    }
}
