use async_trait::async_trait;
use uuid::Uuid;

use crate::client::Client;

use super::{PaginatedResult, Result};

/// Durable storage for clients.
///
/// The repository is the single source of truth. Implementations must
/// enforce email and phone uniqueness atomically with `save` and `update`,
/// reporting violations as [`RepositoryError::Conflict`](super::RepositoryError::Conflict).
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Persists a new client and returns the stored value.
    async fn save(&self, client: &Client) -> Result<Client>;

    /// Replaces the stored client with the given id.
    ///
    /// Returns `None` if no client with that id exists.
    async fn update(&self, id: Uuid, client: &Client) -> Result<Option<Client>>;

    /// Deletes a client by its ID. Deleting an unknown id is not an error.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Gets a client by its ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>>;

    /// Gets a client by its email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Client>>;

    /// Gets a client by its phone number.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Client>>;

    /// Gets one page of clients in a stable, implementation-defined order.
    ///
    /// `page` is 1-based; see [`page_offset`](super::page_offset).
    async fn find_paginated(&self, page: usize, limit: usize) -> Result<PaginatedResult<Client>>;
}
