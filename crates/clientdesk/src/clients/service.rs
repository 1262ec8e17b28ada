//! Client lifecycle service.
//!
//! Uniqueness of email and phone is pre-checked through the cache-aside
//! read path. The check and the write are not atomic: two concurrent
//! creates can both pass the check, and the repository's own uniqueness
//! enforcement decides which one lands.

use std::sync::Arc;

use uuid::Uuid;

use clientdesk_core::client::{Client, ClientError, CreateClientRequest, UpdateClientRequest};
use clientdesk_core::storage::{ClientRepository, PaginatedResult, RepositoryError};

use super::cache::ClientCache;

/// Largest page size accepted by [`ClientService::find_paginated`].
pub const MAX_PAGE_LIMIT: usize = 100;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Orchestrates client create/read/update/delete over a repository and a
/// best-effort cache.
#[derive(Clone)]
pub struct ClientService {
    repository: Arc<dyn ClientRepository>,
    cache: ClientCache,
}

impl ClientService {
    pub fn new(repository: Arc<dyn ClientRepository>, cache: ClientCache) -> Self {
        Self { repository, cache }
    }

    /// Creates a client after checking that its email and phone are unused.
    pub async fn create(&self, request: CreateClientRequest) -> Result<Client> {
        let client = request.into_client();

        let (same_email, same_phone) = tokio::join!(
            self.find_by_email_with_cache(&client.email),
            self.find_by_phone_with_cache(&client.phone),
        );
        if same_email?.is_some() {
            return Err(ClientError::email_in_use());
        }
        if same_phone?.is_some() {
            return Err(ClientError::phone_in_use());
        }

        client.validate().map_err(ClientError::invalid_client)?;

        let saved = self.repository.save(&client).await?;
        tracing::info!(client_id = %saved.id, "Client created");
        Ok(saved)
    }

    /// Replaces the business fields of an existing client.
    ///
    /// Keeping its own email or phone is not a conflict.
    pub async fn update(&self, id: Uuid, request: UpdateClientRequest) -> Result<Client> {
        let mut client = self
            .find_by_id_with_cache(id)
            .await?
            .ok_or_else(ClientError::not_found)?;

        let (same_email, same_phone) = tokio::join!(
            self.find_by_email_with_cache(request.email.trim()),
            self.find_by_phone_with_cache(request.phone.trim()),
        );
        if same_email?.is_some_and(|other| other.id != client.id) {
            return Err(ClientError::email_taken_by_other());
        }
        if same_phone?.is_some_and(|other| other.id != client.id) {
            return Err(ClientError::phone_taken_by_other());
        }

        request.apply_to(&mut client);
        client.validate().map_err(ClientError::invalid_client)?;

        // The record may have been deleted since it was read.
        let updated = self
            .repository
            .update(id, &client)
            .await
            .map_err(update_conflict)?
            .ok_or_else(ClientError::not_found)?;
        tracing::info!(client_id = %id, "Client updated");
        Ok(updated)
    }

    /// Returns the client with `id`, failing with `NotFound` if absent.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Client> {
        self.find_by_id_with_cache(id)
            .await?
            .ok_or_else(ClientError::not_found)
    }

    /// Cache-aside lookup by id. Absence is not an error.
    pub async fn find_by_id_with_cache(&self, id: Uuid) -> Result<Option<Client>> {
        if let Some(cached) = self.cache.get_by_id(id).await {
            return Ok(Some(cached));
        }

        let client = self.repository.find_by_id(id).await?;
        if let Some(ref c) = client {
            self.cache.set_by_id(c).await;
        }
        Ok(client)
    }

    /// Cache-aside lookup by email. Only the email namespace is populated.
    pub async fn find_by_email_with_cache(&self, email: &str) -> Result<Option<Client>> {
        if let Some(cached) = self.cache.get_by_email(email).await {
            return Ok(Some(cached));
        }

        let client = self.repository.find_by_email(email).await?;
        if let Some(ref c) = client {
            self.cache.set_by_email(c).await;
        }
        Ok(client)
    }

    /// Cache-aside lookup by phone. Only the phone namespace is populated.
    pub async fn find_by_phone_with_cache(&self, phone: &str) -> Result<Option<Client>> {
        if let Some(cached) = self.cache.get_by_phone(phone).await {
            return Ok(Some(cached));
        }

        let client = self.repository.find_by_phone(phone).await?;
        if let Some(ref c) = client {
            self.cache.set_by_phone(c).await;
        }
        Ok(client)
    }

    /// Returns one page of clients. Pages are never cached.
    ///
    /// `page` is 1-based; `limit` may not exceed [`MAX_PAGE_LIMIT`].
    pub async fn find_paginated(
        &self,
        page: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Client>> {
        if page == 0 {
            return Err(ClientError::BadRequest(
                "The pagination 'page' parameter must be greater than 0".to_string(),
            ));
        }
        if limit > MAX_PAGE_LIMIT {
            return Err(ClientError::BadRequest(format!(
                "The pagination 'limit' parameter cannot be greater than {MAX_PAGE_LIMIT}"
            )));
        }

        Ok(self.repository.find_paginated(page, limit).await?)
    }

    /// Deletes a client. Cached copies are left to expire.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repository.delete(id).await?;
        tracing::info!(client_id = %id, "Client deleted");
        Ok(())
    }
}

/// Storage-level conflicts on update carry the same messages as the
/// service-level check in [`ClientService::update`].
fn update_conflict(err: RepositoryError) -> ClientError {
    match err {
        RepositoryError::Conflict { field: "email", .. } => ClientError::email_taken_by_other(),
        RepositoryError::Conflict { field: "phone", .. } => ClientError::phone_taken_by_other(),
        other => other.into(),
    }
}
