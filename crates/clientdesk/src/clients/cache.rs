//! Cache-aside adapter for clients.
//!
//! Three independent namespaces (`client:id:*`, `client:email:*`,
//! `client:phone:*`) each map to a full client value with a TTL. Nothing is
//! invalidated explicitly; entries age out.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use clientdesk_core::cache::{
    client_email_key, client_id_key, client_phone_key, deserialize_client, serialize_client, Cache,
};
use clientdesk_core::client::Client;

/// Best-effort client cache.
///
/// Backend failures never surface: a failed read is a miss and a failed
/// write is dropped, both logged at `warn`.
#[derive(Clone)]
pub struct ClientCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl ClientCache {
    /// Creates a client cache over `cache` whose entries live for `ttl`.
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<Client> {
        self.get(&client_id_key(id)).await
    }

    pub async fn get_by_email(&self, email: &str) -> Option<Client> {
        self.get(&client_email_key(email)).await
    }

    pub async fn get_by_phone(&self, phone: &str) -> Option<Client> {
        self.get(&client_phone_key(phone)).await
    }

    pub async fn set_by_id(&self, client: &Client) {
        self.set(&client_id_key(client.id), client).await
    }

    pub async fn set_by_email(&self, client: &Client) {
        self.set(&client_email_key(&client.email), client).await
    }

    pub async fn set_by_phone(&self, client: &Client) {
        self.set(&client_phone_key(&client.phone), client).await
    }

    async fn get(&self, key: &str) -> Option<Client> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::trace!(key, "Cache miss for client");
                return None;
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Client cache read failed");
                return None;
            }
        };

        match deserialize_client(&bytes) {
            Ok(client) => {
                tracing::trace!(key, client_id = %client.id, "Cache hit for client");
                Some(client)
            }
            Err(err) => {
                // Deserialization failed - treat as cache miss
                tracing::warn!(key, error = %err, "Cache client deserialization failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, client: &Client) {
        let bytes = match serialize_client(client) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(key, error = %err, "Client serialization failed");
                return;
            }
        };

        if let Err(err) = self.cache.set(key, &bytes, Some(self.ttl)).await {
            tracing::warn!(key, client_id = %client.id, error = %err, "Failed to cache client");
        }
    }
}
