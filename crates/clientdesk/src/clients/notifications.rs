//! Welcome notification side channel.
//!
//! [`WelcomeNotifier`] publishes one message per created client on
//! [`WELCOME_EMAIL_TOPIC`]; [`WelcomeEmailHandler`] consumes them.

use std::sync::Arc;

use async_trait::async_trait;

use clientdesk_core::client::{Client, ClientError};
use clientdesk_core::queue::{HandlerError, MessageHandler, Queue, WELCOME_EMAIL_TOPIC};

/// Publishes welcome messages.
#[derive(Clone)]
pub struct WelcomeNotifier {
    queue: Arc<dyn Queue>,
}

impl WelcomeNotifier {
    pub fn new(queue: Arc<dyn Queue>) -> Self {
        Self { queue }
    }

    /// Enqueues a welcome message for `client`.
    ///
    /// Failures are reported as `NotificationDispatch`.
    pub async fn send_welcome_email(&self, client: &Client) -> Result<(), ClientError> {
        let payload = serde_json::to_vec(client).map_err(|err| {
            tracing::error!(
                client_id = %client.id,
                error = %err,
                "Failed to encode welcome message"
            );
            ClientError::welcome_dispatch_failed()
        })?;

        self.queue
            .publish(WELCOME_EMAIL_TOPIC, &payload)
            .await
            .map_err(|err| {
                tracing::error!(
                    client_id = %client.id,
                    error = %err,
                    "Failed to publish welcome message"
                );
                ClientError::welcome_dispatch_failed()
            })?;

        tracing::debug!(client_id = %client.id, "Welcome message queued");
        Ok(())
    }
}

/// Consumes welcome messages.
///
/// Email delivery is not wired to a provider yet; the handler logs the
/// message it would send.
#[derive(Debug, Clone, Default)]
pub struct WelcomeEmailHandler;

#[async_trait]
impl MessageHandler for WelcomeEmailHandler {
    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError> {
        let client: Client =
            serde_json::from_slice(payload).map_err(|e| HandlerError::Decode(e.to_string()))?;

        tracing::info!(
            client_id = %client.id,
            email = %client.email,
            name = %client.name,
            "Sending welcome email"
        );
        Ok(())
    }
}
