//! Request payloads for client operations.
//!
//! Transport-agnostic input shapes. They are never persisted and are only
//! validated indirectly through the [`Client`] they populate.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::types::Client;

/// Request payload for creating a new client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CreateClientRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Convert into a new Client with a fresh id and timestamps.
    ///
    /// Business fields are trimmed.
    pub fn into_client(self) -> Client {
        Client::new(self.name.trim(), self.email.trim(), self.phone.trim())
    }
}

/// Request payload for replacing the business fields of a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl UpdateClientRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Apply updates to an existing client in place.
    ///
    /// All three business fields are replaced and `updated_at` is refreshed.
    pub fn apply_to(self, client: &mut Client) {
        client.name = self.name.trim().to_string();
        client.email = self.email.trim().to_string();
        client.phone = self.phone.trim().to_string();
        client.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_client_trims_fields() {
        let request = CreateClientRequest::new("  Ana ", " ana@x.com ", " 11999990000 ");

        let client = request.into_client();

        assert_eq!(client.name, "Ana");
        assert_eq!(client.email, "ana@x.com");
        assert_eq!(client.phone, "11999990000");
    }

    #[test]
    fn test_apply_to_keeps_identity() {
        let mut client = Client::new("Ana", "ana@x.com", "11999990000");
        let id = client.id;
        let created_at = client.created_at;

        UpdateClientRequest::new("Bia", "bia@x.com", "21988887777").apply_to(&mut client);

        assert_eq!(client.id, id);
        assert_eq!(client.created_at, created_at);
        assert_eq!(client.name, "Bia");
        assert_eq!(client.email, "bia@x.com");
        assert_eq!(client.phone, "21988887777");
        assert!(client.updated_at >= created_at);
    }

    #[test]
    fn test_request_deserializes_from_json() {
        let json = r#"{"name":"Ana","email":"ana@x.com","phone":"11999990000"}"#;

        let request: CreateClientRequest = serde_json::from_str(json).unwrap();

        assert_eq!(
            request,
            CreateClientRequest::new("Ana", "ana@x.com", "11999990000")
        );
    }
}
