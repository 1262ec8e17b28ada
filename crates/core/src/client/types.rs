use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client record: the single aggregate managed by clientdesk.
///
/// `email` and `phone` are unique across all stored clients. The `id` is
/// assigned once at construction and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates a new client with a fresh identifier and timestamps.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if both clients carry the same business fields.
    ///
    /// Identity and timestamps are ignored.
    pub fn same_fields_as(&self, other: &Client) -> bool {
        self.name == other.name && self.email == other.email && self.phone == other.phone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_fresh_ids() {
        let a = Client::new("Ana", "ana@x.com", "11999990000");
        let b = Client::new("Ana", "ana@x.com", "11999990000");

        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn test_same_fields_ignores_identity() {
        let a = Client::new("Ana", "ana@x.com", "11999990000");
        let b = Client::new("Ana", "ana@x.com", "11999990000");
        let c = Client::new("Bia", "ana@x.com", "11999990000");

        assert!(a.same_fields_as(&b));
        assert!(!a.same_fields_as(&c));
    }
}
