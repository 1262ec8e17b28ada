use thiserror::Error;

use crate::storage::RepositoryError;

use super::validation::FieldErrors;

/// Outward error category of a failed client operation.
///
/// Each kind maps to a distinct status so callers can tell bad input,
/// duplicates, missing records and infrastructure failures apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    BadRequest,
    NotificationDispatch,
    Storage,
}

impl ErrorKind {
    /// Stable snake_case name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotificationDispatch => "notification_dispatch",
            ErrorKind::Storage => "storage",
        }
    }
}

/// Errors surfaced by client lifecycle operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("{message}: {errors}")]
    Validation { message: String, errors: FieldErrors },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotificationDispatch(String),
    #[error(transparent)]
    Storage(RepositoryError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Conflict(_) => ErrorKind::Conflict,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::BadRequest(_) => ErrorKind::BadRequest,
            ClientError::NotificationDispatch(_) => ErrorKind::NotificationDispatch,
            ClientError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn invalid_client(errors: FieldErrors) -> Self {
        ClientError::Validation {
            message: "Invalid client data".to_string(),
            errors,
        }
    }

    pub fn not_found() -> Self {
        ClientError::NotFound("Client not found".to_string())
    }

    pub fn email_in_use() -> Self {
        ClientError::Conflict("The provided email is already in use".to_string())
    }

    pub fn phone_in_use() -> Self {
        ClientError::Conflict("The provided phone is already in use".to_string())
    }

    pub fn email_taken_by_other() -> Self {
        ClientError::Conflict("Another client already has this email registered".to_string())
    }

    pub fn phone_taken_by_other() -> Self {
        ClientError::Conflict("Another client already has this phone registered".to_string())
    }

    pub fn welcome_dispatch_failed() -> Self {
        ClientError::NotificationDispatch("Unable to send welcome email".to_string())
    }

    /// Returns the per-field messages of a validation error.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Storage-level uniqueness violations become conflicts; everything else
/// is an infrastructure failure.
impl From<RepositoryError> for ClientError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { field: "email", .. } => ClientError::email_in_use(),
            RepositoryError::Conflict { field: "phone", .. } => ClientError::phone_in_use(),
            RepositoryError::Conflict { entity_type, .. } => {
                ClientError::Conflict(format!("{entity_type} already exists"))
            }
            other => ClientError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_discriminates_every_variant() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name is required");

        let cases = [
            (ClientError::invalid_client(errors), ErrorKind::Validation),
            (ClientError::email_in_use(), ErrorKind::Conflict),
            (ClientError::not_found(), ErrorKind::NotFound),
            (ClientError::BadRequest("bad".to_string()), ErrorKind::BadRequest),
            (
                ClientError::welcome_dispatch_failed(),
                ErrorKind::NotificationDispatch,
            ),
            (
                ClientError::Storage(RepositoryError::QueryFailed("boom".to_string())),
                ErrorKind::Storage,
            ),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind);
        }
    }

    #[test]
    fn test_validation_display_includes_fields() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Invalid email");

        let error = ClientError::invalid_client(errors);

        assert_eq!(error.to_string(), "Invalid client data: email: Invalid email");
        assert!(error.field_errors().unwrap().contains("email"));
    }

    #[test]
    fn test_repository_conflict_maps_to_field_conflict() {
        let email = ClientError::from(RepositoryError::Conflict {
            entity_type: "Client",
            field: "email",
        });
        let phone = ClientError::from(RepositoryError::Conflict {
            entity_type: "Client",
            field: "phone",
        });
        let id = ClientError::from(RepositoryError::Conflict {
            entity_type: "Client",
            field: "id",
        });

        assert_eq!(email, ClientError::email_in_use());
        assert_eq!(phone, ClientError::phone_in_use());
        assert_eq!(id, ClientError::Conflict("Client already exists".to_string()));
    }

    #[test]
    fn test_other_repository_errors_map_to_storage() {
        let error = ClientError::from(RepositoryError::ConnectionFailed("down".to_string()));

        assert_eq!(error.kind(), ErrorKind::Storage);
        assert_eq!(error.to_string(), "Connection failed: down");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::NotificationDispatch.as_str(), "notification_dispatch");
    }
}
