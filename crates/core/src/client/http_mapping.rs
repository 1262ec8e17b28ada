//! Pure functions for mapping client errors to HTTP-style status codes.
//!
//! The codes give every [`ErrorKind`] a distinct outward category regardless
//! of the transport fronting the service.

use crate::storage::repository_error_to_status_code;

use super::ClientError;

/// Maps a [`ClientError`] to a status code.
///
/// - `Validation` -> 422 (Unprocessable Entity)
/// - `Conflict` -> 409 (Conflict)
/// - `NotFound` -> 404 (Not Found)
/// - `BadRequest` -> 400 (Bad Request)
/// - `NotificationDispatch` -> 500 (Internal Server Error)
/// - `Storage` -> delegated to [`repository_error_to_status_code`]
///
/// # Examples
///
/// ```
/// use clientdesk_core::client::{client_error_to_status_code, ClientError};
///
/// assert_eq!(client_error_to_status_code(&ClientError::not_found()), 404);
/// assert_eq!(client_error_to_status_code(&ClientError::email_in_use()), 409);
/// ```
pub fn client_error_to_status_code(error: &ClientError) -> u16 {
    match error {
        ClientError::Validation { .. } => 422,
        ClientError::Conflict(_) => 409,
        ClientError::NotFound(_) => 404,
        ClientError::BadRequest(_) => 400,
        ClientError::NotificationDispatch(_) => 500,
        ClientError::Storage(err) => repository_error_to_status_code(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FieldErrors;
    use crate::storage::RepositoryError;

    #[test]
    fn test_validation_maps_to_422() {
        let error = ClientError::invalid_client(FieldErrors::new());
        assert_eq!(client_error_to_status_code(&error), 422);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        assert_eq!(client_error_to_status_code(&ClientError::phone_in_use()), 409);
    }

    #[test]
    fn test_bad_request_maps_to_400() {
        let error = ClientError::BadRequest("page must be greater than 0".to_string());
        assert_eq!(client_error_to_status_code(&error), 400);
    }

    #[test]
    fn test_dispatch_failure_maps_to_500() {
        let error = ClientError::welcome_dispatch_failed();
        assert_eq!(client_error_to_status_code(&error), 500);
    }

    #[test]
    fn test_storage_connection_failure_maps_to_503() {
        let error = ClientError::Storage(RepositoryError::ConnectionFailed("down".to_string()));
        assert_eq!(client_error_to_status_code(&error), 503);
    }
}
