//! Outward rendering of client errors for the CLI.

use serde::Serialize;

use clientdesk_core::client::{client_error_to_status_code, ClientError, ErrorKind, FieldErrors};

/// Error document written to stderr when an operation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// HTTP-equivalent status code.
    pub code: u16,
    pub kind: &'static str,
    pub message: String,
    /// Per-field messages, present for validation errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl From<&ClientError> for ErrorBody {
    fn from(err: &ClientError) -> Self {
        let message = match err {
            ClientError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };

        Self {
            code: client_error_to_status_code(err),
            kind: err.kind().as_str(),
            message,
            errors: err.field_errors().cloned(),
        }
    }
}

/// Process exit code for a failed operation, one per error kind.
pub fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 10,
        ErrorKind::Conflict => 11,
        ErrorKind::NotFound => 12,
        ErrorKind::BadRequest => 13,
        ErrorKind::NotificationDispatch => 14,
        ErrorKind::Storage => 15,
    }
}
