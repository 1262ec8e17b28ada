mod error;
mod http_mapping;
mod requests;
mod types;
mod validation;

pub use error::{ClientError, ErrorKind};
pub use http_mapping::client_error_to_status_code;
pub use requests::{CreateClientRequest, UpdateClientRequest};
pub use types::Client;
pub use validation::{
    FieldErrors, NAME_MAX_LEN, NAME_MIN_LEN, PHONE_MAX_LEN, PHONE_MIN_LEN,
};
