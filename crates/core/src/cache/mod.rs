mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{client_email_key, client_id_key, client_phone_key};
pub use serialization::{deserialize_client, serialize_client, SerializationError};
pub use traits::Cache;
