mod error;
mod keys;
mod traits;

pub use error::{HandlerError, QueueError, Result};
pub use keys::WELCOME_EMAIL_TOPIC;
pub use traits::{Delivery, MessageHandler, Queue};
