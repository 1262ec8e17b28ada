//! Client lifecycle orchestration.
//!
//! [`ClientService`] composes the cache-aside adapter and the repository;
//! [`ClientController`] adds the welcome notification on creation.

pub mod cache;
pub mod controller;
pub mod notifications;
pub mod service;

pub use cache::ClientCache;
pub use controller::ClientController;
pub use notifications::{WelcomeEmailHandler, WelcomeNotifier};
pub use service::ClientService;
