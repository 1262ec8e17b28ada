//! In-memory storage backend.
//!
//! Stores clients in insertion order inside an `Arc<RwLock<_>>`. Useful for
//! tests and for running the CLI without a database file.
//!
//! # Example
//!
//! ```rust,ignore
//! use clientdesk::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
