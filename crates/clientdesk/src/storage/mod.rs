//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository trait
//! defined in `clientdesk_core::storage`. The implementation is selected
//! at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//! - `inmemory`: Volatile storage backed by a vector behind a `RwLock`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with SQLite (default):
//! ```bash
//! cargo build -p clientdesk
//! ```
//!
//! Build with in-memory storage:
//! ```bash
//! cargo build -p clientdesk --no-default-features --features inmemory,memory
//! ```

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!(
    "Features 'sqlite' and 'inmemory' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "sqlite", feature = "inmemory")))]
compile_error!(
    "No storage backend selected. Enable 'sqlite' or 'inmemory' feature. \
    Example: cargo build -p clientdesk --features sqlite"
);

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "inmemory"))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;

#[cfg(any(test, feature = "inmemory"))]
pub use inmemory::InMemoryRepository;
