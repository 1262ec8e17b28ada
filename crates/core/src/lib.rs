//! Functional core for clientdesk.
//!
//! Holds the `Client` aggregate, its validation rules and error taxonomy,
//! and the port traits (cache, storage, queue) that adapters implement.
//! Nothing in this crate performs I/O.

pub mod cache;
pub mod client;
pub mod queue;
pub mod storage;
