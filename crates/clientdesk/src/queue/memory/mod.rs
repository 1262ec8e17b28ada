//! In-memory queue backend for single-instance deployments.

mod queue;

pub use queue::MemoryQueue;
