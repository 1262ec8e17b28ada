//! Message queue backend implementations and the consumer loop.
//!
//! The backend follows the cache feature flag: `memory` selects
//! [`MemoryQueue`], `redis` selects [`RedisQueue`]. Mutual exclusivity is
//! enforced in the `cache` module.

pub mod consumer;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use consumer::{consume, ConsumeSummary};

#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryQueue;

#[cfg(feature = "redis")]
pub use redis_impl::RedisQueue;
