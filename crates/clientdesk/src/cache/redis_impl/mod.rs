//! Redis cache backend implementation.
//!
//! Provides a distributed cache using Redis for multi-instance deployments.

mod cache;
pub(crate) mod error;

pub use cache::RedisCache;
