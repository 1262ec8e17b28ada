//! Redis queue backend implementation.
//!
//! A reliable list queue: messages move atomically from the topic list to a
//! processing list when delivered and leave it only when acknowledged.

mod queue;

pub use queue::RedisQueue;
