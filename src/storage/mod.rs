//! Storage layer abstraction.
//!
//! The core treats persistent storage as a black box supplied by the host:
//! a string-keyed value store with optional per-entry TTL. The
//! [`LinkStore`] wraps that collaborator with link-specific semantics; two
//! reference backends ship with the crate (bounded in-memory, and Redis
//! behind the `redis` cargo feature).

pub mod link_store;
pub mod memory;
pub mod redis;

pub use link_store::LinkStore;
pub use memory::InMemoryBackend;
pub use redis::RedisBackend;

use crate::Result;
use std::time::Duration;

/// Key-value storage collaborator.
///
/// Keys are plain strings; values are whatever structured format the
/// backend serializes to, carried here as strings. A `ttl` of `None` means
/// the entry does not expire.
///
/// The engine is generic over the backend rather than holding a trait
/// object, so implementations do not need to be object safe.
#[allow(async_fn_in_trait)] // callers never spawn these futures across tasks
pub trait KeyValueBackend: Send + Sync {
    /// Retrieves the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl` when given.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Deletes the value stored under `key`.
    async fn delete(&self, key: &str) -> Result<()>;
}
