//! Port for the ephemeral queue store.
//!
//! Mirrors the small key/value + list + hash surface the orchestrator
//! needs from a Redis-class store. Every method is a single atomic
//! operation of the backing store; updates spanning multiple calls are
//! the caller's responsibility to serialize.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::OrchestratorResult;

#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Set a string key.
    async fn set(&self, key: &str, value: &str) -> OrchestratorResult<()>;

    /// Set a string key only if it does not exist. Returns whether the
    /// write happened.
    async fn set_if_absent(&self, key: &str, value: &str) -> OrchestratorResult<bool>;

    /// Get a string key.
    async fn get(&self, key: &str) -> OrchestratorResult<Option<String>>;

    /// Delete a key of any kind (string, list, or hash).
    async fn delete(&self, key: &str) -> OrchestratorResult<()>;

    /// All keys starting with the given prefix, in no particular order.
    async fn keys_with_prefix(&self, prefix: &str) -> OrchestratorResult<Vec<String>>;

    /// Push a value onto the front of a list, creating it if absent.
    async fn push_front(&self, key: &str, value: &str) -> OrchestratorResult<()>;

    /// Pop a value off the back of a list. `None` when empty or absent.
    /// Producers push the front and consumers pop the back, so each list
    /// is FIFO.
    async fn pop_back(&self, key: &str) -> OrchestratorResult<Option<String>>;

    /// All values of a list, front to back.
    async fn list_range(&self, key: &str) -> OrchestratorResult<Vec<String>>;

    /// Remove every occurrence of a value from a list. Returns the number
    /// removed.
    async fn list_remove(&self, key: &str, value: &str) -> OrchestratorResult<u64>;

    /// Set one field of a hash, creating the hash if absent.
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> OrchestratorResult<()>;

    /// All fields of a hash. Empty map when the hash is absent.
    async fn hash_get_all(&self, key: &str) -> OrchestratorResult<HashMap<String, String>>;
}
