//! In-process implementation of the ephemeral queue store.
//!
//! One mutex over all namespaces; each trait call takes the lock once, so
//! every operation is atomic exactly the way the port contract assumes of
//! the backing store. A Redis adapter would implement the same port with
//! the corresponding native commands.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use crate::domain::errors::OrchestratorResult;
use crate::domain::ports::QueueStore;

#[derive(Default)]
struct Inner {
    strings: HashMap<String, String>,
    lists: HashMap<String, VecDeque<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
}

#[derive(Default)]
pub struct MemoryQueueStore {
    inner: Mutex<Inner>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every key. Test helper simulating an ephemeral store flush.
    pub async fn flush_all(&self) {
        let mut inner = self.inner.lock().await;
        inner.strings.clear();
        inner.lists.clear();
        inner.hashes.clear();
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn set(&self, key: &str, value: &str) -> OrchestratorResult<()> {
        let mut inner = self.inner.lock().await;
        inner.strings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> OrchestratorResult<bool> {
        let mut inner = self.inner.lock().await;
        if inner.strings.contains_key(key) {
            return Ok(false);
        }
        inner.strings.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn get(&self, key: &str) -> OrchestratorResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.strings.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> OrchestratorResult<()> {
        let mut inner = self.inner.lock().await;
        inner.strings.remove(key);
        inner.lists.remove(key);
        inner.hashes.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> OrchestratorResult<Vec<String>> {
        let inner = self.inner.lock().await;
        let keys = inner
            .strings
            .keys()
            .chain(inner.lists.keys())
            .chain(inner.hashes.keys())
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(keys)
    }

    async fn push_front(&self, key: &str, value: &str) -> OrchestratorResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .lists
            .entry(key.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    async fn pop_back(&self, key: &str) -> OrchestratorResult<Option<String>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.lists.get_mut(key).and_then(VecDeque::pop_back))
    }

    async fn list_range(&self, key: &str) -> OrchestratorResult<Vec<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .lists
            .get(key)
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_remove(&self, key: &str, value: &str) -> OrchestratorResult<u64> {
        let mut inner = self.inner.lock().await;
        let Some(list) = inner.lists.get_mut(key) else {
            return Ok(0);
        };
        let before = list.len();
        list.retain(|v| v != value);
        Ok((before - list.len()) as u64)
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> OrchestratorResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> OrchestratorResult<HashMap<String, String>> {
        let inner = self.inner.lock().await;
        Ok(inner.hashes.get(key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_kv_round_trip() {
        let store = MemoryQueueStore::new();

        assert!(store.get("k").await.unwrap().is_none());
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_if_absent() {
        let store = MemoryQueueStore::new();

        assert!(store.set_if_absent("lock", "a").await.unwrap());
        assert!(!store.set_if_absent("lock", "b").await.unwrap());
        assert_eq!(store.get("lock").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_list_is_fifo() {
        let store = MemoryQueueStore::new();

        store.push_front("q", "first").await.unwrap();
        store.push_front("q", "second").await.unwrap();

        assert_eq!(store.pop_back("q").await.unwrap().as_deref(), Some("first"));
        assert_eq!(store.pop_back("q").await.unwrap().as_deref(), Some("second"));
        assert!(store.pop_back("q").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_remove_all_occurrences() {
        let store = MemoryQueueStore::new();

        store.push_front("q", "x").await.unwrap();
        store.push_front("q", "y").await.unwrap();
        store.push_front("q", "x").await.unwrap();

        assert_eq!(store.list_remove("q", "x").await.unwrap(), 2);
        assert_eq!(store.list_range("q").await.unwrap(), vec!["y"]);
        assert_eq!(store.list_remove("missing", "x").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_hash_fields() {
        let store = MemoryQueueStore::new();

        store.hash_set("h", "output", "ok").await.unwrap();
        store.hash_set("h", "error", "").await.unwrap();
        store.hash_set("h", "output", "replaced").await.unwrap();

        let fields = store.hash_get_all("h").await.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("output").map(String::as_str), Some("replaced"));
    }

    #[tokio::test]
    async fn test_prefix_scan_spans_namespaces() {
        let store = MemoryQueueStore::new();

        store.set("task:1", "{}").await.unwrap();
        store.hash_set("result:1", "output", "").await.unwrap();
        store.push_front("dispatch:A1", "{}").await.unwrap();

        let mut keys = store.keys_with_prefix("result:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["result:1"]);
    }
}
