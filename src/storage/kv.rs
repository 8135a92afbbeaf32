use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};

/// A string key-value store: the persistence the ledger needs.
/// Reads and writes are whole values; there is no merging.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore> KeyValueStore for &S {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value).await
    }
}

/// Process-local store. Counts writes so callers can check how often
/// the ledger was flushed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `value` under `key`.
    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut items) = store.items.lock() {
            items.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Number of successful `set_item` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_overwrites() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").await?, None);

        store.set_item("k", "one").await?;
        store.set_item("k", "two").await?;

        assert_eq!(store.get_item("k").await?.as_deref(), Some("two"));
        assert_eq!(store.write_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_prefilled_store_has_no_writes() -> Result<()> {
        let store = MemoryStore::with_item("k", "{}");
        assert_eq!(store.get_item("k").await?.as_deref(), Some("{}"));
        assert_eq!(store.write_count(), 0);
        Ok(())
    }
}
