use std::collections::HashMap;
use std::sync::Mutex;
use anyhow::{anyhow, Result};
use crate::storage::area::StorageArea;

/// In‑memory local storage (no persistence). Used as a default when no durable store is configured.
#[derive(Default)]
pub struct InMemoryLocalStore {
    map: Mutex<HashMap<String, String>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for InMemoryLocalStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .map_err(|_| anyhow!("local storage lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.map.lock().map_err(|_| anyhow!("local storage lock poisoned"))?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.map.lock().map_err(|_| anyhow!("local storage lock poisoned"))?.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = match self.map.lock() {
            Ok(m) => m.keys().cloned().collect(),
            Err(_) => return vec![],
        };
        v.sort_unstable(); // stable order for deterministic enumeration
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted() {
        let store = InMemoryLocalStore::new();
        store.set_item("c", "3").unwrap();
        store.set_item("a", "1").unwrap();
        store.set_item("b", "2").unwrap();

        assert_eq!(store.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn values_are_opaque_strings() {
        let store = InMemoryLocalStore::new();
        store.set_item("json", "{\"a\":1}").unwrap();
        store.set_item("empty", "").unwrap();

        assert_eq!(store.get_item("json").as_deref(), Some("{\"a\":1}"));
        assert_eq!(store.get_item("empty").as_deref(), Some(""));
        assert_eq!(store.len(), 2);
    }
}
