use std::collections::HashMap;
use std::sync::RwLock;
use anyhow::{anyhow, Result};

use crate::storage::area::StorageArea;

/// In-memory session storage. Its contents live exactly as long as the store.
#[derive(Default)]
pub struct InMemorySessionStore {
    data: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for InMemorySessionStore {
    fn get_item(&self, k: &str) -> Option<String> {
        self.data.read().ok()?.get(k).cloned()
    }

    fn set_item(&self, k: &str, v: &str) -> Result<()> {
        self.data.write()
            .map_err(|_| anyhow!("session storage lock poisoned"))?
            .insert(k.to_string(), v.to_string());
        Ok(())
    }

    fn remove_item(&self, k: &str) -> Result<()> {
        self.data.write()
            .map_err(|_| anyhow!("session storage lock poisoned"))?
            .remove(k);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.data.write()
            .map_err(|_| anyhow!("session storage lock poisoned"))?
            .clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.data.read().map(|m| m.len()).unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        self.data.read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn clones_of_the_handle_share_data() {
        let store = Arc::new(InMemorySessionStore::new());
        let other: Arc<dyn StorageArea> = store.clone();

        store.set_item("k", "v").unwrap();
        assert_eq!(other.get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn separate_stores_are_isolated() {
        let a = InMemorySessionStore::new();
        let b = InMemorySessionStore::new();

        a.set_item("k", "v").unwrap();
        assert!(b.get_item("k").is_none());
    }
}
