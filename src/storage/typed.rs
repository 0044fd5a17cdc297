//! Typed key/value adapter over a [`StorageArea`].
//!
//! Every call reads the area afresh; nothing is cached between calls. A
//! write stores the encoded value and then rewrites the full type registry,
//! so the two writes are not atomic with respect to other writers.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::callables::CallableTable;
use crate::config::StorageConfig;
use crate::errors::{Result, StorageError};
use crate::registry::TypeRegistry;
use crate::storage::area::StorageArea;
use crate::value::{self, Value};
use crate::view::LogicalView;

/// Key that reads the entry count instead of a stored value.
pub const LENGTH_KEY: &str = "length";

#[derive(Clone)]
pub struct TypedStorage {
    area: Arc<dyn StorageArea>,
    callables: Arc<CallableTable>,
    registry_key: String,
}

impl TypedStorage {
    /// Wraps `area` with the default registry key and no callables.
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self::with_config(area, Arc::new(CallableTable::new()), &StorageConfig::default())
    }

    pub fn with_config(
        area: Arc<dyn StorageArea>,
        callables: Arc<CallableTable>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            area,
            callables,
            registry_key: config.registry_key.clone(),
        }
    }

    pub fn area(&self) -> &Arc<dyn StorageArea> {
        &self.area
    }

    fn load_registry(&self) -> TypeRegistry {
        TypeRegistry::parse(self.area.get_item(&self.registry_key).as_deref())
    }

    fn store_registry(&self, registry: &TypeRegistry) -> Result<()> {
        if registry.is_empty() {
            self.area.remove_item(&self.registry_key)?;
        } else {
            self.area.set_item(&self.registry_key, &registry.to_json())?;
        }
        Ok(())
    }

    /// Snapshot of every entry in the area, decoded by its recorded type.
    pub fn get_all(&self) -> LogicalView {
        let registry = self.load_registry();
        let mut entries = BTreeMap::new();

        for key in self.area.keys() {
            if key == self.registry_key {
                continue;
            }
            // The key may vanish between enumeration and read.
            if let Some(raw) = self.area.get_item(&key) {
                let v = value::decode(&raw, registry.tag(&key), &self.callables);
                entries.insert(key, v);
            }
        }

        LogicalView::from_entries(entries)
    }

    /// Returns the decoded value for `key`. `"length"` yields the entry count.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == LENGTH_KEY {
            return Some(Value::from(self.length()));
        }
        if key == self.registry_key {
            return None;
        }

        let raw = self.area.get_item(key)?;
        let registry = self.load_registry();
        Some(value::decode(&raw, registry.tag(key), &self.callables))
    }

    /// Number of user entries, not counting the type registry.
    pub fn length(&self) -> usize {
        self.area
            .keys()
            .iter()
            .filter(|k| **k != self.registry_key)
            .count()
    }

    /// Stores `value` under `key` and returns it unchanged.
    ///
    /// `"length"` cannot be written; the value is echoed without touching the area.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        if key == LENGTH_KEY {
            return Ok(value);
        }
        self.check_key(key)?;

        let mut registry = self.load_registry();
        registry.record(key, value.type_tag());

        log::trace!("storage set '{key}' as {:?}", value.type_tag());
        self.area.set_item(key, &value::encode(&value))?;
        self.store_registry(&registry)?;

        Ok(value)
    }

    /// Deletes `key` and prunes its type tag.
    pub fn remove(&self, key: &str) -> Result<()> {
        if key == LENGTH_KEY {
            return Ok(());
        }
        self.check_key(key)?;

        log::trace!("storage remove '{key}'");
        self.area.remove_item(key)?;

        let mut registry = self.load_registry();
        if registry.forget(key) {
            self.store_registry(&registry)?;
        }
        Ok(())
    }

    /// Removes every entry together with the type registry.
    pub fn clear(&self) -> Result<()> {
        log::trace!("storage clear");
        self.area.clear()?;
        Ok(())
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if key == self.registry_key {
            return Err(StorageError::ReservedKey(key.to_string()));
        }
        Ok(())
    }
}
