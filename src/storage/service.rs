use super::area::{StorageArea, StorageScope};
use super::event::StorageEvent;
use super::typed::TypedStorage;
use crate::callables::CallableTable;
use crate::config::StorageConfig;
use anyhow::Result;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the change notification channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// A handle for receiving storage change notifications.
pub type Subscription = broadcast::Receiver<StorageEvent>;

#[derive(Debug)]
struct StorageBus {
    tx: broadcast::Sender<StorageEvent>,
}

impl Default for StorageBus {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl StorageBus {
    fn subscribe(&self) -> Subscription {
        self.tx.subscribe()
    }
    fn publish(&self, ev: StorageEvent) {
        // send() only fails when nobody is subscribed.
        let _ = self.tx.send(ev);
    }
}

/// Both storage lifetimes behind one handle.
///
/// The service hands out [`TypedStorage`] adapters for either scope, all
/// sharing one [`CallableTable`] and [`StorageConfig`].
#[derive(Clone)]
pub struct StorageService {
    local: Arc<dyn StorageArea>,
    session: Arc<dyn StorageArea>,
    callables: Arc<CallableTable>,
    config: StorageConfig,
    bus: Arc<StorageBus>,
}

impl Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("registry_key", &self.config.registry_key)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    pub fn new(local: Arc<dyn StorageArea>, session: Arc<dyn StorageArea>) -> Self {
        Self::with_config(local, session, CallableTable::new(), StorageConfig::default())
    }

    pub fn with_config(
        local: Arc<dyn StorageArea>,
        session: Arc<dyn StorageArea>,
        callables: CallableTable,
        config: StorageConfig,
    ) -> Self {
        let bus = Arc::new(StorageBus::default());
        let wrap = |inner: Arc<dyn StorageArea>, scope: StorageScope| -> Arc<dyn StorageArea> {
            Arc::new(NotifyingArea {
                inner,
                scope,
                registry_key: config.registry_key.clone(),
                bus: bus.clone(),
            })
        };
        let local = wrap(local, StorageScope::Local);
        let session = wrap(session, StorageScope::Session);

        Self {
            local,
            session,
            callables: Arc::new(callables),
            config,
            bus,
        }
    }

    pub fn subscribe(&self) -> Subscription {
        self.bus.subscribe()
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn callables(&self) -> &Arc<CallableTable> {
        &self.callables
    }

    /// Typed adapter for the durable area when `local` is set, the session area otherwise.
    pub fn storage(&self, local: bool) -> TypedStorage {
        self.scoped(StorageScope::from_local_flag(local))
    }

    pub fn scoped(&self, scope: StorageScope) -> TypedStorage {
        let area = match scope {
            StorageScope::Local => self.local.clone(),
            StorageScope::Session => self.session.clone(),
        };
        TypedStorage::with_config(area, self.callables.clone(), &self.config)
    }

    pub fn local(&self) -> TypedStorage {
        self.scoped(StorageScope::Local)
    }

    pub fn session(&self) -> TypedStorage {
        self.scoped(StorageScope::Session)
    }
}

/// Publishes a [`StorageEvent`] for every mutation of a user key.
struct NotifyingArea {
    inner: Arc<dyn StorageArea>,
    scope: StorageScope,
    registry_key: String,
    bus: Arc<StorageBus>,
}

impl NotifyingArea {
    fn publish(&self, key: Option<&str>, old_value: Option<String>, new_value: Option<String>) {
        self.bus.publish(StorageEvent {
            scope: self.scope,
            key: key.map(str::to_string),
            old_value,
            new_value,
        });
    }
}

impl StorageArea for NotifyingArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key)
    }
    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if key == self.registry_key {
            return self.inner.set_item(key, value);
        }
        let old = self.inner.get_item(key);
        self.inner.set_item(key, value)?;
        self.publish(Some(key), old, Some(value.to_string()));
        Ok(())
    }
    fn remove_item(&self, key: &str) -> Result<()> {
        if key == self.registry_key {
            return self.inner.remove_item(key);
        }
        let old = self.inner.get_item(key);
        self.inner.remove_item(key)?;
        if old.is_some() {
            self.publish(Some(key), old, None);
        }
        Ok(())
    }
    fn clear(&self) -> Result<()> {
        self.inner.clear()?;
        self.publish(None, None, None);
        Ok(())
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}
