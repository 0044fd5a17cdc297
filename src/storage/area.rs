use anyhow::Result;

/// Lifetime of a storage area.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Cleared when the browsing session ends (sessionStorage).
    Session,
    /// Survives the session (localStorage).
    Local,
}

impl StorageScope {
    /// Maps the `local` flag of the storage entry points onto a scope.
    pub fn from_local_flag(local: bool) -> Self {
        if local { StorageScope::Local } else { StorageScope::Session }
    }
}

/// Object-safe key/value storage area (DOM’s Storage).
///
/// This is the flat string-keyed medium the typed adapters sit on. Areas are
/// shared behind an `Arc` and synchronize internally.
pub trait StorageArea: Send + Sync {
    /// Retrieves the value associated with the given key, or `None` if not found.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Sets the value for the given key, overwriting any existing value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the item with the given key.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Clears all items in the storage area.
    fn clear(&self) -> Result<()>;

    /// Returns the number of items in the storage area.
    fn len(&self) -> usize;

    /// Returns a vector of all keys in the storage area.
    fn keys(&self) -> Vec<String>;

    /// Returns `true` if the area holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
