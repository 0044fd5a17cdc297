//! Typed key/value storage.
//!
//! This module layers type-preserving access over flat string-keyed
//! **LocalStorage**- and **SessionStorage**-like areas.
//!
//! # Concepts
//!
//! - **Storage areas** implement [`StorageArea`]: `get_item`, `set_item`,
//!   `remove_item`, `clear`, `len` and `keys` over plain strings.
//! - **Typed storage** ([`TypedStorage`]) wraps one area. Values are encoded
//!   by their [`Value`](crate::Value) variant and a type registry is stored
//!   next to them under a reserved key, so `5` reads back as a number and not
//!   as `"5"`.
//! - **Lifetimes**: a session area lives as long as its store; a local area
//!   is durable. [`StorageService`] holds one of each and selects by flag.
//!
//! # Available types
//!
//! - [`StorageArea`]: Trait for any storage backend.
//! - [`StorageScope`]: Session or local lifetime.
//! - [`TypedStorage`]: Typed adapter over one area.
//! - [`StorageService`]: Both lifetimes behind one handle, with change notifications.
//! - [`StorageEvent`] / [`Subscription`]: Observing raw changes.
//! - [`InMemorySessionStore`], [`InMemoryLocalStore`]: In-memory areas.
//! - [`SqliteLocalStore`]: SQLite-backed durable area (`sqlite_store` feature).
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use typed_storage::storage::{InMemoryLocalStore, InMemorySessionStore, StorageService};
//! use typed_storage::Value;
//!
//! let service = StorageService::new(
//!     Arc::new(InMemoryLocalStore::new()),
//!     Arc::new(InMemorySessionStore::new()),
//! );
//!
//! let session = service.storage(false);
//! session.set("count", 5).unwrap();
//! assert_eq!(session.get("count"), Some(Value::Number(5.0)));
//! assert_eq!(session.get_all().len(), 1);
//! ```

/// Storage area module, defining the key/value storage interface.
pub mod area;
/// Event module, providing storage change events.
pub mod event;
/// Service module, bundling both lifetimes.
pub mod service;
/// Typed adapter over a storage area.
pub mod typed;

/// Local storage module, providing durable storage areas.
pub mod local {
    /// In-memory local storage implementation.
    pub mod in_memory;
    /// SQLite-backed local storage implementation.
    #[cfg(feature = "sqlite_store")]
    pub mod sqlite_store;
}

/// Session storage module, providing in-memory session storage.
pub mod session {
    /// In-memory session storage implementation.
    pub mod in_memory;
}

pub use area::{StorageArea, StorageScope};
pub use event::StorageEvent;
pub use local::in_memory::InMemoryLocalStore;
#[cfg(feature = "sqlite_store")]
pub use local::sqlite_store::SqliteLocalStore;
pub use service::{StorageService, Subscription};
pub use session::in_memory::InMemorySessionStore;
pub use typed::TypedStorage;
