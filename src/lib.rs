//! Type-preserving key/value access over string-only browser storage media.
//!
//! - [`storage`]: session and durable key/value areas with a typed adapter.
//! - [`cookies`]: a cookie jar with a typed adapter and per-write attributes.
//!
//! Both adapters persist a side-channel [`TypeRegistry`] so that numbers,
//! booleans, JSON values and named callables come back with their type.

pub mod callables;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod registry;
pub mod storage;
pub mod value;
pub mod view;

pub use callables::{Callable, CallableTable};
pub use config::StorageConfig;
pub use cookies::TypedCookies;
pub use errors::StorageError;
pub use registry::TypeRegistry;
pub use storage::{StorageService, TypedStorage};
pub use value::{TypeTag, Value};
pub use view::LogicalView;
