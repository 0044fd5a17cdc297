//! Named callables.
//!
//! Stored data never carries executable code. A function value is persisted
//! as the identifier it was registered under, and is turned back into a
//! [`Callable`] by looking that identifier up in a [`CallableTable`].
//!
//! ```rust
//! use typed_storage::{Callable, CallableTable, Value};
//!
//! let mut table = CallableTable::new();
//! table.register("double", |args: &[Value]| match args.first() {
//!     Some(Value::Number(n)) => Value::Number(n * 2.0),
//!     _ => Value::Number(0.0),
//! });
//!
//! let double = table.get("double").unwrap();
//! assert_eq!(double.call(&[Value::Number(21.0)]), Value::Number(42.0));
//! ```

use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type CallableFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A function value that can be stored by name.
#[derive(Clone)]
pub struct Callable {
    name: String,
    func: Arc<CallableFn>,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Identifier this callable is persisted under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Lookup table from stored identifiers to callables.
#[derive(Clone, Default)]
pub struct CallableTable {
    entries: HashMap<String, Callable>,
}

impl CallableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `func` under `name`, replacing any previous entry, and
    /// returns the resulting [`Callable`].
    pub fn register<F>(&mut self, name: impl Into<String>, func: F) -> Callable
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let callable = Callable::new(name, func);
        self.insert(callable.clone());
        callable
    }

    pub fn insert(&mut self, callable: Callable) {
        self.entries.insert(callable.name.clone(), callable);
    }

    pub fn get(&self, name: &str) -> Option<Callable> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CallableTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort_unstable();
        f.debug_struct("CallableTable").field("names", &names).finish()
    }
}
