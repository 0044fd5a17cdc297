//! Side-channel type registry.
//!
//! Every typed adapter persists one extra entry next to the user data: a
//! JSON object mapping each key to the [`TypeTag`] of the value stored under
//! it. The registry is always rewritten in full.

use crate::value::TypeTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default name of the reserved registry entry.
pub const DEFAULT_REGISTRY_KEY: &str = "__typeInfo__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    tags: BTreeMap<String, TypeTag>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a persisted registry. Missing or malformed data gives an empty registry.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        match serde_json::from_str(raw) {
            Ok(registry) => registry,
            Err(e) => {
                log::debug!("discarding unreadable type registry: {e}");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        // A map of strings to unit enum variants always serializes.
        serde_json::to_string(&self.tags).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn tag(&self, key: &str) -> Option<TypeTag> {
        self.tags.get(key).copied()
    }

    pub fn record(&mut self, key: &str, tag: TypeTag) {
        self.tags.insert(key.to_string(), tag);
    }

    /// Drops the tag for `key`, returning whether one was present.
    pub fn forget(&mut self, key: &str) -> bool {
        self.tags.remove(key).is_some()
    }

    /// Folds `other` into this registry. Tags in `other` win on conflict.
    pub fn merge(&mut self, other: TypeRegistry) {
        self.tags.extend(other.tags);
    }

    /// Keeps only tags for which `keep` returns true.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.tags.retain(|k, _| keep(k));
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
