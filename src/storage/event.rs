use super::area::StorageScope;

/// A raw change to a storage area, as published by [`StorageService`](super::StorageService).
///
/// Values are the encoded strings written to the medium. `key` is `None`
/// when the whole area was cleared.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageEvent {
    pub scope: StorageScope,
    pub key: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl StorageEvent {
    /// Returns `true` if this event removed a single key.
    pub fn is_removal(&self) -> bool {
        self.key.is_some() && self.new_value.is_none()
    }

    /// Returns `true` if this event cleared the whole area.
    pub fn is_clear(&self) -> bool {
        self.key.is_none()
    }
}
