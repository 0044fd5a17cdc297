/// Errors returned by the typed adapters.
///
/// Configuration problems are reported by
/// [`StorageConfigBuilder::build`](crate::config::StorageConfigBuilder::build)
/// as [`ConfigError`](crate::config::ConfigError), before any adapter exists.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Key '{0}' is reserved for the type registry")]
    ReservedKey(String),

    #[error("Backing store error: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("Cookie jar lock is poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StorageError>;
