//! Adapter configuration.
//!
//! `StorageConfig` controls the reserved registry key and the cookie
//! attribute defaults shared by the typed adapters. It provides defaults via
//! [`Default`] and a fluent [`StorageConfig::builder()`] with validation.
//!
//! ```rust
//! use typed_storage::config::StorageConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = StorageConfig::builder()
//!     .registry_key("__types__")
//!     .cookie_path("/app")
//!     .cookie_secure(true)
//!     .build()?;
//! assert_eq!(cfg.registry_key, "__types__");
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `registry_key`: name of the entry holding the type registry (default `__typeInfo__`).
//! - `cookie_defaults`: attributes applied to cookie writes when the caller
//!   passes none (default `path=/`, no expiry, no domain, not secure).
//! - `registry_cookie_ttl`: lifetime of the registry cookie (default one year).

use crate::cookies::CookieOptions;
use crate::registry::DEFAULT_REGISTRY_KEY;
use std::fmt;
use time::Duration;

/// One year, as used by the `true` expiry shorthand.
pub const ONE_YEAR: Duration = Duration::days(365);

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub registry_key: String,
    pub cookie_defaults: CookieOptions,
    pub registry_cookie_ttl: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            registry_key: DEFAULT_REGISTRY_KEY.to_string(),
            cookie_defaults: CookieOptions::default(),
            registry_cookie_ttl: ONE_YEAR,
        }
    }
}

impl StorageConfig {
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfigBuilder {
    inner: StorageConfig,
}

impl StorageConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut StorageConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn registry_key<S: Into<String>>(self, key: S) -> Self { self.map(|c| c.registry_key = key.into()) }
    pub fn cookie_defaults(self, opts: CookieOptions) -> Self { self.map(|c| c.cookie_defaults = opts) }
    pub fn cookie_path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.cookie_defaults.path = path.into()) }
    pub fn cookie_domain<S: Into<String>>(self, domain: S) -> Self { self.map(|c| c.cookie_defaults.domain = domain.into()) }
    pub fn cookie_secure(self, on: bool) -> Self { self.map(|c| c.cookie_defaults.secure = on) }
    pub fn registry_cookie_ttl(self, ttl: Duration) -> Self { self.map(|c| c.registry_cookie_ttl = ttl) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut StorageConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<StorageConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyRegistryKey,
    RegistryKeyIsLength,
    RegistryKeyHasSeparator(String),
    NonPositiveRegistryTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyRegistryKey =>
                write!(f, "registry_key must not be empty"),
            ConfigError::RegistryKeyIsLength =>
                write!(f, "registry_key must not be 'length'"),
            ConfigError::RegistryKeyHasSeparator(k) =>
                write!(f, "registry_key '{k}' must not contain ';' or '='"),
            ConfigError::NonPositiveRegistryTtl =>
                write!(f, "registry_cookie_ttl must be positive"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &StorageConfig) -> Result<(), ConfigError> {
    if c.registry_key.is_empty() {
        return Err(ConfigError::EmptyRegistryKey);
    }
    if c.registry_key == "length" {
        return Err(ConfigError::RegistryKeyIsLength);
    }
    if c.registry_key.contains([';', '=']) {
        return Err(ConfigError::RegistryKeyHasSeparator(c.registry_key.clone()));
    }
    if !c.registry_cookie_ttl.is_positive() {
        return Err(ConfigError::NonPositiveRegistryTtl);
    }
    Ok(())
}
