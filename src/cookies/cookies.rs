//! Cookie core types.
//!
//! This module defines the **type-erased handle** used to share a cookie jar
//! and the serializable [`Cookie`] record.
//!
//! # Concurrency model
//! - [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar + Send + Sync>>`.
//!   Callers take a **read lock** to read the cookie string and a **write
//!   lock** to set a cookie.
//!
//! The [`Cookie`] struct is used for persistence/inspection and can be
//! (de)serialized via `serde`.
//!
//! ```rust
//! use typed_storage::cookies::Cookie;
//!
//! let c = Cookie::parse("session=abc123; path=/; domain=.example.com; secure").unwrap();
//! assert_eq!(c.name, "session");
//! assert_eq!(c.value, "abc123");
//! assert_eq!(c.domain.as_deref(), Some("example.com"));
//! assert!(c.secure);
//! ```

use crate::cookies::options::parse_http_date;
use crate::cookies::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

/// A handle to a cookie jar trait.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// Wraps a concrete jar into a shareable [`CookieJarHandle`].
pub fn jar_handle<J: CookieJar + Send + Sync + 'static>(jar: J) -> CookieJarHandle {
    Arc::new(RwLock::new(jar))
}

/// A cookie as stored by a jar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive, still percent-encoded). May be empty.
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping (e.g., `"/"`).
    pub path: Option<String>,

    /// Domain scoping, without a leading dot. Host-only if `None`.
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// Expiration date as written (HTTP date). Session cookies have `None`.
    pub expires: Option<String>,

    /// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
    pub same_site: Option<String>,

    /// If `true`, cookie is hidden from the script-visible cookie string.
    pub http_only: bool,
}

impl Cookie {
    /// Parses one `name=value; attr; attr=value` cookie assignment.
    ///
    /// A first segment without `=` is a nameless cookie. Returns `None` for
    /// an empty assignment.
    pub fn parse(s: &str) -> Option<Cookie> {
        let mut parts = s.split(';');
        let first = parts.next()?.trim();
        if first.is_empty() {
            return None;
        }

        let (name, value) = match first.split_once('=') {
            Some((n, v)) => (n.trim(), v.trim()),
            None => ("", first),
        };

        let mut cookie = Cookie {
            name: name.to_string(),
            value: value.to_string(),
            path: None,
            domain: None,
            secure: false,
            expires: None,
            same_site: None,
            http_only: false,
        };

        for part in parts {
            let part = part.trim();
            if let Some((k, v)) = part.split_once('=') {
                let v = v.trim();
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.to_string()),
                    "domain" => cookie.domain = Some(v.trim_start_matches('.').to_string()),
                    "expires" => cookie.expires = Some(v.to_string()),
                    "samesite" => {
                        // normalize to "Lax" | "Strict" | "None"
                        cookie.same_site = Some(if v.eq_ignore_ascii_case("lax") {
                            "Lax".to_string()
                        } else if v.eq_ignore_ascii_case("strict") {
                            "Strict".to_string()
                        } else if v.eq_ignore_ascii_case("none") {
                            "None".to_string()
                        } else {
                            v.to_string()
                        });
                    }
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if part.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            }
        }

        Some(cookie)
    }

    /// Parsed expiry. `None` for session cookies and unreadable dates.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires.as_deref().and_then(parse_http_date)
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|t| t <= now)
    }

    /// Whether `other` addresses the same cookie slot (name, path and domain).
    pub fn same_slot(&self, other: &Cookie) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }

    /// The `name=value` pair as it appears in the cookie string.
    pub fn pair(&self) -> String {
        if self.name.is_empty() {
            self.value.clone()
        } else {
            format!("{}={}", self.name, self.value)
        }
    }
}
