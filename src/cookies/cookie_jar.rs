//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** is the script-visible cookie medium of one browsing
//! context: it reads as a single `name=value; name=value` string and is
//! written one cookie assignment at a time, which the jar merges into its
//! state (the `document.cookie` contract).
//!
//! ## Notes & limitations
//! - Attributes handled: `Expires`, `Path`, `Domain`, `Secure`, `HttpOnly`
//!   and `SameSite`. `Max-Age`, size limits and eviction policies are not.
//! - There is no request URL, so domain/path matching is not applied when
//!   reading; every live, non-`HttpOnly` cookie is listed.
//! - This module is **not** internally synchronized. Use it via a
//!   `CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>`.

use crate::cookies::Cookie;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The cookie medium the typed cookie adapter reads and writes.
pub trait CookieJar: Send + Sync {
    /// Returns every live cookie as `name=value` pairs joined by `"; "`.
    fn cookie_string(&self) -> String;

    /// Merges one `name=value; attr...` assignment into the jar.
    ///
    /// An assignment whose `expires` lies in the past evicts the matching
    /// cookie instead of storing it.
    fn set_cookie(&mut self, assignment: &str) -> Result<()>;

    /// Removes all cookies from the jar.
    fn clear(&mut self) -> Result<()>;
}

/// In-memory cookie jar (no persistence).
///
/// Cookies are kept in insertion order; a write replaces the cookie with the
/// same name, path and domain in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultCookieJar {
    pub entries: Vec<Cookie>,
}

impl DefaultCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.entries
    }

    /// Looks up a stored cookie by its (encoded) name.
    pub fn find(&self, name: &str) -> Option<&Cookie> {
        self.entries.iter().find(|c| c.name == name)
    }

    /// Merges `cookie` as of `now`.
    pub fn store(&mut self, cookie: Cookie, now: OffsetDateTime) {
        if cookie.is_expired(now) {
            self.entries.retain(|c| !c.same_slot(&cookie));
            return;
        }

        match self.entries.iter_mut().find(|c| c.same_slot(&cookie)) {
            Some(existing) => *existing = cookie,
            None => self.entries.push(cookie),
        }
    }

    /// Drops every cookie that has expired as of `now`.
    pub fn purge_expired(&mut self, now: OffsetDateTime) {
        self.entries.retain(|c| !c.is_expired(now));
    }

    /// The cookie string as of `now`.
    pub fn cookie_string_at(&self, now: OffsetDateTime) -> String {
        self.entries
            .iter()
            .filter(|c| !c.http_only && !c.is_expired(now))
            .map(Cookie::pair)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl CookieJar for DefaultCookieJar {
    fn cookie_string(&self) -> String {
        self.cookie_string_at(OffsetDateTime::now_utc())
    }

    fn set_cookie(&mut self, assignment: &str) -> Result<()> {
        match Cookie::parse(assignment) {
            Some(cookie) => self.store(cookie, OffsetDateTime::now_utc()),
            None => log::debug!("ignoring empty cookie assignment"),
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);

    fn jar_with(assignments: &[&str]) -> DefaultCookieJar {
        let mut jar = DefaultCookieJar::new();
        for a in assignments {
            jar.store(Cookie::parse(a).unwrap(), NOW);
        }
        jar
    }

    #[test]
    fn joins_pairs_in_insertion_order() {
        let jar = jar_with(&["a=1; path=/", "b=2", "c=3; secure"]);
        assert_eq!(jar.cookie_string_at(NOW), "a=1; b=2; c=3");
    }

    #[test]
    fn same_slot_is_replaced_in_place() {
        let jar = jar_with(&["a=1; path=/", "b=2; path=/", "a=updated; path=/"]);
        assert_eq!(jar.cookie_string_at(NOW), "a=updated; b=2");
        assert_eq!(jar.cookies().len(), 2);
    }

    #[test]
    fn different_paths_are_different_cookies() {
        let jar = jar_with(&["a=1; path=/", "a=2; path=/sub"]);
        assert_eq!(jar.cookie_string_at(NOW), "a=1; a=2");
    }

    #[test]
    fn past_expiry_evicts() {
        let mut jar = jar_with(&["a=1; path=/", "b=2; path=/"]);
        jar.store(
            Cookie::parse("a=; expires=Sun, 31 Dec 2023 23:59:59 GMT; path=/").unwrap(),
            NOW,
        );
        assert_eq!(jar.cookie_string_at(NOW), "b=2");
        assert!(jar.find("a").is_none());
    }

    #[test]
    fn cookies_disappear_once_expired() {
        let mut jar = jar_with(&["a=1; expires=Mon, 01 Jan 2024 01:00:00 GMT", "b=2"]);
        let later = datetime!(2024-01-01 02:00:00 UTC);
        assert_eq!(jar.cookie_string_at(NOW), "a=1; b=2");
        assert_eq!(jar.cookie_string_at(later), "b=2");

        jar.purge_expired(later);
        assert_eq!(jar.cookies().len(), 1);
    }

    #[test]
    fn http_only_cookies_are_hidden() {
        let jar = jar_with(&["visible=1", "hidden=2; HttpOnly"]);
        assert_eq!(jar.cookie_string_at(NOW), "visible=1");
    }

    #[test]
    fn trait_setter_and_clear() {
        let mut jar = DefaultCookieJar::new();
        jar.set_cookie("k=v; path=/").unwrap();
        jar.set_cookie("").unwrap();
        assert_eq!(jar.cookie_string(), "k=v");

        jar.clear().unwrap();
        assert_eq!(jar.cookie_string(), "");
    }
}
