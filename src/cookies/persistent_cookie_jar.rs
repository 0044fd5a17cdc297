use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::OffsetDateTime;

use crate::cookies::cookie_jar::{CookieJar, DefaultCookieJar};

/// A `CookieJar` decorator that persists changes to a JSON file after each mutation.
///
/// Reads are served from memory. Only cookies with an expiry are written to
/// disk; session cookies live as long as the jar value does.
pub struct PersistentCookieJar {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
    /// Inner cookie jar that holds the actual cookie state.
    inner: DefaultCookieJar,
}

impl PersistentCookieJar {
    /// Opens the jar stored at `path`, starting empty if the file is missing.
    ///
    /// An unreadable file is logged and replaced by an empty jar on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut inner = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading cookie file {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("cookie file {} is corrupt, starting empty: {e}", path.display());
                DefaultCookieJar::new()
            })
        } else {
            DefaultCookieJar::new()
        };
        inner.purge_expired(OffsetDateTime::now_utc());

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inner(&self) -> &DefaultCookieJar {
        &self.inner
    }

    /// Writes the persistent part of the jar to disk.
    fn persist(&self) -> Result<()> {
        let snapshot = DefaultCookieJar {
            entries: self
                .inner
                .cookies()
                .iter()
                .filter(|c| c.expires.is_some())
                .cloned()
                .collect(),
        };

        let contents = serde_json::to_string_pretty(&snapshot).context("serializing cookies")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing cookie file {}", self.path.display()))?;
        Ok(())
    }
}

impl CookieJar for PersistentCookieJar {
    fn cookie_string(&self) -> String {
        self.inner.cookie_string()
    }

    /// Merges the assignment, then persists the updated state.
    fn set_cookie(&mut self, assignment: &str) -> Result<()> {
        self.inner.set_cookie(assignment)?;
        self.persist()
    }

    /// Clears all cookies in the jar, then persists the updated state.
    fn clear(&mut self) -> Result<()> {
        self.inner.clear()?;
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAR_FUTURE: &str = "Fri, 31 Dec 2100 23:59:59 GMT";

    #[test]
    fn persistent_cookies_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        {
            let mut jar = PersistentCookieJar::open(&path).unwrap();
            jar.set_cookie(&format!("kept=1; expires={FAR_FUTURE}; path=/")).unwrap();
            jar.set_cookie("session=2; path=/").unwrap();
            assert_eq!(jar.cookie_string(), "kept=1; session=2");
        }

        let jar = PersistentCookieJar::open(&path).unwrap();
        assert_eq!(jar.cookie_string(), "kept=1");
        assert_eq!(jar.inner().cookies().len(), 1);
    }

    #[test]
    fn deletion_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let mut jar = PersistentCookieJar::open(&path).unwrap();
        jar.set_cookie(&format!("gone=1; expires={FAR_FUTURE}; path=/")).unwrap();
        jar.set_cookie("gone=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/").unwrap();
        drop(jar);

        let jar = PersistentCookieJar::open(&path).unwrap();
        assert_eq!(jar.cookie_string(), "");
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        fs::write(&path, "{ definitely not json").unwrap();

        let mut jar = PersistentCookieJar::open(&path).unwrap();
        assert_eq!(jar.cookie_string(), "");

        jar.set_cookie(&format!("a=1; expires={FAR_FUTURE}")).unwrap();
        let reopened = PersistentCookieJar::open(jar.path()).unwrap();
        assert_eq!(reopened.cookie_string(), "a=1");
    }

    #[test]
    fn clear_empties_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let mut jar = PersistentCookieJar::open(&path).unwrap();
        jar.set_cookie(&format!("a=1; expires={FAR_FUTURE}")).unwrap();
        jar.clear().unwrap();

        let reopened = PersistentCookieJar::open(&path).unwrap();
        assert!(reopened.inner().cookies().is_empty());
    }
}
