//! Typed key/value adapter over a cookie jar.
//!
//! Works like [`TypedStorage`](crate::storage::TypedStorage), with the
//! cookie medium's constraints: the whole state is read as one string, each
//! write is a single cookie assignment carrying its own attributes, and a
//! delete is a write that expires one second in the past.

use std::collections::BTreeMap;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::callables::CallableTable;
use crate::config::StorageConfig;
use crate::cookies::options::{decode_component, CookieOptions, Expires};
use crate::cookies::{CookieJar, CookieJarHandle};
use crate::errors::{Result, StorageError};
use crate::registry::TypeRegistry;
use crate::storage::typed::LENGTH_KEY;
use crate::value::{self, Value};
use crate::view::LogicalView;

/// How far in the past a deleting write sets its expiry.
const EXPIRE_NOW: Duration = Duration::milliseconds(-1000);

#[derive(Clone)]
pub struct TypedCookies {
    jar: CookieJarHandle,
    callables: Arc<CallableTable>,
    config: StorageConfig,
}

impl TypedCookies {
    /// Wraps `jar` with the default configuration and no callables.
    pub fn new(jar: CookieJarHandle) -> Self {
        Self::with_config(jar, Arc::new(CallableTable::new()), StorageConfig::default())
    }

    pub fn with_config(jar: CookieJarHandle, callables: Arc<CallableTable>, config: StorageConfig) -> Self {
        Self { jar, callables, config }
    }

    pub fn jar(&self) -> &CookieJarHandle {
        &self.jar
    }

    /// Reads the cookie string and splits it into decoded pairs plus the registry.
    ///
    /// Every registry pair in the string is merged, so tags survive even when
    /// a registry cookie was left behind on another path.
    fn read(&self) -> (Vec<(String, String)>, TypeRegistry) {
        let blob = match self.jar.read() {
            Ok(guard) => guard.cookie_string(),
            Err(poisoned) => poisoned.into_inner().cookie_string(),
        };

        let mut pairs = Vec::new();
        let mut registry = TypeRegistry::default();
        for (k, v) in split_cookie_string(&blob) {
            if k == self.config.registry_key {
                registry.merge(TypeRegistry::parse(Some(&v)));
            } else {
                pairs.push((k, v));
            }
        }

        (pairs, registry)
    }

    fn write(&self, assignment: &str) -> Result<()> {
        let mut guard = self.jar.write().map_err(|_| StorageError::LockPoisoned)?;
        guard.set_cookie(assignment)?;
        Ok(())
    }

    /// Rewrites the registry cookie, or expires it when no tags remain.
    ///
    /// The registry always lives at the configured default path and domain,
    /// whatever attributes the data write carried.
    fn write_registry(&self, registry: &TypeRegistry, now: OffsetDateTime) -> Result<()> {
        let mut reg_opts = self.config.cookie_defaults.clone();
        let raw = if registry.is_empty() {
            reg_opts.expires = Some(Expires::After(EXPIRE_NOW));
            String::new()
        } else {
            reg_opts.expires = Some(Expires::After(self.config.registry_cookie_ttl));
            registry.to_json()
        };
        self.write(&reg_opts.to_header(&self.config.registry_key, &raw, now))
    }

    /// Snapshot of every cookie, decoded by its recorded type.
    pub fn get_all(&self) -> LogicalView {
        let (pairs, registry) = self.read();
        let entries: BTreeMap<String, Value> = pairs
            .into_iter()
            .map(|(k, raw)| {
                let v = value::decode(&raw, registry.tag(&k), &self.callables);
                (k, v)
            })
            .collect();
        LogicalView::from_entries(entries)
    }

    /// Returns the decoded value for `key`. `"length"` yields the cookie count.
    pub fn get(&self, key: &str) -> Option<Value> {
        let view = self.get_all();
        if key == LENGTH_KEY {
            return Some(Value::from(view.len()));
        }
        view.get(key).cloned()
    }

    /// Number of distinct cookie names, not counting the type registry.
    pub fn length(&self) -> usize {
        self.get_all().len()
    }

    /// Stores `value` under `key` with the configured default attributes.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<Value> {
        let opts = self.config.cookie_defaults.clone();
        self.set_with(key, value, opts)
    }

    /// Stores `value` under `key` with explicit attributes and returns it unchanged.
    ///
    /// `options` accepts a [`CookieOptions`], `true` (expire in one year), a
    /// [`Duration`] or a literal date string.
    pub fn set_with(&self, key: &str, value: impl Into<Value>, options: impl Into<CookieOptions>) -> Result<Value> {
        let value = value.into();
        if key == LENGTH_KEY {
            return Ok(value);
        }
        self.check_key(key)?;

        let opts = options.into();
        let now = OffsetDateTime::now_utc();
        let (_, mut registry) = self.read();
        registry.record(key, value.type_tag());

        log::trace!("cookie set '{key}' as {:?}", value.type_tag());
        self.write(&opts.to_header(key, &value::encode(&value), now))?;
        self.write_registry(&registry, now)?;

        Ok(value)
    }

    /// Expires `key` using the configured default path and domain.
    pub fn remove(&self, key: &str) -> Result<()> {
        let opts = self.config.cookie_defaults.clone();
        self.remove_with(key, opts)
    }

    /// Expires `key` by writing it with a date one second in the past.
    ///
    /// `options` must carry the path and domain the cookie was written with.
    pub fn remove_with(&self, key: &str, options: impl Into<CookieOptions>) -> Result<()> {
        if key == LENGTH_KEY {
            return Ok(());
        }
        self.check_key(key)?;

        let mut opts = options.into();
        opts.expires = Some(Expires::After(EXPIRE_NOW));
        let now = OffsetDateTime::now_utc();

        log::trace!("cookie remove '{key}'");
        self.write(&opts.to_header(key, "", now))?;

        // another path may still hold a cookie of this name
        let (pairs, mut registry) = self.read();
        if pairs.iter().any(|(k, _)| k == key) {
            return Ok(());
        }
        if registry.forget(key) {
            self.write_registry(&registry, now)?;
        }
        Ok(())
    }

    fn check_key(&self, key: &str) -> Result<()> {
        if key == self.config.registry_key {
            return Err(StorageError::ReservedKey(key.to_string()));
        }
        Ok(())
    }
}

/// Splits a cookie string on `"; "` and each pair on its first `=`.
///
/// A pair without `=` has an empty key. Both halves are percent-decoded.
pub fn split_cookie_string(blob: &str) -> Vec<(String, String)> {
    if blob.is_empty() {
        return Vec::new();
    }
    blob.split("; ")
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (String::new(), decode_component(pair)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callables::Callable;
    use crate::cookies::{parse_http_date, DefaultCookieJar};
    use serde_json::json;
    use std::sync::RwLock;

    fn setup() -> (Arc<RwLock<DefaultCookieJar>>, TypedCookies) {
        let jar = Arc::new(RwLock::new(DefaultCookieJar::new()));
        let handle: CookieJarHandle = jar.clone();
        (jar, TypedCookies::new(handle))
    }

    #[test]
    fn splits_and_decodes_pairs() {
        assert!(split_cookie_string("").is_empty());
        assert_eq!(
            split_cookie_string("a=1; b%20c=x%3By; d=e=f; bare"),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b c".to_string(), "x;y".to_string()),
                ("d".to_string(), "e=f".to_string()),
                (String::new(), "bare".to_string()),
            ]
        );
    }

    #[test]
    fn default_write_has_only_a_path() {
        let (jar, cookies) = setup();
        cookies.set("k", "v").unwrap();

        let jar = jar.read().unwrap();
        let c = jar.find("k").unwrap();
        assert_eq!(c.value, "v");
        assert_eq!(c.path.as_deref(), Some("/"));
        assert!(c.expires.is_none());
        assert!(c.domain.is_none());
        assert!(!c.secure);
    }

    #[test]
    fn true_shorthand_expires_in_a_year() {
        let (jar, cookies) = setup();
        let before = OffsetDateTime::now_utc();
        cookies.set_with("k", "v", true).unwrap();

        let expires = jar.read().unwrap().find("k").unwrap().expires_at().unwrap();
        let expected = before + Duration::days(365);
        assert!((expires - expected).abs() < Duration::seconds(60));
    }

    #[test]
    fn values_round_trip_with_their_types() {
        let mut table = CallableTable::new();
        let neg = table.register("neg", |args: &[Value]| {
            Value::Number(-args.first().and_then(Value::as_f64).unwrap_or(0.0))
        });
        let jar: CookieJarHandle = Arc::new(RwLock::new(DefaultCookieJar::new()));
        let cookies = TypedCookies::with_config(jar, Arc::new(table), StorageConfig::default());

        cookies.set("s", "a; b=c").unwrap();
        cookies.set("n", 5).unwrap();
        cookies.set("b", false).unwrap();
        cookies.set("o", json!({"nested": {"list": [1, 2]}})).unwrap();
        cookies.set("f", neg).unwrap();

        assert_eq!(cookies.get("s"), Some(Value::from("a; b=c")));
        assert_eq!(cookies.get("n"), Some(Value::Number(5.0)));
        assert_eq!(cookies.get("b"), Some(Value::Boolean(false)));
        assert_eq!(cookies.get("o"), Some(Value::Json(json!({"nested": {"list": [1, 2]}}))));
        let f = cookies.get("f").unwrap();
        assert_eq!(f.as_callable().unwrap().call(&[Value::from(3)]), Value::Number(-3.0));
    }

    #[test]
    fn registry_cookie_is_hidden_and_long_lived() {
        let (jar, cookies) = setup();
        cookies.set("k", 1).unwrap();

        assert_eq!(cookies.length(), 1);
        assert_eq!(cookies.get("length"), Some(Value::Number(1.0)));
        assert!(!cookies.get_all().contains_key("__typeInfo__"));

        let jar = jar.read().unwrap();
        let reg = jar.find("__typeInfo__").unwrap();
        let expected = OffsetDateTime::now_utc() + Duration::days(365);
        assert!((reg.expires_at().unwrap() - expected).abs() < Duration::seconds(60));
        assert_eq!(decode_component(&reg.value), r#"{"k":"number"}"#);
    }

    #[test]
    fn remove_expires_cookie_and_prunes_tag() {
        let (jar, cookies) = setup();
        cookies.set("count", 5).unwrap();
        cookies.set("name", "n").unwrap();

        cookies.remove("count").unwrap();
        assert_eq!(cookies.get("count"), None);
        assert_eq!(cookies.get_all().len(), 1);
        assert!(jar.read().unwrap().find("count").is_none());

        cookies.remove("name").unwrap();
        assert!(cookies.get_all().is_empty());
        // the registry cookie goes away with the last tag
        assert!(jar.read().unwrap().cookies().is_empty());
    }

    #[test]
    fn remove_needs_the_same_path() {
        let (_jar, cookies) = setup();
        let scoped = CookieOptions::new().with_path("/app");
        cookies.set_with("k", "v", scoped.clone()).unwrap();

        // a delete on another path addresses another cookie
        cookies.remove("k").unwrap();
        assert_eq!(cookies.get("k"), Some(Value::from("v")));

        cookies.remove_with("k", scoped).unwrap();
        assert_eq!(cookies.get("k"), None);
    }

    #[test]
    fn length_counts_names_once_across_paths() {
        let (_jar, cookies) = setup();
        cookies.set_with("k", "a", CookieOptions::new().with_path("/app")).unwrap();
        cookies.set("k", "b").unwrap();

        assert_eq!(cookies.get_all().len(), 1);
        assert_eq!(cookies.length(), 1);
        assert_eq!(cookies.get("length"), Some(Value::Number(1.0)));
    }

    #[test]
    fn tags_survive_writes_on_different_paths() {
        let (jar, cookies) = setup();
        let app = CookieOptions::new().with_path("/app");
        cookies.set_with("k1", 1, app.clone()).unwrap();
        cookies.set("k2", 2).unwrap();
        cookies.set_with("k3", "123", app).unwrap();

        assert_eq!(cookies.get("k1"), Some(Value::Number(1.0)));
        assert_eq!(cookies.get("k2"), Some(Value::Number(2.0)));
        assert_eq!(cookies.get("k3"), Some(Value::from("123")));

        // one registry cookie, on the default path
        let jar = jar.read().unwrap();
        let registries: Vec<_> = jar.cookies().iter().filter(|c| c.name == "__typeInfo__").collect();
        assert_eq!(registries.len(), 1);
        assert_eq!(registries[0].path.as_deref(), Some("/"));
    }

    #[test]
    fn remove_on_one_path_keeps_tag_for_the_other() {
        let (_jar, cookies) = setup();
        let app = CookieOptions::new().with_path("/app");
        cookies.set_with("k", 5, app).unwrap();
        cookies.set("k", 5).unwrap();

        cookies.remove("k").unwrap();
        assert_eq!(cookies.get("k"), Some(Value::Number(5.0)));
    }

    #[test]
    fn registry_pairs_on_several_paths_are_merged() {
        let (jar, cookies) = setup();
        {
            let mut jar = jar.write().unwrap();
            jar.set_cookie("a=1; path=/").unwrap();
            jar.set_cookie("b=2; path=/app").unwrap();
            jar.set_cookie("__typeInfo__=%7B%22a%22%3A%22string%22%7D; path=/").unwrap();
            jar.set_cookie("__typeInfo__=%7B%22b%22%3A%22string%22%7D; path=/app").unwrap();
        }

        assert_eq!(cookies.get("a"), Some(Value::from("1")));
        assert_eq!(cookies.get("b"), Some(Value::from("2")));
        assert_eq!(cookies.length(), 2);
    }

    #[test]
    fn huge_expiry_does_not_panic() {
        let (jar, cookies) = setup();
        cookies.set_with("k", 1, Duration::days(10_000_000)).unwrap();

        assert_eq!(cookies.get("k"), Some(Value::Number(1.0)));
        assert!(jar.read().unwrap().find("k").unwrap().expires.is_none());
    }

    #[test]
    fn literal_expiry_and_attributes_are_applied() {
        let (jar, cookies) = setup();
        let opts = CookieOptions::new()
            .expires_at("Fri, 31 Dec 2100 23:59:59 GMT")
            .with_domain("example.com")
            .with_secure(true);
        cookies.set_with("k", "v", opts).unwrap();

        let jar = jar.read().unwrap();
        let c = jar.find("k").unwrap();
        assert_eq!(c.domain.as_deref(), Some("example.com"));
        assert!(c.secure);
        assert_eq!(c.expires_at(), parse_http_date("Fri, 31 Dec 2100 23:59:59 GMT"));
    }

    #[test]
    fn unregistered_callable_reads_as_its_name() {
        let (_jar, cookies) = setup();
        cookies.set("cb", Callable::new("missing", |_: &[Value]| Value::Boolean(true))).unwrap();
        assert_eq!(cookies.get("cb"), Some(Value::from("missing")));
    }

    #[test]
    fn foreign_cookies_are_parsed_as_json() {
        let (jar, cookies) = setup();
        jar.write().unwrap().set_cookie("tracking=123; path=/").unwrap();
        jar.write().unwrap().set_cookie("theme=dark; path=/").unwrap();

        assert_eq!(cookies.get("tracking"), Some(Value::Number(123.0)));
        assert_eq!(cookies.get("theme"), Some(Value::from("dark")));
    }

    #[test]
    fn reserved_and_length_keys() {
        let (jar, cookies) = setup();
        assert!(matches!(cookies.set("__typeInfo__", 1), Err(StorageError::ReservedKey(_))));
        assert_eq!(cookies.set("length", 7).unwrap(), Value::Number(7.0));
        cookies.remove("length").unwrap();
        assert!(jar.read().unwrap().cookies().is_empty());
    }

    #[test]
    fn get_all_is_idempotent() {
        let (_jar, cookies) = setup();
        cookies.set("a", 1).unwrap();
        cookies.set("b", json!([true])).unwrap();
        assert_eq!(cookies.get_all(), cookies.get_all());
    }
}
