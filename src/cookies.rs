//! Cookies: [`CookieJar`], [`TypedCookies`] and the cookie attribute codec.
//!
//! The jar is the raw medium (a `document.cookie`-like string, written one
//! assignment at a time). [`TypedCookies`] layers the same type registry the
//! key/value adapters use on top of it.
//!
//! ```rust
//! use typed_storage::cookies::{jar_handle, DefaultCookieJar, TypedCookies};
//! use typed_storage::Value;
//!
//! let cookies = TypedCookies::new(jar_handle(DefaultCookieJar::new()));
//! cookies.set_with("remember", true, true).unwrap(); // kept for one year
//! assert_eq!(cookies.get("remember"), Some(Value::Boolean(true)));
//! ```

#[allow(clippy::module_inception)]
mod cookies;
mod cookie_jar;
mod options;
mod persistent_cookie_jar;
mod typed;

pub use cookies::{jar_handle, Cookie, CookieJarHandle};

pub use cookie_jar::CookieJar;
pub use cookie_jar::DefaultCookieJar;
pub use persistent_cookie_jar::PersistentCookieJar;

pub use options::{
    decode_component, encode_component, format_http_date, parse_http_date, CookieOptions, Expires,
};
pub use typed::{split_cookie_string, TypedCookies};
