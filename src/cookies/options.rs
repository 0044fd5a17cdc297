//! Per-write cookie attributes and the `name=value; attr...` serialization.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::config::ONE_YEAR;

/// Characters left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

macro_rules! http_date_format {
    () => {
        format_description!(
            "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
        )
    };
}

/// When a cookie expires.
#[derive(Debug, Clone, PartialEq)]
pub enum Expires {
    /// Relative to the moment of the write. Converted to an HTTP date then.
    After(Duration),
    /// A literal date string, written as given.
    At(String),
}

/// Attributes applied to a single cookie write.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieOptions {
    pub expires: Option<Expires>,
    pub path: String,
    pub domain: String,
    pub secure: bool,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            expires: None,
            path: "/".to_string(),
            domain: String::new(),
            secure: false,
        }
    }
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default attributes with an expiry one year from the write.
    pub fn one_year() -> Self {
        Self::default().expires_in(ONE_YEAR)
    }

    pub fn expires_in(mut self, d: Duration) -> Self {
        self.expires = Some(Expires::After(d));
        self
    }

    pub fn expires_at<S: Into<String>>(mut self, date: S) -> Self {
        self.expires = Some(Expires::At(date.into()));
        self
    }

    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// The `expires` attribute value for a write at `now`, if any.
    ///
    /// A zero duration or an empty date string counts as "no expiry".
    pub fn expires_attr(&self, now: OffsetDateTime) -> Option<String> {
        match self.expires.as_ref()? {
            Expires::After(d) if d.is_zero() => None,
            Expires::After(d) => {
                let Some(at) = now.checked_add(*d) else {
                    log::warn!("cookie expiry {d} from {now} is out of range; writing without expiry");
                    return None;
                };
                match format_http_date(at) {
                    Ok(s) => Some(s),
                    Err(e) => {
                        log::warn!("cannot format cookie expiry: {e}");
                        None
                    }
                }
            }
            Expires::At(s) if s.is_empty() => None,
            Expires::At(s) => Some(s.clone()),
        }
    }

    /// Serializes one cookie pair with these attributes, as written to the
    /// cookie setter. Key and value are percent-encoded; empty attributes are
    /// left out.
    pub fn to_header(&self, key: &str, raw_value: &str, now: OffsetDateTime) -> String {
        let mut out = format!("{}={}", encode_component(key), encode_component(raw_value));
        if let Some(exp) = self.expires_attr(now) {
            out.push_str("; expires=");
            out.push_str(&exp);
        }
        if !self.path.is_empty() {
            out.push_str("; path=");
            out.push_str(&self.path);
        }
        if !self.domain.is_empty() {
            out.push_str("; domain=");
            out.push_str(&self.domain);
        }
        if self.secure {
            out.push_str("; secure");
        }
        out
    }
}

/// `true` is shorthand for "expire in one year"; `false` means defaults.
impl From<bool> for CookieOptions {
    fn from(one_year: bool) -> Self {
        if one_year { CookieOptions::one_year() } else { CookieOptions::default() }
    }
}

impl From<Duration> for CookieOptions {
    fn from(d: Duration) -> Self {
        CookieOptions::default().expires_in(d)
    }
}

impl From<&str> for CookieOptions {
    fn from(date: &str) -> Self {
        CookieOptions::default().expires_at(date)
    }
}

pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Lossy inverse of [`encode_component`]; malformed escapes never fail.
pub fn decode_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Formats `t` as an HTTP date (`Thu, 01 Jan 1970 00:00:00 GMT`).
pub fn format_http_date(t: OffsetDateTime) -> Result<String, time::error::Format> {
    t.to_offset(UtcOffset::UTC).format(http_date_format!())
}

/// Parses an HTTP date, or an RFC 3339 timestamp as a fallback.
pub fn parse_http_date(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if let Ok(t) = PrimitiveDateTime::parse(s, http_date_format!()) {
        return Some(t.assume_utc());
    }
    OffsetDateTime::parse(s, &Rfc3339).ok()
}
