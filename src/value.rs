//! Logical values and their string encoding.
//!
//! The backing media only hold strings. A [`Value`] is written through
//! [`encode`] and read back through [`decode`], which uses the [`TypeTag`]
//! recorded for the key to pick the right interpretation of the raw text.
//! Decoding never fails: anything that cannot be interpreted comes back as
//! [`Value::String`] holding the raw text.

use crate::callables::{Callable, CallableTable};
use serde::{Deserialize, Serialize};

/// Largest integer an IEEE double represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Type tag persisted in the type registry for every key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Object,
    Function,
    /// Any tag this crate does not know about (e.g. written by another client).
    #[serde(other)]
    Unknown,
}

/// A value as seen by callers of the typed adapters.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    /// Objects, arrays and `null`.
    Json(serde_json::Value),
    Function(Callable),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::String(_) => TypeTag::String,
            Value::Number(_) => TypeTag::Number,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Json(_) => TypeTag::Object,
            Value::Function(_) => TypeTag::Function,
        }
    }

    /// Maps parsed JSON onto the closest logical variant.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Value::Number(f),
                None => Value::Json(serde_json::Value::Number(n)),
            },
            other => Value::Json(other),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(c) => Some(c),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Number(n as f64)
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

/// JSON strings, booleans and numbers become their scalar variants.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Function(c)
    }
}

/// Encodes a value into the text written to the backing medium.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => encode_number(*n),
        Value::Boolean(b) => b.to_string(),
        Value::Json(j) => j.to_string(),
        Value::Function(c) => c.name().to_string(),
    }
}

// Integral numbers are written without a fractional part ("5", not "5.0"),
// non-finite numbers as `null`.
fn encode_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return format!("{}", n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(|num| num.to_string())
        .unwrap_or_else(|| "null".to_string())
}

/// Decodes raw stored text according to its recorded tag.
pub fn decode(raw: &str, tag: Option<TypeTag>, callables: &CallableTable) -> Value {
    match tag {
        None | Some(TypeTag::Object) | Some(TypeTag::Number) | Some(TypeTag::Boolean) => {
            match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(json) => Value::from_json(json),
                Err(e) => {
                    log::trace!("value is not JSON, keeping raw text: {e}");
                    Value::String(raw.to_string())
                }
            }
        }
        Some(TypeTag::Function) => match callables.get(raw) {
            Some(c) => Value::Function(c),
            None => {
                log::trace!("no callable registered as '{raw}', keeping raw text");
                Value::String(raw.to_string())
            }
        },
        Some(TypeTag::String) | Some(TypeTag::Unknown) => Value::String(raw.to_string()),
    }
}
