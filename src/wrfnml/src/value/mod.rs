// wrfnml/src/value/mod.rs

//! Namelist values, type inference and formatting.

use chrono::NaiveDateTime;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout recognised inside namelist values.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single typed namelist token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Str(String),
}

/// The value side of a namelist assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
    Map(LinkedHashMap<String, Scalar>),
}

/// How a token containing `-` is typed when it is not a timestamp.
///
/// Timestamps are tried before integers, so `-5` never reaches the integer
/// parser under [`HyphenPolicy::TimestampOnly`] and is kept as the string
/// `"-5"`. [`HyphenPolicy::TimestampThenNumber`] falls back to the integer
/// parser instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HyphenPolicy {
    #[default]
    TimestampOnly,
    TimestampThenNumber,
}

impl Scalar {
    /// Type name used in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Timestamp(_) => "timestamp",
            Scalar::Str(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(f) => Some(*f),
            Scalar::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Scalar::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Render the scalar as it is written in a namelist file.
    pub fn to_namelist_string(&self) -> String {
        match self {
            Scalar::Bool(true) => ".true.".to_string(),
            Scalar::Bool(false) => ".false.".to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => format_float(*f),
            Scalar::Timestamp(t) => t.format(TIMESTAMP_FORMAT).to_string(),
            // a double quote means the caller wants the text left bare
            Scalar::Str(s) if s.contains('"') => s.clone(),
            Scalar::Str(s) => format!("'{}'", s),
        }
    }
}

/// Plain text form, used when a scalar is substituted into another value.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(true) => f.write_str(".true."),
            Scalar::Bool(false) => f.write_str(".false."),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => f.write_str(&format_float(*v)),
            Scalar::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&LinkedHashMap<String, Scalar>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Render the value side of a namelist assignment, without the trailing comma.
    pub fn to_namelist_string(&self) -> String {
        match self {
            Value::Scalar(s) => s.to_namelist_string(),
            Value::List(items) => items
                .iter()
                .map(Scalar::to_namelist_string)
                .collect::<Vec<_>>()
                .join(", "),
            Value::Map(map) => {
                let body = map
                    .iter()
                    .map(|(k, v)| format!("'{}': {}", k, v.to_namelist_string()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{}}}", body)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_namelist_string())
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(items: Vec<Scalar>) -> Self {
        Value::List(items)
    }
}

impl From<LinkedHashMap<String, Scalar>> for Value {
    fn from(map: LinkedHashMap<String, Scalar>) -> Self {
        Value::Map(map)
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar::$variant(v.into())
                }
            }

            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    f64 => Float,
    NaiveDateTime => Timestamp,
    String => Str,
    &str => Str,
}

/// Format a float so that it reads back as a float (always has a decimal point).
pub fn format_float(value: f64) -> String {
    let text = format!("{:?}", value);
    if text.contains('.') || !value.is_finite() {
        return text;
    }
    match text.find('e') {
        Some(pos) => format!("{}.0{}", &text[..pos], &text[pos..]),
        None => format!("{}.0", text),
    }
}

/// Strip one pair of matching surrounding quotes.
pub fn strip_quotes(token: &str) -> &str {
    let bytes = token.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &token[1..token.len() - 1];
        }
    }
    token
}

/// Infer the type of a single trimmed token.
///
/// Order: `.true.`/`.false.`, decimal point (float), hyphen (timestamp),
/// integer, and finally a string with its surrounding quotes removed.
/// Never fails: anything unparseable becomes a string.
pub fn infer_scalar(token: &str, policy: HyphenPolicy) -> Scalar {
    let token = token.trim();

    if token.eq_ignore_ascii_case(".true.") {
        return Scalar::Bool(true);
    }
    if token.eq_ignore_ascii_case(".false.") {
        return Scalar::Bool(false);
    }

    if token.contains('.') {
        return match token.parse::<f64>() {
            Ok(f) => Scalar::Float(f),
            Err(_) => Scalar::Str(strip_quotes(token).to_string()),
        };
    }

    if token.contains('-') {
        if let Ok(t) = NaiveDateTime::parse_from_str(token, TIMESTAMP_FORMAT) {
            return Scalar::Timestamp(t);
        }
        if policy == HyphenPolicy::TimestampOnly {
            return Scalar::Str(strip_quotes(token).to_string());
        }
    }

    match token.parse::<i64>() {
        Ok(i) => Scalar::Int(i),
        Err(_) => Scalar::Str(strip_quotes(token).to_string()),
    }
}
