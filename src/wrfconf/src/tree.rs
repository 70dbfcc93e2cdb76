// wrfconf/src/tree.rs

//! Ordered configuration tree produced by the loader and the merger.

use chrono::NaiveDateTime;
use linked_hash_map::LinkedHashMap;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use wrfnml::value::{format_float, TIMESTAMP_FORMAT};
use wrfnml::{Lookup, Scalar, Scope, Value};

/// A node of a [`ConfigTree`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    #[serde(serialize_with = "serialize_timestamp")]
    Timestamp(NaiveDateTime),
    Str(String),
    List(Vec<ConfigValue>),
    Tree(ConfigTree),
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
}

impl ConfigValue {
    /// Non-null, non-empty and not `false`. Zero counts as truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConfigValue::Null => false,
            ConfigValue::Bool(b) => *b,
            ConfigValue::Str(s) => !s.is_empty(),
            ConfigValue::List(items) => !items.is_empty(),
            ConfigValue::Tree(tree) => !tree.is_empty(),
            ConfigValue::Int(_) | ConfigValue::Float(_) | ConfigValue::Timestamp(_) => true,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            ConfigValue::Null | ConfigValue::List(_) | ConfigValue::Tree(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&ConfigTree> {
        match self {
            ConfigValue::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Scalar form used when writing into a namelist.
    pub fn to_scalar(&self) -> Option<Scalar> {
        Some(match self {
            ConfigValue::Bool(b) => Scalar::Bool(*b),
            ConfigValue::Int(i) => Scalar::Int(*i),
            ConfigValue::Float(f) => Scalar::Float(*f),
            ConfigValue::Timestamp(t) => Scalar::Timestamp(*t),
            ConfigValue::Str(s) => Scalar::Str(s.clone()),
            ConfigValue::Null | ConfigValue::List(_) | ConfigValue::Tree(_) => return None,
        })
    }

    /// Namelist value for scalars and sequences of scalars.
    pub fn to_namelist_value(&self) -> Option<Value> {
        match self {
            ConfigValue::List(items) => items
                .iter()
                .map(ConfigValue::to_scalar)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            other => other.to_scalar().map(Value::Scalar),
        }
    }

    /// Convert a parsed JSON document node.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Int(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ConfigValue::Str(s),
            serde_json::Value::Array(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from_json).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Tree(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a parsed YAML document node.
    ///
    /// Strings shaped like `YYYY-MM-DD HH:MM:SS` become timestamps, tags are
    /// dropped and non-string mapping keys are rendered as text.
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => ConfigValue::Null,
            serde_yaml::Value::Bool(b) => ConfigValue::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Int(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => match parse_timestamp(&s) {
                Some(ts) => ConfigValue::Timestamp(ts),
                None => ConfigValue::Str(s),
            },
            serde_yaml::Value::Sequence(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => ConfigValue::Tree(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), ConfigValue::from_yaml(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => ConfigValue::from_yaml(tagged.value),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// `YYYY-MM-DD HH:MM:SS`, also accepting a `T` separator.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", format_float(*x)),
            ConfigValue::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
            ConfigValue::Str(s) => write!(f, "{}", s),
            ConfigValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            ConfigValue::Tree(tree) => write!(f, "{}", tree),
        }
    }
}

macro_rules! impl_from_config_value {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for ConfigValue {
                fn from(v: $t) -> Self {
                    ConfigValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_config_value! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    f64 => Float,
    NaiveDateTime => Timestamp,
    String => Str,
    &str => Str,
    Vec<ConfigValue> => List,
    ConfigTree => Tree,
}

/// Ordered mapping from setting names to [`ConfigValue`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigTree {
    entries: LinkedHashMap<String, ConfigValue>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set `key`, keeping its position when it already exists.
    pub fn set<K: Into<String>, V: Into<ConfigValue>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.get_mut(&key) {
            Some(slot) => *slot = value,
            None => {
                self.entries.insert(key, value);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ConfigValue)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow a dotted path such as `domains.max_dom`.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut parts = path.split('.');
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = current.as_tree()?.get(part)?;
        }
        Some(current)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigTree {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        let mut tree = ConfigTree::new();
        for (k, v) in iter {
            tree.set(k, v);
        }
        tree
    }
}

impl IntoIterator for ConfigTree {
    type Item = (String, ConfigValue);
    type IntoIter = linked_hash_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

/// Top-level scalars are visible to `%(name)`; null counts as undefined.
impl Scope for ConfigTree {
    fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.get(name) {
            None | Some(ConfigValue::Null) => Lookup::Missing,
            Some(ConfigValue::Str(s)) => Lookup::Scalar(Cow::Borrowed(s.as_str())),
            Some(ConfigValue::List(_)) | Some(ConfigValue::Tree(_)) => Lookup::Compound,
            Some(other) => Lookup::Scalar(Cow::Owned(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_truthiness() {
        assert!(!ConfigValue::Null.is_truthy());
        assert!(!ConfigValue::from(false).is_truthy());
        assert!(!ConfigValue::from("").is_truthy());
        assert!(!ConfigValue::List(vec![]).is_truthy());
        assert!(!ConfigValue::Tree(ConfigTree::new()).is_truthy());
        assert!(ConfigValue::from(0).is_truthy());
        assert!(ConfigValue::from("x").is_truthy());
        assert!(ConfigValue::from(true).is_truthy());
    }

    #[test]
    fn test_set_keeps_position() {
        let mut tree = ConfigTree::new();
        tree.set("a", 1);
        tree.set("b", 2);
        tree.set("a", 3);
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(tree.get("a"), Some(&ConfigValue::Int(3)));
    }

    #[test]
    fn test_from_yaml_detects_timestamps() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "init: '2013-06-14 00:00:00'\nvalid: 2013-06-14T06:00:00\nname: gfs\nkeys: {1: x}\n",
        )
        .unwrap();
        let tree = ConfigValue::from_yaml(yaml);
        let tree = tree.as_tree().unwrap();
        assert_eq!(tree.get("init"), Some(&ConfigValue::Timestamp(ts(2013, 6, 14, 0))));
        assert_eq!(tree.get("valid"), Some(&ConfigValue::Timestamp(ts(2013, 6, 14, 6))));
        assert_eq!(tree.get("name"), Some(&ConfigValue::from("gfs")));
        assert!(tree.get_path("keys.1").is_some());
    }

    #[test]
    fn test_from_json_preserves_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"z": 1, "a": 2.5, "m": [true, null]}"#).unwrap();
        let value = ConfigValue::from_json(json);
        let tree = value.as_tree().unwrap();
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(tree.get("a"), Some(&ConfigValue::Float(2.5)));
        assert_eq!(
            tree.get("m"),
            Some(&ConfigValue::List(vec![ConfigValue::Bool(true), ConfigValue::Null]))
        );
    }

    #[test]
    fn test_scope_lookup() {
        let mut sub = ConfigTree::new();
        sub.set("x", 1);
        let mut tree = ConfigTree::new();
        tree.set("dx", 3000.0);
        tree.set("init", ts(2013, 6, 14, 0));
        tree.set("domains", sub);
        tree.set("unset", ConfigValue::Null);

        assert_eq!(tree.lookup("dx"), Lookup::Scalar(Cow::Borrowed("3000.0")));
        assert_eq!(
            tree.lookup("init"),
            Lookup::Scalar(Cow::Borrowed("2013-06-14 00:00:00"))
        );
        assert_eq!(tree.lookup("domains"), Lookup::Compound);
        assert_eq!(tree.lookup("unset"), Lookup::Missing);
        assert_eq!(tree.lookup("nope"), Lookup::Missing);
    }

    #[test]
    fn test_to_namelist_value() {
        let list = ConfigValue::List(vec![ConfigValue::from(1), ConfigValue::from(2)]);
        assert_eq!(
            list.to_namelist_value(),
            Some(Value::List(vec![Scalar::Int(1), Scalar::Int(2)]))
        );
        let nested = ConfigValue::List(vec![ConfigValue::List(vec![])]);
        assert_eq!(nested.to_namelist_value(), None);
        assert_eq!(ConfigValue::Null.to_namelist_value(), None);
    }

    #[test]
    fn test_serializes_timestamps_as_text() {
        let mut tree = ConfigTree::new();
        tree.set("init", ts(2013, 6, 14, 0));
        tree.set("none", ConfigValue::Null);
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            r#"{"init":"2013-06-14 00:00:00","none":null}"#
        );
    }
}
