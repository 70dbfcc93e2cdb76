// wrfnml/src/namelist/core.rs

//! The namelist document: ordered settings with a section index.

use crate::error::ValueError;
use crate::expand::{Lookup, Scope};
use crate::value::Value;
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One setting and the section that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    section: String,
    value: Value,
}

/// A parsed namelist.
///
/// Settings and section membership are stored as one relation: every entry
/// records its owning section, and `sections` indexes the member keys of each
/// section in declaration order. All mutation goes through [`update`],
/// [`insert`] and [`remove`], which keep both sides in agreement and drop
/// sections that become empty.
///
/// [`update`]: NamelistDocument::update
/// [`insert`]: NamelistDocument::insert
/// [`remove`]: NamelistDocument::remove
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamelistDocument {
    settings: LinkedHashMap<String, Entry>,
    sections: LinkedHashMap<String, Vec<String>>,
}

/// Section names are matched case- and whitespace-insensitively.
pub fn normalize_section(name: &str) -> String {
    name.trim().to_lowercase()
}

impl NamelistDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    ///
    /// An existing key is overwritten in place and keeps its section, whatever
    /// `section` says. A new key needs a section, which is created on demand.
    pub fn update<V: Into<Value>>(
        &mut self,
        key: &str,
        value: V,
        section: Option<&str>,
    ) -> Result<(), ValueError> {
        let key = key.trim();
        if let Some(entry) = self.settings.get_mut(key) {
            entry.value = value.into();
            return Ok(());
        }
        match section {
            Some(section) => {
                self.attach(key, value.into(), &normalize_section(section));
                Ok(())
            }
            None => Err(ValueError::MissingSection {
                key: key.to_string(),
            }),
        }
    }

    /// Place `key` in `section` with `value`.
    ///
    /// If the key already lives in another section it is moved there.
    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V, section: &str) {
        let key = key.trim();
        let section = normalize_section(section);
        if let Some(entry) = self.settings.get_mut(key) {
            if entry.section == section {
                entry.value = value.into();
                return;
            }
            self.remove(key);
        }
        self.attach(key, value.into(), &section);
    }

    /// Delete `key` from the document, dropping its section if it becomes empty.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let key = key.trim();
        let entry = self.settings.remove(key)?;
        let now_empty = match self.sections.get_mut(&entry.section) {
            Some(members) => {
                members.retain(|k| k != key);
                members.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.sections.remove(&entry.section);
        }
        Some(entry.value)
    }

    fn attach(&mut self, key: &str, value: Value, section: &str) {
        self.sections
            .entry(section.to_string())
            .or_insert_with(Vec::new)
            .push(key.to_string());
        self.settings.insert(
            key.to_string(),
            Entry {
                section: section.to_string(),
                value,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key.trim()).map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.settings.contains_key(key.trim())
    }

    /// Name of the section that owns `key`.
    pub fn section_of(&self, key: &str) -> Option<&str> {
        self.settings.get(key.trim()).map(|e| e.section.as_str())
    }

    /// Member keys of `section`, in declaration order.
    pub fn section_keys(&self, section: &str) -> Option<&[String]> {
        self.sections
            .get(&normalize_section(section))
            .map(|v| v.as_slice())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&normalize_section(section))
    }

    /// Section names in insertion order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|s| s.as_str())
    }

    /// Sections with their member keys, in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sections
            .iter()
            .map(|(name, keys)| (name.as_str(), keys.as_slice()))
    }

    /// Settings in first-declaration order.
    pub fn settings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.settings.iter().map(|(k, e)| (k.as_str(), &e.value))
    }

    /// Key to owning-section view of the relation.
    pub fn section_lookup(&self) -> impl Iterator<Item = (&str, &str)> {
        self.settings
            .iter()
            .map(|(k, e)| (k.as_str(), e.section.as_str()))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// Already-parsed settings answer `%(NAME)` lookups; sequences and maps are compound.
impl Scope for NamelistDocument {
    fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.get(name) {
            Some(Value::Scalar(s)) => Lookup::Scalar(Cow::Owned(s.to_string())),
            Some(_) => Lookup::Compound,
            None => Lookup::Missing,
        }
    }
}
