//! Tag Attribute Maps
//!
//! Prefixed attribute collections: plain tag attributes, `data-*` and `aria-*`.

use std::fmt;

use crate::classlist::ClassList;
use crate::value::{Value, ValueMap};

/// The four tag-attribute groups every element carries
#[derive(Debug, Clone, PartialEq)]
pub struct TagAttributes {
    pub class: ClassList,
    pub data: AttrMap,
    pub aria: AttrMap,
    pub tag: AttrMap,
}

impl TagAttributes {
    pub fn new() -> Self {
        Self {
            class: ClassList::new(),
            data: AttrMap::data(),
            aria: AttrMap::aria(),
            tag: AttrMap::new(),
        }
    }

    /// The groups an attribute declaration may feed into
    pub(crate) fn keyed_mut(&mut self) -> [&mut AttrMap; 3] {
        [&mut self.aria, &mut self.data, &mut self.tag]
    }
}

impl Default for TagAttributes {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered attribute map with an optional name prefix.
///
/// Serializes as `prefix-name="value"` pairs in insertion order. Null and
/// empty-string values are kept in the map (so later assignments land in the
/// same position) but never emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrMap {
    prefix: Option<&'static str>,
    entries: ValueMap,
}

impl AttrMap {
    /// Unprefixed tag attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Map emitting `prefix-name` keys
    pub fn with_prefix(prefix: &'static str) -> Self {
        Self {
            prefix: Some(prefix),
            entries: ValueMap::new(),
        }
    }

    /// `data-*` attributes
    pub fn data() -> Self {
        Self::with_prefix("data")
    }

    /// `aria-*` attributes
    pub fn aria() -> Self {
        Self::with_prefix("aria")
    }

    /// Name prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.prefix
    }

    /// Get number of entries, including ones that will not be emitted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get value by unprefixed name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Check if name exists
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Set a single value; an existing key keeps its position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Merge entries; later values overwrite earlier ones
    pub fn add<I, K, V>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in entries {
            self.insert(name, value);
        }
        self
    }

    /// Remove by name
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    /// Iterate over raw (unprefixed) entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Full attribute name for an entry, e.g. `data-user-id`
    pub fn attribute_name(&self, name: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{}-{}", prefix, dasherize(name)),
            None => dasherize(name),
        }
    }

    /// Flatten into canonical `prefix-name` keys, dropping null and empty
    /// values. Used when merging several maps into one attribute bag.
    pub fn collapse(&self) -> ValueMap {
        let mut flat = ValueMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            if value.is_absent() {
                continue;
            }
            let key = match self.prefix {
                Some(prefix) => format!("{}-{}", prefix, name),
                None => name.clone(),
            };
            flat.insert(canonical_name(&key), value.clone());
        }
        flat
    }
}

impl fmt::Display for AttrMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.entries.iter().filter(|(_, v)| !v.is_absent()) {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}=\"{}\"", self.attribute_name(name), value)?;
            first = false;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.add(iter);
        map
    }
}

/// Convert snake_case to kebab-case
fn dasherize(name: &str) -> String {
    name.replace('_', "-")
}

/// Lowercase and replace every run of non-word characters or underscores
/// with a single dash
fn canonical_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            in_separator = false;
        } else if !in_separator {
            result.push('-');
            in_separator = true;
        }
    }

    result
}
