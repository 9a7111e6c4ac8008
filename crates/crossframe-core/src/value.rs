//! The flat argument-bag data model.
//!
//! Every call and event carried over the cross-frame channel is a flat
//! mapping from string keys to one of three value shapes: a string, a
//! boolean, or an ordered list of strings. Nothing nests except the
//! single well-known `args` field, which embeds a whole encoded bag as
//! a string value (see `crossframe-protocol`).

use std::collections::BTreeMap;
use std::collections::btree_map;

/// A value stored in an [`ArgBag`].
///
/// The three shapes map one-to-one onto the wire type tags (`s`, `b`,
/// `a`). The type tag must survive a round trip: a boolean never comes
/// back as the string `"true"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A plain string.
    Str(String),
    /// A boolean flag.
    Bool(bool),
    /// An ordered list of strings.
    List(Vec<String>),
}

impl Value {
    /// Returns the string contents, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list contents, if this is a list value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// A flat key/value argument bag.
///
/// Keys are unique; iteration order is lexicographic, which keeps the
/// encoded form deterministic. Insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgBag {
    entries: BTreeMap<String, Value>,
}

impl ArgBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value under `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Inserts a string value only when `value` is `Some`.
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<&str>) {
        if let Some(value) = value {
            self.entries.insert(key.into(), Value::Str(value.to_string()));
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the string stored under `key`, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Returns the boolean stored under `key`, if it is a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.entries.get(key).and_then(Value::as_bool)
    }

    /// Returns the list stored under `key`, if it is a list.
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).and_then(Value::as_list)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries in the bag.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the bag holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Merges `other` into this bag, overwriting duplicate keys.
    pub fn merge(&mut self, other: ArgBag) {
        self.entries.extend(other.entries);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ArgBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (k, v) in iter {
            bag.set(k, v);
        }
        bag
    }
}

impl<'a> IntoIterator for &'a ArgBag {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
