//! Ordered HTTP header map.
//!
//! Keys are stored as supplied. `insert` overwrites, `append` accumulates
//! into a list (the response parser uses it for repeated headers), and
//! `merge` is a shallow overwrite where the incoming map wins.

use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    List(Vec<String>),
}

impl HeaderValue {
    /// Every value in arrival order.
    pub fn values(&self) -> &[String] {
        match self {
            HeaderValue::Single(value) => std::slice::from_ref(value),
            HeaderValue::List(values) => values,
        }
    }

    /// The representative value: the last one received.
    pub fn last(&self) -> &str {
        self.values().last().map_or("", String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(first) => {
                *self = HeaderValue::List(vec![std::mem::take(first), value]);
            }
            HeaderValue::List(values) => values.push(value),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::List(values)
    }
}

impl PartialEq<&str> for HeaderValue {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, HeaderValue::Single(value) if value == other)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for HeaderValue {
    fn eq(&self, other: &[&str; N]) -> bool {
        matches!(self, HeaderValue::List(values) if values == other)
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.last())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: IndexMap<String, HeaderValue>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> &mut Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Add a value for `name`, turning an existing entry into a list.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.entries.entry(name.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
            Entry::Vacant(entry) => {
                entry.insert(HeaderValue::Single(value));
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Case-insensitive presence check, for wire-level decisions.
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.entries.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, HeaderValue> {
        self.entries.iter()
    }

    /// Flattened `(name, value)` pairs, one per value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, value)| value.values().iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Shallow merge: every key of `other` replaces the same key here.
    pub fn merge(&self, other: &Headers) -> Headers {
        let mut merged = self.clone();
        for (name, value) in &other.entries {
            merged.entries.insert(name.clone(), value.clone());
        }
        merged
    }
}

/// One `Name: value` line per value, joined by `\n`.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.pairs().map(|(name, value)| format!("{name}: {value}")).collect();
        f.write_str(&lines.join("\n"))
    }
}

impl<K: Into<String>, V: Into<HeaderValue>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl<K: Into<String>, V: Into<HeaderValue>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
