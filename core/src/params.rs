//! Query string / form body parameters.
//!
//! # Design
//! `Params` is an insertion-ordered map from key to `ParamValue`. Lists are
//! keyed by position rather than stored densely so that a sparse query such
//! as `a[3]=x` parses and re-serializes without inventing elements.
//!
//! Serialization follows `application/x-www-form-urlencoded` with PHP-style
//! array keys: `key[]=v` by default, `key[0]=v` when `indexed` is set.
//! Merging is deep: scalars on the right overwrite, lists accumulate.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Number, Value};

/// Position-keyed list of parameter values.
pub type ParamList = IndexMap<usize, ParamValue>;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Num(Number),
    List(ParamList),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ParamList> {
        match self {
            ParamValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Build a dense list from any sequence of values.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        ParamValue::List(values.into_iter().map(Into::into).enumerate().collect())
    }

    fn into_list(self) -> ParamList {
        match self {
            ParamValue::List(list) => list,
            scalar => [(0, scalar)].into_iter().collect(),
        }
    }

    fn merge(self, other: ParamValue) -> ParamValue {
        match (self, other) {
            (left @ ParamValue::List(_), right) | (left, right @ ParamValue::List(_)) => {
                let values = left.into_list().into_values().chain(right.into_list().into_values());
                ParamValue::list(values)
            }
            (_, right) => right,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Str(if value { "1" } else { "" }.to_string())
    }
}

macro_rules! integer_param {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::Num(Number::from(value))
            }
        })*
    };
}

integer_param!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(n) => ParamValue::Num(n),
            None => ParamValue::Str(value.to_string()),
        }
    }
}

impl<V: Into<ParamValue>> From<Vec<V>> for ParamValue {
    fn from(values: Vec<V>) -> Self {
        ParamValue::list(values)
    }
}

impl<V: Into<ParamValue>, const N: usize> From<[V; N]> for ParamValue {
    fn from(values: [V; N]) -> Self {
        ParamValue::list(values)
    }
}

impl TryFrom<Value> for ParamValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => ParamValue::Str(String::new()),
            Value::Bool(b) => ParamValue::from(b),
            Value::Number(n) => ParamValue::Num(n),
            Value::String(s) => ParamValue::Str(s),
            Value::Array(items) => ParamValue::List(
                items
                    .into_iter()
                    .map(ParamValue::try_from)
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .enumerate()
                    .collect(),
            ),
            Value::Object(_) => return Err("objects are not valid parameter values".to_string()),
        })
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::Str(s) => serializer.serialize_str(s),
            ParamValue::Num(n) => n.serialize(serializer),
            ParamValue::List(list) if list.keys().copied().eq(0..list.len()) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for value in list.values() {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            ParamValue::List(list) => {
                let mut map = serializer.serialize_map(Some(list.len()))?;
                for (index, value) in list {
                    map.serialize_entry(&index.to_string(), value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ParamValue::try_from(value).map_err(de::Error::custom)
    }
}

/// Ordered parameter map with its encoding flags.
#[derive(Debug, Clone)]
pub struct Params {
    entries: IndexMap<String, ParamValue>,
    indexed: bool,
    encode_keys: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
            indexed: false,
            encode_keys: true,
        }
    }
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a pre-encoded query string. `name[]` appends to a list at
    /// `name`, `name[3]` sets position 3, overwriting any earlier value.
    pub fn parse(query: &str) -> Self {
        let mut params = Params::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match split_list_key(&key) {
                Some((name, index)) => {
                    let slot = params
                        .entries
                        .entry(name.to_string())
                        .or_insert_with(|| ParamValue::List(ParamList::new()));
                    if !matches!(slot, ParamValue::List(_)) {
                        *slot = ParamValue::List(ParamList::new());
                    }
                    if let ParamValue::List(list) = slot {
                        let index = index.unwrap_or_else(|| next_index(list));
                        list.insert(index, ParamValue::Str(value.into_owned()));
                    }
                }
                None => {
                    params.entries.insert(key.to_string(), ParamValue::Str(value.into_owned()));
                }
            }
        }
        params
    }

    /// Emit `key[0]=` instead of `key[]=` for list elements.
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Percent-encode keys (on by default).
    pub fn encode_keys(mut self, encode_keys: bool) -> Self {
        self.encode_keys = encode_keys;
        self
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ParamValue> {
        self.entries.iter()
    }

    /// Deep merge giving precedence to `other`. The result keeps this
    /// instance's flags.
    pub fn merge(&self, other: &Params) -> Params {
        let mut merged = self.clone();
        for (key, value) in &other.entries {
            match merged.entries.get_mut(key) {
                Some(existing) => {
                    let current = std::mem::replace(existing, ParamValue::Str(String::new()));
                    *existing = current.merge(value.clone());
                }
                None => {
                    merged.entries.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }

    fn write_pair(&self, out: &mut Vec<String>, key: &str, value: &ParamValue) {
        match value {
            ParamValue::List(list) => {
                for (index, item) in list {
                    let key = if self.indexed {
                        format!("{key}[{index}]")
                    } else {
                        format!("{key}[]")
                    };
                    self.write_pair(out, &key, item);
                }
            }
            ParamValue::Str(s) => self.push_scalar(out, key, encode(s)),
            ParamValue::Num(n) => self.push_scalar(out, key, n.to_string()),
        }
    }

    fn push_scalar(&self, out: &mut Vec<String>, key: &str, value: String) {
        if self.encode_keys {
            out.push(format!("{}={value}", encode(key)));
        } else {
            out.push(format!("{key}={value}"));
        }
    }
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn next_index(list: &ParamList) -> usize {
    list.keys().max().map_or(0, |max| max + 1)
}

/// Split `name[idx]` into `name` and the optional numeric index.
fn split_list_key(key: &str) -> Option<(&str, Option<usize>)> {
    let inner = key.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (name, index) = (&inner[..open], &inner[open + 1..]);
    if name.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match index {
        "" => Some((name, None)),
        digits => digits.parse().ok().map(|i| (name, Some(i))),
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            self.write_pair(&mut pairs, key, value);
        }
        f.write_str(&pairs.join("&"))
    }
}

impl FromStr for Params {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Params::parse(s))
    }
}

/// Equality compares entries only; encoding flags are presentation.
impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K: Into<String>, V: Into<ParamValue>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
