//! Response format resolution and the decoder registry.
//!
//! # Design
//! A content type such as `application/json; charset=utf-8` maps to a
//! format tag (`json`): the subtype of the first `type/subtype` pair, where
//! both parts are runs of word characters. Decoders are looked up by tag
//! and turn the body into a `serde_json::Value`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::DecodeError;
use crate::params::Params;

/// Format tag used when the content type names none.
pub const DEFAULT_FORMAT: &str = "text";

/// Decoder signature: body in, decoded value out.
pub type DecodeFn = Arc<dyn Fn(&str) -> Result<Value, DecodeError> + Send + Sync>;

/// Derive the format tag from a content type. Falls back to `text`.
pub fn resolve_format(content_type: &str) -> &str {
    let bytes = content_type.as_bytes();
    for (slash, _) in content_type.match_indices('/') {
        let major = bytes[..slash].iter().rev().take_while(|b| is_word(**b)).count();
        let minor = bytes[slash + 1..].iter().take_while(|b| is_word(**b)).count();
        if major > 0 && minor > 0 {
            return &content_type[slash + 1..slash + 1 + minor];
        }
    }
    DEFAULT_FORMAT
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Format tag → decoder table.
#[derive(Clone)]
pub struct Decoders {
    table: IndexMap<String, DecodeFn>,
}

impl Decoders {
    /// An empty table. Most callers want `Decoders::default()`.
    pub fn empty() -> Self {
        Self {
            table: IndexMap::new(),
        }
    }

    /// Register `decoder` under `format`, replacing any previous entry.
    pub fn register<F>(&mut self, format: impl Into<String>, decoder: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.table.insert(format.into(), Arc::new(decoder));
        self
    }

    pub fn get(&self, format: &str) -> Result<&DecodeFn, DecodeError> {
        self.table
            .get(format)
            .ok_or_else(|| DecodeError::UnknownFormat(format.to_string()))
    }

    /// Registered format tags in registration order.
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    /// Add every entry of `other`, overwriting collisions.
    pub fn extend(&mut self, other: &Decoders) {
        for (format, decoder) in &other.table {
            self.table.insert(format.clone(), Arc::clone(decoder));
        }
    }
}

/// `json`, `form`, and identity decoders for `text`, `plain` and `html`.
impl Default for Decoders {
    fn default() -> Self {
        let mut decoders = Decoders::empty();
        decoders
            .register("text", decode_text)
            .register("plain", decode_text)
            .register("html", decode_text)
            .register("json", decode_json)
            .register("form", decode_form);
        decoders
    }
}

impl fmt::Debug for Decoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.formats()).finish()
    }
}

pub fn decode_text(body: &str) -> Result<Value, DecodeError> {
    Ok(Value::String(body.to_string()))
}

/// JSON body into a value. An empty body (HEAD, 204) is `null`.
pub fn decode_json(body: &str) -> Result<Value, DecodeError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| DecodeError::Malformed {
        format: "json".to_string(),
        message: e.to_string(),
    })
}

/// Form-encoded body (`a=1&b[]=x`) into a JSON object.
pub fn decode_form(body: &str) -> Result<Value, DecodeError> {
    serde_json::to_value(Params::parse(body)).map_err(|e| DecodeError::Malformed {
        format: "form".to_string(),
        message: e.to_string(),
    })
}
