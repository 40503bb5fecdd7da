//! Client configuration.
//!
//! # Design
//! `ClientConfig` is the single place options live. `ClientBuilder` fills
//! one in, `ClientConfig::from_json` reads one from a document, and the
//! legacy `Client::set_option` edits one by name; every path ends in
//! `Client::from_config`. Unknown option names are rejected
//! (`deny_unknown_fields`) rather than ignored.
//!
//! `build_indexed_queries` is read in exactly one place, when the client
//! applies it to both its base URL query and its default params.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::params::ParamValue;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Names accepted by `ClientConfig::set`.
pub const OPTION_KEYS: [&str; 11] = [
    "base_url",
    "headers",
    "params",
    "user_agent",
    "timeout",
    "allowed_verbs",
    "build_indexed_queries",
    "format",
    "username",
    "password",
    "decoders",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Prefix for every request URL; may be partial (`https://api.host`).
    pub base_url: String,
    /// Default headers, overridden per call.
    pub headers: IndexMap<String, String>,
    /// Default params, deep-merged with per-call params.
    pub params: IndexMap<String, ParamValue>,
    pub user_agent: String,
    /// Overall request timeout in seconds.
    pub timeout: u64,
    pub allowed_verbs: Vec<HttpMethod>,
    /// Emit `key[0]=` rather than `key[]=` for list params.
    pub build_indexed_queries: bool,
    /// Fixed response format; disables content-type detection.
    pub format: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Format tags mapped to the name of a built-in decoder, e.g.
    /// `{"vnd": "json"}`.
    pub decoders: IndexMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            headers: IndexMap::new(),
            params: IndexMap::new(),
            user_agent: default_user_agent(),
            timeout: 10,
            allowed_verbs: HttpMethod::ALL.to_vec(),
            build_indexed_queries: false,
            format: None,
            username: None,
            password: None,
            decoders: IndexMap::new(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("Rust RestClient/{VERSION} ({})", std::env::consts::OS)
}

impl ClientConfig {
    pub fn from_json(document: &str) -> Result<Self, ApiError> {
        serde_json::from_str(document).map_err(|e| ApiError::Configuration(e.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Set one option by name from a JSON value.
    pub fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), ApiError> {
        if !OPTION_KEYS.contains(&key) {
            return Err(ApiError::Configuration(format!("`{key}` is not a valid option")));
        }
        let mut document =
            serde_json::to_value(&*self).map_err(|e| ApiError::Configuration(e.to_string()))?;
        document[key] = value;
        *self = serde_json::from_value(document)
            .map_err(|e| ApiError::Configuration(format!("invalid value for `{key}`: {e}")))?;
        Ok(())
    }
}
