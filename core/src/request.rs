//! The immutable request produced by `Client::build`.

use serde::Serialize;

use crate::error::ApiError;
use crate::headers::Headers;
use crate::http::HttpMethod;
use crate::params::Params;
use crate::resource::Resource;

/// Request parameters: a `Params` map merged with the client defaults, or
/// a pre-encoded string sent verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Params(Params),
    Raw(String),
}

impl Payload {
    /// Serialize `value` as a JSON body. Pair it with a
    /// `Content-Type: application/json` header.
    pub fn json<T: Serialize>(value: &T) -> Result<Payload, ApiError> {
        serde_json::to_string(value)
            .map(Payload::Raw)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Params(params) => params.is_empty(),
            Payload::Raw(raw) => raw.is_empty(),
        }
    }

    /// The payload as it goes on the wire.
    pub fn encode(&self) -> String {
        match self {
            Payload::Params(params) => params.to_string(),
            Payload::Raw(raw) => raw.clone(),
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Params(Params::new())
    }
}

impl From<Params> for Payload {
    fn from(params: Params) -> Self {
        Payload::Params(params)
    }
}

impl From<&str> for Payload {
    fn from(raw: &str) -> Self {
        Payload::Raw(raw.to_string())
    }
}

impl From<String> for Payload {
    fn from(raw: String) -> Self {
        Payload::Raw(raw)
    }
}

/// A fully resolved request: verb, merged URL, merged parameters and
/// merged headers. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: HttpMethod,
    url: Resource,
    params: Payload,
    headers: Headers,
}

impl Request {
    pub fn new(method: HttpMethod, url: Resource, params: Payload, headers: Headers) -> Self {
        Self {
            method,
            url,
            params,
            headers,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &Resource {
        &self.url
    }

    pub fn params(&self) -> &Payload {
        &self.params
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}
