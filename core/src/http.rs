//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe what crosses the transport boundary as plain data.
//! The client turns a `Request` into an `HttpRequest`, hands it to a
//! `Transport`, and gets back an `HttpResponse` holding the raw response
//! text (status line(s), header block, blank line, body) plus metadata.
//! Nothing in here performs I/O.
//!
//! All fields use owned types so values can be recorded, replayed and
//! compared in tests without lifetime concerns.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"get"`, `"Get"` and `"GET"` are the same verb.
impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or(ApiError::BadMethod(upper))
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

/// An HTTP request described as plain data, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

/// What the transport learned about the exchange besides the raw bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportInfo {
    /// Final status code; 0 when no response was received.
    pub status_code: u16,
    /// Effective URL after any redirects the transport followed.
    pub url: String,
    pub total_time: Duration,
}

/// The transport's answer: the raw response text, an error message (empty
/// on success) and metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub raw: String,
    pub error: String,
    pub info: TransportInfo,
}

impl HttpResponse {
    /// A response describing a failed exchange.
    pub fn failed(error: impl Into<String>, url: impl Into<String>, total_time: Duration) -> Self {
        Self {
            raw: String::new(),
            error: error.into(),
            info: TransportInfo {
                status_code: 0,
                url: url.into(),
                total_time,
            },
        }
    }
}
