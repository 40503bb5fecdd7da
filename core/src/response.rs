//! The response returned by `Client::send`.
//!
//! # Design
//! A `Response` is built from the transport's raw answer, then `parse`
//! splits it into status lines, headers and body, and `decode` fills `data`.
//! Both steps are one-shot: repeating them is a no-op.
//!
//! Transport failures and decode failures are recorded rather than raised,
//! so the raw body, headers and status stay readable when either fails.
//! Decoded data and headers are only reachable through shared references;
//! `Response` implements `Index` but not `IndexMut`.

use std::ops::Index;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::decode::{resolve_format, DecodeFn};
use crate::error::{ApiError, DecodeError};
use crate::headers::{HeaderValue, Headers};
use crate::http::{HttpResponse, TransportInfo};
use crate::parser::{normalize_header_name, parse_response};
use crate::request::Request;

static NULL: Value = Value::Null;

#[derive(Debug, Clone)]
pub struct Response {
    request: Request,
    raw: String,
    status_lines: Vec<String>,
    headers: Headers,
    content_type: String,
    format: String,
    body: String,
    data: Option<Value>,
    decode_error: Option<DecodeError>,
    info: TransportInfo,
    error: String,
    parsed: bool,
}

impl Response {
    pub fn new(request: Request, response: HttpResponse) -> Self {
        Self {
            request,
            raw: response.raw,
            status_lines: Vec::new(),
            headers: Headers::new(),
            content_type: String::new(),
            format: String::new(),
            body: String::new(),
            data: None,
            decode_error: None,
            info: response.info,
            error: response.error,
            parsed: false,
        }
    }

    /// Split the raw response into status lines, headers, body and content
    /// type.
    pub fn parse(&mut self) {
        if self.parsed {
            return;
        }
        let parsed = parse_response(&self.raw);
        self.content_type = parsed.content_type().to_string();
        self.format = resolve_format(&self.content_type).to_string();
        self.status_lines = parsed.status_lines;
        self.headers = parsed.headers;
        self.body = parsed.body;
        self.parsed = true;
    }

    /// Decode the body with `decoder`, once. Later calls return the cached
    /// value.
    pub fn decode(&mut self, decoder: &DecodeFn) -> Result<&Value, DecodeError> {
        if self.data.is_none() {
            match decoder(&self.body) {
                Ok(value) => {
                    self.decode_error = None;
                    self.data = Some(value);
                }
                Err(e) => {
                    self.decode_error = Some(e.clone());
                    return Err(e);
                }
            }
        }
        Ok(self.data.as_ref().unwrap_or(&NULL))
    }

    /// Decode as `format` regardless of the content type.
    pub(crate) fn force_format(&mut self, format: &str) {
        self.format = format.to_string();
    }

    /// Record a failure that happened before a decoder could run, such as
    /// an unregistered format.
    pub(crate) fn fail_decode(&mut self, error: DecodeError) {
        self.decode_error = Some(error);
    }

    /// Format tag that selects the decoder: derived from the content type
    /// (`application/json` → `json`) unless the client fixed one.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The decoded body, or why it is unavailable.
    pub fn data(&self) -> Result<&Value, DecodeError> {
        match (&self.data, &self.decode_error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error.clone()),
            (None, None) => Err(DecodeError::NotDecoded),
        }
    }

    /// Deserialize the body into `T`, independent of the decoder registry.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The unparsed response text, headers included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn status_lines(&self) -> &[String] {
        &self.status_lines
    }

    /// Response headers keyed by normalized name (`content_type`).
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Header lookup by any spelling: `Content-Type`, `content-type` and
    /// `content_type` are the same header.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(&normalize_header_name(name))
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn info(&self) -> &TransportInfo {
        &self.info
    }

    /// Transport error message; empty when the exchange succeeded.
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn status_code(&self) -> u16 {
        self.info.status_code
    }

    /// True for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.info.status_code)
    }

    pub fn is_fail(&self) -> bool {
        !self.is_success()
    }

    /// Turn a transport failure or non-2xx status into an `ApiError`.
    pub fn error_for_status(&self) -> Result<&Self, ApiError> {
        if !self.error.is_empty() {
            return Err(ApiError::Transport(self.error.clone()));
        }
        match self.info.status_code {
            200..=299 => Ok(self),
            404 => Err(ApiError::NotFound),
            status => Err(ApiError::HttpError {
                status,
                body: self.body.clone(),
            }),
        }
    }

    #[deprecated(note = "use `status_lines`")]
    pub fn response_status_lines(&self) -> &[String] {
        self.status_lines()
    }

    #[deprecated(note = "use `data`")]
    pub fn decode_response(&self) -> Result<&Value, DecodeError> {
        self.data()
    }
}

/// Read-only access into the decoded data: `response["key"]`. Missing keys
/// and undecoded responses yield `Value::Null`.
impl Index<&str> for Response {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.data.as_ref().map_or(&NULL, |data| &data[key])
    }
}

impl Index<usize> for Response {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        self.data.as_ref().map_or(&NULL, |data| &data[index])
    }
}
