//! Raw HTTP/1.x response parser.
//!
//! Splits a complete response buffer into status lines, headers and body.
//! Interim responses (`100 Continue`) carry no headers, so their blank line
//! is skipped and the final status line follows. The first blank line after
//! a header ends the head; everything after it is the body, verbatim.

use crate::headers::Headers;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub status_lines: Vec<String>,
    pub headers: Headers,
    pub body: String,
}

impl ParsedResponse {
    /// The `Content-Type` header; the last one wins when it is repeated.
    pub fn content_type(&self) -> &str {
        self.headers.get(CONTENT_TYPE).map_or("", |v| v.last())
    }
}

/// Normalized key of the content type header.
pub const CONTENT_TYPE: &str = "content_type";

/// Lowercase, trim and replace `-` with `_`: `Content-Type` → `content_type`.
pub fn normalize_header_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

pub fn parse_response(raw: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();
    let mut rest = raw;

    loop {
        let (line, remainder) = match rest.split_once('\n') {
            Some((line, remainder)) => (line, Some(remainder)),
            None => (rest, None),
        };

        let line = line.trim();
        if line.is_empty() {
            if !parsed.headers.is_empty() {
                parsed.body = remainder.unwrap_or("").to_string();
                break;
            }
        } else if line.starts_with("HTTP") {
            parsed.status_lines.push(line.to_string());
        } else if let Some((name, value)) = line.split_once(':') {
            parsed.headers.append(normalize_header_name(name), value.trim());
        }

        match remainder {
            Some(remainder) => rest = remainder,
            None => break,
        }
    }
    parsed
}
