//! Error types for the REST client.
//!
//! # Design
//! Configuration and programming mistakes (unknown option, unknown verb,
//! unparsable URL) are returned as `Err` before any I/O happens. Network
//! failures are *not* errors here: they are recorded on the `Response` so
//! that whatever was received stays inspectable. `Response::error_for_status`
//! converts that recorded state into an `ApiError` for callers that prefer
//! `?`. Decode failures get their own `DecodeError` so "the server answered
//! in a format we cannot read" stays distinct from "the server did not
//! answer".

/// Errors returned by the client, the URL model and the response helpers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An option name or value was rejected.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The HTTP verb is unknown or not in the client's allowed set.
    #[error("unsupported HTTP method `{0}`")]
    BadMethod(String),

    /// The URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The response body could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The transport reported a failure (connect, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Failures of the decode step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// No decoder is registered under this format tag.
    #[error("no decoder registered for format `{0}`")]
    UnknownFormat(String),

    /// A decoder was found but rejected the body.
    #[error("malformed `{format}` body: {message}")]
    Malformed { format: String, message: String },

    /// `data()` was read before the response was decoded.
    #[error("response has not been decoded")]
    NotDecoded,
}
