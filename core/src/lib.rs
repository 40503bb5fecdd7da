//! Synchronous REST client core.
//!
//! # Overview
//! Builds HTTP requests from ergonomic inputs (partial URLs, nested
//! parameter maps, header maps), hands them to a pluggable `Transport`, and
//! parses the raw response into status lines, headers, body and decoded
//! data.
//!
//! # Design
//! - `Client::build` is pure: it merges per-call input onto configured
//!   defaults and yields an immutable `Request`. `Client::send` is the only
//!   step that does I/O, and only through the `Transport` trait, so the core
//!   stays deterministic and testable with a closure as the transport.
//! - URLs (`Resource`), paths (`Path`), parameters (`Params`) and headers
//!   (`Headers`) are value types with non-mutating `merge`.
//! - Transport and decode failures are data on the `Response`;
//!   `Response::error_for_status` turns them into an `ApiError` on demand.
//! - The `ureq` feature (on by default) supplies `UreqTransport`.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod headers;
pub mod http;
pub mod params;
pub mod parser;
pub mod path;
pub mod request;
pub mod resource;
pub mod response;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use decode::{DecodeFn, Decoders};
pub use error::{ApiError, DecodeError};
pub use headers::{HeaderValue, Headers};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransportInfo};
pub use params::{ParamValue, Params};
pub use path::Path;
pub use request::{Payload, Request};
pub use resource::Resource;
pub use response::Response;
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
