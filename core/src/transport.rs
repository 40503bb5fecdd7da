//! The transport boundary.
//!
//! # Design
//! The client never touches the network itself. A `Transport` receives an
//! `HttpRequest` and answers with an `HttpResponse` whose `raw` field is
//! the full response text as it would appear on the wire. Failures are
//! reported through `HttpResponse::error`, never by panicking or returning
//! early, so the client can always build a `Response`.
//!
//! A transport is used by one call at a time (`&mut self`); `reset` runs
//! after every call so no state leaks from one request into the next.

use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    /// Perform one request/response round trip, blocking until complete.
    fn execute(&mut self, request: &HttpRequest) -> HttpResponse;

    /// Clear per-call state. Called after every `execute`.
    fn reset(&mut self) {}
}

impl<F> Transport for F
where
    F: FnMut(&HttpRequest) -> HttpResponse,
{
    fn execute(&mut self, request: &HttpRequest) -> HttpResponse {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::time::Instant;

    use ureq::http::Response;
    use ureq::typestate::{WithBody, WithoutBody};
    use ureq::{Body, RequestBuilder, ResponseExt};

    use super::Transport;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportInfo};

    const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

    /// Blocking transport backed by `ureq`.
    ///
    /// Builds a fresh agent per call from the request's timeout, so nothing
    /// is shared between calls. 4xx/5xx statuses are returned as data, and
    /// redirects are followed with the final URI reported in `info.url`.
    #[derive(Debug, Clone, Default)]
    pub struct UreqTransport;

    impl UreqTransport {
        pub fn new() -> Self {
            Self
        }
    }

    impl Transport for UreqTransport {
        fn execute(&mut self, request: &HttpRequest) -> HttpResponse {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(request.timeout))
                .build()
                .new_agent();

            let started = Instant::now();
            let url = request.url.as_str();
            let body = request.body.as_deref();
            let result = match request.method {
                HttpMethod::Get => with_headers(agent.get(url), request).call(),
                HttpMethod::Head => send_without_body(with_headers(agent.head(url), request), body),
                HttpMethod::Delete => send_without_body(with_headers(agent.delete(url), request), body),
                HttpMethod::Options => send_without_body(with_headers(agent.options(url), request), body),
                HttpMethod::Post => send_with_body(with_headers(agent.post(url), request), body),
                HttpMethod::Put => send_with_body(with_headers(agent.put(url), request), body),
                HttpMethod::Patch => send_with_body(with_headers(agent.patch(url), request), body),
            };

            match result {
                Ok(response) => to_http_response(response, request.method, started),
                Err(e) => {
                    log::debug!("{} {} failed: {e}", request.method, request.url);
                    HttpResponse::failed(e.to_string(), url, started.elapsed())
                }
            }
        }
    }

    fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let has_content_type = request
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        let has_body = request.body.as_deref().is_some_and(|b| !b.is_empty());
        if has_body && !has_content_type {
            builder = builder.header("Content-Type", FORM_CONTENT_TYPE);
        }
        builder.header("User-Agent", request.user_agent.as_str())
    }

    fn send_with_body(
        builder: RequestBuilder<WithBody>,
        body: Option<&str>,
    ) -> Result<Response<Body>, ureq::Error> {
        match body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    fn send_without_body(
        builder: RequestBuilder<WithoutBody>,
        body: Option<&str>,
    ) -> Result<Response<Body>, ureq::Error> {
        match body {
            Some(body) if !body.is_empty() => builder.force_send_body().send(body.as_bytes()),
            _ => builder.call(),
        }
    }

    /// Rebuild the wire form of the response: status line, headers, blank
    /// line, body.
    fn to_http_response(mut response: Response<Body>, method: HttpMethod, started: Instant) -> HttpResponse {
        let status = response.status();
        let mut raw = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        for (name, value) in response.headers() {
            raw.push_str(&format!("{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes())));
        }
        raw.push_str("\r\n");

        let url = response.get_uri().to_string();
        let mut error = String::new();
        if method != HttpMethod::Head {
            match response.body_mut().read_to_vec() {
                Ok(bytes) => raw.push_str(&String::from_utf8_lossy(&bytes)),
                Err(e) => error = e.to_string(),
            }
        }

        HttpResponse {
            raw,
            error,
            info: TransportInfo {
                status_code: status.as_u16(),
                url,
                total_time: started.elapsed(),
            },
        }
    }
}
