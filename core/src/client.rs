//! The REST client: request assembly, transport dispatch, response decoding.
//!
//! # Design
//! `Client` splits every call into `build` (pure: merges the call's URL,
//! params and headers onto the configured defaults and produces an
//! immutable `Request`) and `send` (hands an `HttpRequest` to the
//! `Transport`, then parses and decodes the answer). `execute` and the
//! per-verb wrappers run both steps.
//!
//! The transport is owned by the client and used by one call at a time;
//! `send` takes `&mut self` for that reason. Network and decode failures are
//! recorded on the returned `Response`, so only configuration mistakes
//! (bad verb, bad URL) come back as `Err`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64ct::{Base64, Encoding};
use indexmap::IndexMap;
use log::{Level, Log, Metadata, Record};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::decode::{DecodeFn, Decoders};
use crate::error::{ApiError, DecodeError};
use crate::headers::Headers;
use crate::http::{HttpMethod, HttpRequest};
use crate::params::{ParamValue, Params};
use crate::request::{Payload, Request};
use crate::resource::Resource;
use crate::response::Response;
use crate::transport::Transport;

pub struct Client {
    config: ClientConfig,
    base_url: Resource,
    headers: Headers,
    params: Params,
    decoders: Decoders,
    transport: Box<dyn Transport>,
    logger: Arc<dyn Log>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// A client with the default transport and the process-wide logger.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Self::assemble(config, Decoders::default(), default_transport()?, Arc::new(GlobalLogger))
    }

    fn assemble(
        config: ClientConfig,
        mut decoders: Decoders,
        transport: Box<dyn Transport>,
        logger: Arc<dyn Log>,
    ) -> Result<Self, ApiError> {
        let (base_url, headers, params) = resolve_defaults(&config)?;
        alias_decoders(&mut decoders, &config.decoders)?;
        Ok(Self {
            config,
            base_url,
            headers,
            params,
            decoders,
            transport,
            logger,
        })
    }

    /// Build and send a request. `method` is case-insensitive.
    pub fn execute(
        &mut self,
        method: &str,
        url: &str,
        params: impl Into<Payload>,
        headers: impl Into<Headers>,
    ) -> Result<Response, ApiError> {
        let method = method.parse()?;
        let request = self.build(method, url, params, headers)?;
        Ok(self.send(request))
    }

    pub fn get(&mut self, url: &str, params: impl Into<Payload>, headers: impl Into<Headers>) -> Result<Response, ApiError> {
        self.dispatch(HttpMethod::Get, url, params, headers)
    }

    pub fn post(&mut self, url: &str, params: impl Into<Payload>, headers: impl Into<Headers>) -> Result<Response, ApiError> {
        self.dispatch(HttpMethod::Post, url, params, headers)
    }

    pub fn put(&mut self, url: &str, params: impl Into<Payload>, headers: impl Into<Headers>) -> Result<Response, ApiError> {
        self.dispatch(HttpMethod::Put, url, params, headers)
    }

    pub fn patch(&mut self, url: &str, params: impl Into<Payload>, headers: impl Into<Headers>) -> Result<Response, ApiError> {
        self.dispatch(HttpMethod::Patch, url, params, headers)
    }

    pub fn delete(&mut self, url: &str, params: impl Into<Payload>, headers: impl Into<Headers>) -> Result<Response, ApiError> {
        self.dispatch(HttpMethod::Delete, url, params, headers)
    }

    pub fn head(&mut self, url: &str, params: impl Into<Payload>, headers: impl Into<Headers>) -> Result<Response, ApiError> {
        self.dispatch(HttpMethod::Head, url, params, headers)
    }

    pub fn options(&mut self, url: &str, params: impl Into<Payload>, headers: impl Into<Headers>) -> Result<Response, ApiError> {
        self.dispatch(HttpMethod::Options, url, params, headers)
    }

    fn dispatch(
        &mut self,
        method: HttpMethod,
        url: &str,
        params: impl Into<Payload>,
        headers: impl Into<Headers>,
    ) -> Result<Response, ApiError> {
        let request = self.build(method, url, params, headers)?;
        Ok(self.send(request))
    }

    /// Resolve a call against the client defaults.
    ///
    /// The URL is parsed and overlaid on the base URL. `Params` payloads are
    /// deep-merged onto the default params; raw string payloads are kept
    /// verbatim and never merged. Headers overwrite defaults by name.
    pub fn build(
        &self,
        method: HttpMethod,
        url: &str,
        params: impl Into<Payload>,
        headers: impl Into<Headers>,
    ) -> Result<Request, ApiError> {
        if !self.config.allowed_verbs.contains(&method) {
            return Err(ApiError::BadMethod(method.to_string()));
        }
        let url = self.base_url.merge(&Resource::parse(url)?);
        let params = match params.into() {
            Payload::Params(params) => Payload::Params(self.params.merge(&params)),
            raw => raw,
        };

        let mut headers = self.headers.merge(&headers.into());
        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            if !headers.contains_ignore_case("authorization") {
                let credentials = Base64::encode_string(format!("{username}:{password}").as_bytes());
                headers.insert("Authorization", format!("Basic {credentials}"));
            }
        }

        self.log(Level::Debug, format_args!("{method} {url}"));
        Ok(Request::new(method, url, params, headers))
    }

    /// Perform `request` and decode the answer.
    ///
    /// GET sends the payload as query parameters; every other verb sends it
    /// as the body. Never both.
    pub fn send(&mut self, request: Request) -> Response {
        let method = request.method();
        let (url, body) = if method == HttpMethod::Get {
            (query_url(request.url(), request.params()), None)
        } else {
            (request.url().to_string(), Some(request.params().encode()))
        };

        let http_request = HttpRequest {
            method,
            url,
            headers: request
                .headers()
                .pairs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body,
            timeout: self.config.timeout(),
            user_agent: self.config.user_agent.clone(),
        };

        let http_response = self.transport.execute(&http_request);
        if !http_response.error.is_empty() {
            self.log(
                Level::Warn,
                format_args!("{method} {} failed: {}", http_request.url, http_response.error),
            );
        }

        let mut response = Response::new(request, http_response);
        response.parse();

        if let Some(format) = &self.config.format {
            response.force_format(format);
        }
        match self.decoder(response.format()) {
            Ok(decoder) => {
                if let Err(e) = response.decode(&decoder) {
                    self.log(Level::Warn, format_args!("{method} {}: {e}", http_request.url));
                }
            }
            Err(e) => {
                self.log(Level::Warn, format_args!("{method} {}: {e}", http_request.url));
                response.fail_decode(e);
            }
        }

        self.transport.reset();
        response
    }

    /// Register `decoder` for `format`, replacing any existing one.
    pub fn register_decoder<F>(&mut self, format: impl Into<String>, decoder: F) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.decoders.register(format, decoder);
        self
    }

    pub fn decoder(&self, format: &str) -> Result<DecodeFn, DecodeError> {
        let decoder = self.decoders.get(format)?;
        self.log(Level::Debug, format_args!("using decoder for format `{format}`"));
        Ok(Arc::clone(decoder))
    }

    pub fn decoders(&self) -> &Decoders {
        &self.decoders
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Resource {
        &self.base_url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    #[deprecated(note = "use `params`")]
    pub fn parameters(&self) -> &Params {
        self.params()
    }

    /// Change one option by name. On error the client is left unchanged.
    #[deprecated(note = "configure the client through `ClientBuilder` or `ClientConfig`")]
    pub fn set_option(&mut self, key: &str, value: Value) -> Result<(), ApiError> {
        let mut config = self.config.clone();
        config.set(key, value)?;
        let (base_url, headers, params) = resolve_defaults(&config)?;
        let mut decoders = self.decoders.clone();
        alias_decoders(&mut decoders, &config.decoders)?;

        self.config = config;
        self.base_url = base_url;
        self.headers = headers;
        self.params = params;
        self.decoders = decoders;
        Ok(())
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(module_path!()).build();
        if self.logger.enabled(&metadata) {
            self.logger.log(
                &Record::builder()
                    .metadata(metadata)
                    .args(args)
                    .module_path(Some(module_path!()))
                    .file(Some(file!()))
                    .build(),
            );
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("decoders", &self.decoders)
            .finish_non_exhaustive()
    }
}

/// The GET target: `Params` merge into the URL query, raw strings are
/// appended to it as they are.
fn query_url(url: &Resource, payload: &Payload) -> String {
    match payload {
        Payload::Params(params) if !params.is_empty() => {
            let mut url = url.clone();
            url.query = url.query.merge(params);
            url.to_string()
        }
        Payload::Raw(raw) if !raw.is_empty() => {
            let separator = if url.query.is_empty() { '?' } else { '&' };
            format!("{url}{separator}{raw}")
        }
        _ => url.to_string(),
    }
}

/// Base URL, default headers and default params from a config. The
/// `build_indexed_queries` flag is applied to the base query and the
/// default params here and nowhere else.
fn resolve_defaults(config: &ClientConfig) -> Result<(Resource, Headers, Params), ApiError> {
    let mut base_url = Resource::parse(&config.base_url)?;
    base_url.query = std::mem::take(&mut base_url.query).indexed(config.build_indexed_queries);

    let headers = config
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    let params = config
        .params
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<Params>()
        .indexed(config.build_indexed_queries);
    Ok((base_url, headers, params))
}

/// Register each `format -> built-in decoder name` alias.
fn alias_decoders(decoders: &mut Decoders, aliases: &IndexMap<String, String>) -> Result<(), ApiError> {
    let builtin = Decoders::default();
    for (format, name) in aliases {
        let decoder = Arc::clone(
            builtin
                .get(name)
                .map_err(|_| ApiError::Configuration(format!("unknown decoder `{name}` for format `{format}`")))?,
        );
        decoders.register(format.clone(), move |body| decoder(body));
    }
    Ok(())
}

#[cfg(feature = "ureq")]
fn default_transport() -> Result<Box<dyn Transport>, ApiError> {
    Ok(Box::new(crate::transport::UreqTransport::new()))
}

#[cfg(not(feature = "ureq"))]
fn default_transport() -> Result<Box<dyn Transport>, ApiError> {
    Err(ApiError::Configuration(
        "no transport: enable the `ureq` feature or set one with `ClientBuilder::transport`".to_string(),
    ))
}

/// Forwards to the logger installed for the process, if any.
struct GlobalLogger;

impl Log for GlobalLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Fluent construction of a `Client`.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    decoders: Decoders,
    transport: Option<Box<dyn Transport>>,
    logger: Option<Arc<dyn Log>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config; later setters override it.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.config.params.insert(key.into(), value.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Whole seconds; sub-second precision is dropped.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout.as_secs();
        self
    }

    pub fn allowed_verbs(mut self, verbs: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.config.allowed_verbs = verbs.into_iter().collect();
        self
    }

    pub fn build_indexed_queries(mut self, indexed: bool) -> Self {
        self.config.build_indexed_queries = indexed;
        self
    }

    /// Decode every response as `format`, ignoring its content type.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.format = Some(format.into());
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    pub fn decoder<F>(mut self, format: impl Into<String>, decoder: F) -> Self
    where
        F: Fn(&str) -> Result<Value, DecodeError> + Send + Sync + 'static,
    {
        self.decoders.register(format, decoder);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };
        let logger = self.logger.unwrap_or_else(|| Arc::new(GlobalLogger));
        Client::assemble(self.config, self.decoders, transport, logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, TransportInfo};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Seen = Arc<Mutex<Vec<HttpRequest>>>;

    /// A transport that records every request and answers with `raw`.
    fn replying(raw: &'static str) -> (impl Transport, Seen) {
        let seen = Seen::default();
        let log = Arc::clone(&seen);
        let transport = move |request: &HttpRequest| {
            log.lock().unwrap().push(request.clone());
            HttpResponse {
                raw: raw.to_string(),
                error: String::new(),
                info: TransportInfo {
                    status_code: 200,
                    url: request.url.clone(),
                    total_time: Duration::ZERO,
                },
            }
        };
        (transport, seen)
    }

    const JSON_OK: &str = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"foo\":\"bar\"}";

    fn client(builder: ClientBuilder) -> (Client, Seen) {
        let (transport, seen) = replying(JSON_OK);
        (builder.transport(transport).build().unwrap(), seen)
    }

    fn last(seen: &Seen) -> HttpRequest {
        seen.lock().unwrap().last().cloned().unwrap()
    }

    fn sample() -> Params {
        Params::from([
            ("foo", ParamValue::from(" bar")),
            ("baz", ParamValue::from(1)),
            ("bat", ParamValue::from(["foo", "bar"])),
        ])
    }

    #[test]
    fn get_puts_params_in_the_query() {
        let (mut api, seen) = client(Client::builder().base_url("http://api.test"));
        api.get("/users", sample(), Headers::new()).unwrap();
        let sent = last(&seen);
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.url, "http://api.test/users?foo=+bar&baz=1&bat%5B%5D=foo&bat%5B%5D=bar");
        assert_eq!(sent.body, None);
    }

    #[test]
    fn other_verbs_put_params_in_the_body() {
        let (mut api, seen) = client(Client::builder().base_url("http://api.test"));
        api.post("/users", sample(), Headers::new()).unwrap();
        let sent = last(&seen);
        assert_eq!(sent.url, "http://api.test/users");
        assert_eq!(sent.body.as_deref(), Some("foo=+bar&baz=1&bat%5B%5D=foo&bat%5B%5D=bar"));

        api.delete("/users/1", Params::from([("foo", " bar"), ("baz", "1")]), Headers::new())
            .unwrap();
        let sent = last(&seen);
        assert_eq!(sent.method, HttpMethod::Delete);
        assert_eq!(sent.url, "http://api.test/users/1");
        assert_eq!(sent.body.as_deref(), Some("foo=+bar&baz=1"));
    }

    #[test]
    fn default_params_merge_under_call_params() {
        let (mut api, seen) = client(
            Client::builder()
                .base_url("http://api.test")
                .param("key", "abc")
                .param("tags", ["a"]),
        );
        api.get("/search", Params::from([("q", ParamValue::from("x")), ("tags", ParamValue::from(["b"]))]), Headers::new())
            .unwrap();
        assert_eq!(last(&seen).url, "http://api.test/search?key=abc&tags%5B%5D=a&tags%5B%5D=b&q=x");
    }

    #[test]
    fn raw_payloads_are_sent_verbatim() {
        let (mut api, seen) = client(Client::builder().base_url("http://api.test").param("key", "abc"));
        api.patch(
            "/items/1",
            r#"{"done":true}"#,
            Headers::from([("Content-Type", "application/json")]),
        )
        .unwrap();
        let sent = last(&seen);
        assert_eq!(sent.body.as_deref(), Some(r#"{"done":true}"#));
        assert!(sent
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[test]
    fn raw_payloads_on_get_become_query_params() {
        let (mut api, seen) = client(Client::builder().base_url("http://api.test"));
        api.get("/items?page=2", "a=1&b=2", Headers::new()).unwrap();
        assert_eq!(last(&seen).url, "http://api.test/items?page=2&a=1&b=2");

        api.get("/x", "id=1&id=2&q=a%20b&flag", Headers::new()).unwrap();
        let sent = last(&seen);
        assert_eq!(sent.url, "http://api.test/x?id=1&id=2&q=a%20b&flag");
        assert_eq!(sent.body, None);
    }

    #[test]
    fn call_url_overlays_base_url() {
        let (mut api, seen) = client(Client::builder().base_url("https://api.test:8443/v1?token=t"));
        api.get("", Params::new(), Headers::new()).unwrap();
        assert_eq!(last(&seen).url, "https://api.test:8443/v1?token=t");
        api.get("http://other.test/x", Params::new(), Headers::new()).unwrap();
        assert_eq!(last(&seen).url, "http://other.test:8443/x?token=t");
    }

    #[test]
    fn verbs_outside_the_allowed_set_are_rejected() {
        let (mut api, seen) = client(Client::builder().allowed_verbs([HttpMethod::Get]));
        let err = api.post("http://api.test/", Params::new(), Headers::new()).unwrap_err();
        assert!(matches!(err, ApiError::BadMethod(ref m) if m == "POST"));
        let err = api.execute("brew", "http://api.test/", Params::new(), Headers::new()).unwrap_err();
        assert!(matches!(err, ApiError::BadMethod(ref m) if m == "BREW"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn execute_normalizes_the_verb() {
        let (mut api, seen) = client(Client::builder());
        api.execute("put", "http://api.test/", Params::from([("a", "1")]), Headers::new())
            .unwrap();
        assert_eq!(last(&seen).method, HttpMethod::Put);
    }

    #[test]
    fn invalid_urls_fail_before_sending() {
        let (mut api, seen) = client(Client::builder());
        let err = api.get("http://api.test:99999/", Params::new(), Headers::new()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn call_headers_override_defaults() {
        let (mut api, seen) = client(
            Client::builder()
                .header("Accept", "text/plain")
                .header("X-Client", "tests"),
        );
        api.get(
            "http://api.test/",
            Params::new(),
            Headers::from([("Accept", "application/json")]),
        )
        .unwrap();
        let sent = last(&seen);
        assert_eq!(
            sent.headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("X-Client".to_string(), "tests".to_string()),
            ]
        );
    }

    #[test]
    fn user_agent_and_timeout_reach_the_transport() {
        let (mut api, seen) = client(
            Client::builder()
                .user_agent("tests/1.0")
                .timeout(Duration::from_secs(3)),
        );
        api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        let sent = last(&seen);
        assert_eq!(sent.user_agent, "tests/1.0");
        assert_eq!(sent.timeout, Duration::from_secs(3));
    }

    #[test]
    fn basic_auth_adds_authorization() {
        let (mut api, seen) = client(Client::builder().basic_auth("user", "pass"));
        api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        assert!(last(&seen)
            .headers
            .contains(&("Authorization".to_string(), "Basic dXNlcjpwYXNz".to_string())));

        api.get("http://api.test/", Params::new(), Headers::from([("authorization", "Bearer t")]))
            .unwrap();
        let headers = last(&seen).headers;
        assert_eq!(headers, vec![("authorization".to_string(), "Bearer t".to_string())]);
    }

    #[test]
    fn indexed_queries_apply_to_base_and_defaults() {
        let (mut api, seen) = client(
            Client::builder()
                .base_url("http://api.test/?ids[]=1&ids[]=2")
                .param("bat", ["foo", "bar"])
                .build_indexed_queries(true),
        );
        assert!(api.base_url().query.is_indexed());
        assert!(api.params().is_indexed());

        api.get("", Params::new(), Headers::new()).unwrap();
        assert_eq!(
            last(&seen).url,
            "http://api.test/?ids%5B0%5D=1&ids%5B1%5D=2&bat%5B0%5D=foo&bat%5B1%5D=bar"
        );
        api.post("", Params::new(), Headers::new()).unwrap();
        assert_eq!(last(&seen).body.as_deref(), Some("bat%5B0%5D=foo&bat%5B1%5D=bar"));
    }

    #[test]
    fn responses_are_parsed_and_decoded() {
        let (mut api, _) = client(Client::builder());
        let response = api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        assert_eq!(response.status_lines(), ["HTTP/1.1 200 OK"]);
        assert_eq!(response.format(), "json");
        assert_eq!(response["foo"], json!("bar"));
        assert_eq!(response.request().method(), HttpMethod::Get);
    }

    #[test]
    fn unknown_format_is_recorded_on_the_response() {
        let (transport, _) = replying("HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\n\r\n<a/>");
        let mut api = Client::builder().transport(transport).build().unwrap();
        let response = api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        assert_eq!(response.data(), Err(DecodeError::UnknownFormat("xml".to_string())));
        assert_eq!(response.body(), "<a/>");
    }

    #[test]
    fn fixed_format_overrides_content_type() {
        let (transport, _) = replying("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n{\"a\":1}");
        let mut api = Client::builder().format("json").transport(transport).build().unwrap();
        let response = api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        assert_eq!(response["a"], json!(1));
        assert_eq!(response.format(), "json");
        assert_eq!(response.content_type(), "text/plain");
    }

    #[test]
    fn empty_json_answer_decodes_to_null() {
        let (transport, _) = replying("HTTP/1.1 204 No Content\r\nContent-Type: application/json\r\n\r\n");
        let mut api = Client::builder().transport(transport).build().unwrap();
        let response = api.delete("http://api.test/items/1", Params::new(), Headers::new()).unwrap();
        assert_eq!(response.status_lines(), ["HTTP/1.1 204 No Content"]);
        assert_eq!(response.data(), Ok(&Value::Null));
    }

    #[test]
    fn registered_decoders_are_used() {
        let (transport, _) = replying("HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\n\r\na,b");
        let mut api = Client::builder().transport(transport).build().unwrap();
        api.register_decoder("csv", |body| Ok(body.split(',').collect::<Vec<_>>().into()));
        let response = api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        assert_eq!(response.data().unwrap(), &json!(["a", "b"]));
        assert!(api.decoder("csv").is_ok());
        assert!(matches!(api.decoder("yaml"), Err(DecodeError::UnknownFormat(_))));
    }

    #[test]
    fn config_decoder_aliases() {
        let (transport, _) = replying("HTTP/1.1 200 OK\r\nContent-Type: application/vnd.api+json\r\n\r\n{\"a\":1}");
        let config = ClientConfig::from_json(r#"{"decoders": {"vnd": "json"}}"#).unwrap();
        let mut api = Client::builder().config(config).transport(transport).build().unwrap();
        let response = api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        assert_eq!(response["a"], json!(1));

        let config = ClientConfig::from_json(r#"{"decoders": {"vnd": "yaml"}}"#).unwrap();
        let (transport, _) = replying(JSON_OK);
        let err = Client::builder().config(config).transport(transport).build().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn transport_failures_are_recorded_and_reset_runs() {
        struct Refusing {
            resets: Arc<AtomicUsize>,
        }
        impl Transport for Refusing {
            fn execute(&mut self, request: &HttpRequest) -> HttpResponse {
                HttpResponse::failed("connection refused", request.url.clone(), Duration::ZERO)
            }
            fn reset(&mut self) {
                self.resets.fetch_add(1, Ordering::SeqCst);
            }
        }

        let resets = Arc::new(AtomicUsize::new(0));
        let mut api = Client::builder()
            .transport(Refusing {
                resets: Arc::clone(&resets),
            })
            .build()
            .unwrap();
        let response = api.get("http://api.test/", Params::new(), Headers::new()).unwrap();
        api.get("http://api.test/", Params::new(), Headers::new()).unwrap();

        assert_eq!(resets.load(Ordering::SeqCst), 2);
        assert_eq!(response.error(), "connection refused");
        assert_eq!(response.status_code(), 0);
        assert!(matches!(response.error_for_status(), Err(ApiError::Transport(_))));
    }

    #[test]
    fn injected_logger_sees_request_lines() {
        struct Capture(Mutex<Vec<String>>);
        impl Log for Capture {
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }
            fn log(&self, record: &Record<'_>) {
                self.0.lock().unwrap().push(format!("{} {}", record.level(), record.args()));
            }
            fn flush(&self) {}
        }

        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        let (mut api, _) = client(Client::builder().logger(capture.clone()));
        api.get("http://api.test/x", Params::new(), Headers::new()).unwrap();
        let lines = capture.0.lock().unwrap();
        assert!(lines.contains(&"DEBUG GET http://api.test/x".to_string()));
        assert!(lines.contains(&"DEBUG using decoder for format `json`".to_string()));
    }

    #[test]
    #[allow(deprecated)]
    fn legacy_option_setter() {
        let (mut api, seen) = client(Client::builder().param("key", "abc"));
        api.set_option("base_url", json!("http://other.test")).unwrap();
        assert_eq!(api.base_url().host.as_deref(), Some("other.test"));
        assert_eq!(api.parameters(), api.params());

        let err = api.set_option("curl_options", json!({})).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        let err = api.set_option("base_url", json!("http://x:0")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
        assert_eq!(api.config().base_url, "http://other.test");

        api.get("/ping", Params::new(), Headers::new()).unwrap();
        assert_eq!(last(&seen).url, "http://other.test/ping?key=abc");
    }
}
