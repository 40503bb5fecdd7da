//! Check params encoding, URL parsing and response parsing against the JSON
//! vectors in `test-vectors/`.
//!
//! Vectors are deserialized into typed cases rather than `serde_json::Value`
//! so that object key order (which is significant for query strings)
//! survives.

use indexmap::IndexMap;
use restclient_core::parser::parse_response;
use restclient_core::{ApiError, HeaderValue, Headers, ParamValue, Params, Resource};
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ParamsVectors {
    encode: Vec<EncodeCase>,
    parse: Vec<ParseCase>,
}

#[derive(Deserialize)]
struct EncodeCase {
    name: String,
    params: IndexMap<String, ParamValue>,
    indexed: bool,
    expected: String,
}

#[derive(Deserialize)]
struct ParseCase {
    name: String,
    query: String,
    expected: Value,
}

fn params_vectors() -> ParamsVectors {
    serde_json::from_str(include_str!("../../test-vectors/params.json")).unwrap()
}

#[test]
fn params_encode_vectors() {
    for case in params_vectors().encode {
        let params: Params = case.params.into_iter().collect();
        let params = params.indexed(case.indexed);
        assert_eq!(params.to_string(), case.expected, "{}", case.name);
    }
}

#[test]
fn params_parse_vectors() {
    for case in params_vectors().parse {
        let params = Params::parse(&case.query);
        assert_eq!(serde_json::to_value(&params).unwrap(), case.expected, "{}", case.name);
    }
}

#[test]
fn indexed_encoding_round_trips() {
    for case in params_vectors().encode {
        let flat = case
            .params
            .values()
            .all(|v| v.as_list().map_or(true, |list| list.values().all(|item| item.as_list().is_none())));
        if !flat {
            continue;
        }
        let params: Params = case.params.into_iter().collect();
        let encoded = params.indexed(true).to_string();
        let reparsed = Params::parse(&encoded).indexed(true);
        // numbers come back as strings, so compare wire forms
        assert_eq!(reparsed.to_string(), encoded, "{}", case.name);
    }
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ResourceVectors {
    cases: Vec<ResourceCase>,
    invalid: Vec<String>,
}

#[derive(Deserialize)]
struct ResourceCase {
    name: String,
    url: String,
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: String,
    query: String,
    display: String,
}

fn resource_vectors() -> ResourceVectors {
    serde_json::from_str(include_str!("../../test-vectors/resources.json")).unwrap()
}

#[test]
fn resource_vectors_parse() {
    for case in resource_vectors().cases {
        let name = &case.name;
        let resource = Resource::parse(&case.url).unwrap();
        assert_eq!(resource.scheme, case.scheme, "{name}: scheme");
        assert_eq!(resource.host, case.host, "{name}: host");
        assert_eq!(resource.port, case.port, "{name}: port");
        assert_eq!(resource.path.to_string(), case.path, "{name}: path");
        assert_eq!(resource.query.to_string(), case.query, "{name}: query");
        assert_eq!(resource.to_string(), case.display, "{name}: display");
    }
}

#[test]
fn absolute_urls_reparse_to_same_fields() {
    for case in resource_vectors().cases {
        let resource = Resource::parse(&case.url).unwrap();
        if resource.scheme.is_none() {
            // partial URLs print without the markers that parsing relies on
            continue;
        }
        let reparsed = Resource::parse(&resource.to_string()).unwrap();
        assert_eq!(reparsed.scheme, resource.scheme, "{}", case.name);
        assert_eq!(reparsed.host, resource.host, "{}", case.name);
        assert_eq!(reparsed.port, resource.port, "{}", case.name);
        assert_eq!(reparsed.query, resource.query, "{}", case.name);
    }
}

#[test]
fn resource_invalid_vectors() {
    for url in resource_vectors().invalid {
        let err = Resource::parse(&url).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)), "{url}: {err}");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ResponseVectors {
    cases: Vec<ResponseCase>,
}

#[derive(Deserialize)]
struct ResponseCase {
    name: String,
    raw: String,
    status_lines: Vec<String>,
    headers: IndexMap<String, Value>,
    body: String,
    format: String,
}

fn headers_as_json(headers: &Headers) -> IndexMap<String, Value> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = match value {
                HeaderValue::Single(v) => Value::from(v.as_str()),
                HeaderValue::List(vs) => Value::from(vs.clone()),
            };
            (name.clone(), value)
        })
        .collect()
}

#[test]
fn response_vectors() {
    let vectors: ResponseVectors =
        serde_json::from_str(include_str!("../../test-vectors/responses.json")).unwrap();

    for case in vectors.cases {
        let name = &case.name;
        let parsed = parse_response(&case.raw);
        assert_eq!(parsed.status_lines, case.status_lines, "{name}: status lines");
        assert_eq!(headers_as_json(&parsed.headers), case.headers, "{name}: headers");
        assert_eq!(parsed.body, case.body, "{name}: body");
        assert_eq!(
            restclient_core::decode::resolve_format(parsed.content_type()),
            case.format,
            "{name}: format"
        );
    }
}
