use std::collections::BTreeMap;

use axum::{
    extract::Path,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Redirect,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Where `/redirect` sends clients.
pub const REDIRECT_TARGET: &str = "/landing";

/// Everything the server saw of a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    /// Raw query string, exactly as sent.
    pub query: String,
    pub body: String,
    /// Lowercased header names; repeated headers joined with `, `.
    pub headers: BTreeMap<String, String>,
}

impl Echo {
    pub fn describe(method: &Method, uri: &Uri, headers: &HeaderMap, body: String) -> Self {
        let mut seen = BTreeMap::<String, String>::new();
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes());
            seen.entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.into_owned());
        }
        Self {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().unwrap_or_default().to_string(),
            body,
            headers: seen,
        }
    }
}

/// Echo server. Any path echoes the request as JSON, except:
/// - `/status/{code}` echoes with that status code,
/// - `/redirect` answers `303 See Other` to `REDIRECT_TARGET`,
/// - `/text` answers `text/plain`.
pub fn app() -> Router {
    Router::new()
        .route("/status/{code}", any(status))
        .route("/redirect", any(redirect))
        .route("/text", get(text))
        .fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    log::debug!("{method} {uri}");
    Json(Echo::describe(&method, &uri, &headers, body))
}

async fn status(
    Path(code): Path<u16>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Echo>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(Echo::describe(&method, &uri, &headers, body))))
}

async fn redirect() -> Redirect {
    Redirect::to(REDIRECT_TARGET)
}

async fn text() -> &'static str {
    "hello"
}
