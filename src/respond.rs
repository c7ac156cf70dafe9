//! Finishing touches applied to every response.
//!
//! - `Content-Type: application/json; charset=utf-8`
//! - `X-Powered-By: <name>/<server_version>`
//! - `X-Runtime: <seconds>`
//! - `X-Api-Version: <n>` once a version has been negotiated
//! - JSONP wrapping when a `callback` query parameter is given:
//!   `cb({"meta":{...},"data":<body>})`

use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        response::Parts,
        HeaderName, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::http::jsonp_callback;
use crate::state::AppState;
use crate::version::ApiVersion;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");
const X_RUNTIME: HeaderName = HeaderName::from_static("x-runtime");
const X_API_VERSION: HeaderName = HeaderName::from_static("x-api-version");

pub async fn finish(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let callback = jsonp_callback(req.uri());

    let mut response = next.run(req).await;

    let runtime = started.elapsed().as_secs_f64();
    let version = response.extensions().get::<ApiVersion>().copied();
    let powered_by = format!("{}/{}", state.config.name, state.config.server_version);

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    if let Ok(value) = HeaderValue::from_str(&powered_by) {
        headers.insert(X_POWERED_BY, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{runtime:.6}")) {
        headers.insert(X_RUNTIME, value);
    }
    if let Some(version) = version {
        headers.insert(X_API_VERSION, HeaderValue::from(version.number));
    }

    match callback {
        Some(callback) => wrap_jsonp(response, &callback).await,
        None => response,
    }
}

async fn wrap_jsonp(response: Response, callback: &str) -> Response {
    let (mut parts, body) = response.into_parts();

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to buffer response body for JSONP: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let body = String::from_utf8_lossy(&bytes);
    let data = if body.trim().is_empty() { "null" } else { body.as_ref() };
    let meta = Value::Object(meta(&parts));

    parts.headers.remove(CONTENT_LENGTH);

    let wrapped = format!(r#"{callback}({{"meta":{meta},"data":{data}}})"#);
    Response::from_parts(parts, Body::from(wrapped))
}

/// `X-*` headers plus the status code.
fn meta(parts: &Parts) -> Map<String, Value> {
    let mut meta = Map::new();

    for (name, value) in parts.headers.iter() {
        if name.as_str().starts_with("x-") {
            if let Ok(value) = value.to_str() {
                meta.insert(name.as_str().to_string(), Value::from(value));
            }
        }
    }
    meta.insert("status".to_string(), Value::from(parts.status.as_u16()));

    meta
}
