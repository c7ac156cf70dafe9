//! HTTP helpers shared by the dispatcher and the response middleware.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{header::ACCEPT, HeaderMap, Uri},
};

pub mod accept;

/// Query parameter that overrides the `Accept` header.
pub const ACCEPT_OVERRIDE_PARAM: &str = "_accept";

/// Query parameter naming a JSONP callback.
pub const CALLBACK_PARAM: &str = "callback";

fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.get(name).cloned()
}

/// The Accept value to negotiate with.
///
/// A non-empty `_accept` query parameter wins over the header; a missing
/// header is treated as an empty value.
pub fn requested_accept(uri: &Uri, headers: &HeaderMap) -> String {
    if let Some(value) = query_param(uri, ACCEPT_OVERRIDE_PARAM).filter(|v| !v.is_empty()) {
        return value;
    }

    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// JSONP callback name, reduced to `[A-Za-z0-9._-]` without leading dots.
pub fn jsonp_callback(uri: &Uri) -> Option<String> {
    let raw = query_param(uri, CALLBACK_PARAM)?;

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
