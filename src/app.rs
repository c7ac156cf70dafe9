use axum::{
    extract::{Request, State},
    http::{header::ALLOW, StatusCode},
    middleware,
    response::Response,
    Router,
};
use tower::ServiceExt;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::AppConfig;
use crate::errors::PulseError;
use crate::respond;
use crate::state::AppState;

/// Build the complete Axum application.
///
/// Every request is handed to the controller namespace of the API version
/// negotiated from its Accept value (`/ping` and friends live there).
pub fn build_app(cfg: AppConfig) -> Router {
    let state = AppState::new(cfg);

    tracing::info!(
        "Registered API versions: {:?} (default v{})",
        state.namespaces.versions(),
        state.config.default_api_version
    );

    Router::new()
        .fallback(dispatch)
        // Headers, runtime and JSONP
        .layer(middleware::from_fn_with_state(state.clone(), respond::finish))
        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Route a request into the namespace for its API version.
async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    let version = state.negotiate(req.uri(), req.headers());
    tracing::debug!(%version, source = ?version.source, "Negotiated API version");

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let mut response = match state.namespaces.get(version.number) {
        Some(router) => match router.oneshot(req).await {
            Ok(response) if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
                method_not_allowed(response, method, path, state.config.debug)
            }
            Ok(response) => response,
            Err(never) => match never {},
        },
        None => {
            tracing::warn!("No controllers for API version {}", version.number);
            PulseError::UnsupportedVersion(version.number).to_response(state.config.debug)
        }
    };

    response.extensions_mut().insert(version);
    response
}

/// Replace the router's bare 405 with a JSON error, keeping `Allow`.
fn method_not_allowed(routed: Response, method: String, path: String, debug: bool) -> Response {
    let mut response = PulseError::MethodNotAllowed { method, path }.to_response(debug);

    if let Some(allow) = routed.headers().get(ALLOW) {
        response.headers_mut().insert(ALLOW, allow.clone());
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use rstest::rstest;

    fn test_config() -> AppConfig {
        AppConfig::from_json(
            r#"{
                "name": "Pulse Test",
                "port": 0,
                "log_level": "info",
                "server_version": "1.0",
                "vendor": "vnd.pulse"
            }"#,
        )
        .unwrap()
    }

    fn debug_config() -> AppConfig {
        AppConfig {
            debug: true,
            ..test_config()
        }
    }

    async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        send_with(test_config(), request).await
    }

    async fn send_with(
        cfg: AppConfig,
        request: Request<Body>,
    ) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = build_app(cfg).oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();

        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn ping_returns_server_version() {
        let (status, headers, body) = send(get("/ping")).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["version"], "1.0");

        assert_eq!(headers[header::CONTENT_TYPE], respond::JSON_CONTENT_TYPE);
        assert_eq!(headers["x-powered-by"], "Pulse Test/1.0");
        assert_eq!(headers["x-api-version"], "1");
        assert!(headers.contains_key("x-runtime"));
    }

    #[rstest]
    #[case("application/vnd.pulse.v1+json")]
    #[case("text/html, application/json")]
    #[case("application/vnd.pulse+json")]
    #[tokio::test]
    async fn ping_is_served_by_v1(#[case] accept: &str) {
        let request = Request::builder()
            .uri("/ping")
            .header(header::ACCEPT, accept)
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-api-version"], "1");
    }

    #[tokio::test]
    async fn unknown_version_is_rejected() {
        let request = Request::builder()
            .uri("/ping")
            .header(header::ACCEPT, "application/vnd.pulse.v9+json")
            .body(Body::empty())
            .unwrap();

        let (status, headers, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers["x-api-version"], "9");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["type"], "UnsupportedVersion");
        assert_eq!(json["code"], 400);
        assert_eq!(json["trace"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn query_override_selects_version() {
        let request = Request::builder()
            .uri("/ping?_accept=application/vnd.pulse.v2%2Bjson")
            .header(header::ACCEPT, "application/vnd.pulse.v1+json")
            .body(Body::empty())
            .unwrap();

        let (status, _, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = send(get("/ping?_accept=application/vnd.pulse.v1%2Bjson")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, headers, body) = send(get("/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[header::CONTENT_TYPE], respond::JSON_CONTENT_TYPE);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["type"], "RouteNotFound");
        assert_eq!(json["message"], "Route not found: /nope");
    }

    #[tokio::test]
    async fn jsonp_wraps_body_with_meta() {
        let (status, _, body) = send(get("/ping?callback=cb")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(r#"cb({"meta":"#));
        assert!(body.ends_with(r#","data":{"version":"1.0"}})"#));

        let inner = &body["cb(".len()..body.len() - 1];
        let json: serde_json::Value = serde_json::from_str(inner).unwrap();
        assert_eq!(json["meta"]["status"], 200);
        assert_eq!(json["meta"]["x-powered-by"], "Pulse Test/1.0");
        assert_eq!(json["data"]["version"], "1.0");
    }

    #[tokio::test]
    async fn wrong_method_gets_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/ping")
            .body(Body::empty())
            .unwrap();

        let (status, headers, body) = send(request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[header::CONTENT_TYPE], respond::JSON_CONTENT_TYPE);
        assert!(headers.contains_key(header::ALLOW));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["type"], "MethodNotAllowed");
        assert_eq!(json["code"], 405);
        assert_eq!(json["message"], "Method POST not allowed on /ping");
    }

    #[tokio::test]
    async fn debug_errors_carry_trace() {
        let request = Request::builder()
            .uri("/ping")
            .header(header::ACCEPT, "application/vnd.pulse.v9+json")
            .body(Body::empty())
            .unwrap();

        let (status, _, body) = send_with(debug_config(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json["trace"],
            serde_json::json!([" 1. No controllers registered for API version 9"])
        );

        let (status, _, body) = send_with(debug_config(), get("/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["trace"], serde_json::json!([" 1. Route not found: /nope"]));
    }

    #[tokio::test]
    async fn non_debug_not_found_has_empty_trace() {
        let (_, _, body) = send(get("/nope")).await;

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["trace"], serde_json::json!([]));
    }
}
