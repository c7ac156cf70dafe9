use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::config::AppConfig;

pub fn routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .with_state(config)
}

/// GET /ping
async fn ping(State(config): State<Arc<AppConfig>>) -> Json<serde_json::Value> {
    tracing::debug!("ping");

    Json(json!({
        "version": config.server_version
    }))
}
