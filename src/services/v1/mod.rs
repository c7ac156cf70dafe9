//! Version 1 of the API.

use std::sync::Arc;

use axum::Router;

use crate::config::AppConfig;

pub mod ping;

pub const VERSION: u32 = 1;

/// Every v1 route.
pub fn routes(config: Arc<AppConfig>) -> Router {
    Router::new().merge(ping::routes(config))
}
