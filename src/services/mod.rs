//! Versioned controller namespaces.
//!
//! Each API version lives in its own module exposing a `routes` function.
//! A request is served by the namespace its negotiated version points at.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{http::Uri, response::Response, Router};

use crate::config::AppConfig;
use crate::errors::PulseError;

pub mod v1;

/// API version number → router for that version.
#[derive(Clone)]
pub struct Namespaces {
    routers: Arc<HashMap<u32, Router>>,
}

impl Namespaces {
    pub fn get(&self, version: u32) -> Option<Router> {
        self.routers.get(&version).cloned()
    }

    pub fn versions(&self) -> Vec<u32> {
        let mut versions: Vec<u32> = self.routers.keys().copied().collect();
        versions.sort_unstable();
        versions
    }
}

/// Build the registry of all known API versions.
pub fn namespaces(config: Arc<AppConfig>) -> Namespaces {
    let debug = config.debug;
    let mut routers = HashMap::new();

    routers.insert(
        v1::VERSION,
        v1::routes(config).fallback(move |uri: Uri| route_not_found(uri, debug)),
    );

    Namespaces {
        routers: Arc::new(routers),
    }
}

async fn route_not_found(uri: Uri, debug: bool) -> Response {
    PulseError::RouteNotFound(uri.path().to_string()).to_response(debug)
}
