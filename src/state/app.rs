use std::sync::Arc;

use axum::http::{HeaderMap, Uri};

use crate::config::AppConfig;
use crate::http::requested_accept;
use crate::services::{self, Namespaces};
use crate::version::{ApiVersion, VersionNegotiator};

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub negotiator: Arc<VersionNegotiator>,
    pub namespaces: Namespaces,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let negotiator = VersionNegotiator::new(&config.vendor, config.default_api_version);

        Self {
            namespaces: services::namespaces(config.clone()),
            negotiator: Arc::new(negotiator),
            config,
        }
    }

    /// API version requested by the `_accept` parameter or `Accept` header.
    pub fn negotiate(&self, uri: &Uri, headers: &HeaderMap) -> ApiVersion {
        self.negotiator
            .negotiate_header(&requested_accept(uri, headers))
    }
}
