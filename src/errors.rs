use std::error::Error as _;
use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("config.json not found in: {}", display_paths(.0))]
    ConfigNotFound(Vec<PathBuf>),

    #[error("Failed to read configuration file")]
    ConfigRead(#[source] std::io::Error),

    #[error("Configuration file could not be parsed")]
    ConfigParse(#[source] serde_json::Error),

    #[error("Invalid media type pattern")]
    InvalidPattern(#[source] regex::Error),

    #[error("No controllers registered for API version {0}")]
    UnsupportedVersion(u32),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("Failed to install the log subscriber")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PulseError {
    pub fn status(&self) -> StatusCode {
        match self {
            PulseError::UnsupportedVersion(_) | PulseError::InvalidPattern(_) => {
                StatusCode::BAD_REQUEST
            }
            PulseError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            PulseError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name, reported as `type` in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PulseError::ConfigNotFound(_) => "ConfigNotFound",
            PulseError::ConfigRead(_) => "ConfigRead",
            PulseError::ConfigParse(_) => "ConfigParse",
            PulseError::InvalidPattern(_) => "InvalidPattern",
            PulseError::UnsupportedVersion(_) => "UnsupportedVersion",
            PulseError::RouteNotFound(_) => "RouteNotFound",
            PulseError::MethodNotAllowed { .. } => "MethodNotAllowed",
            PulseError::Logging(_) => "Logging",
            PulseError::Io(_) => "Io",
        }
    }

    /// Render as a JSON response. With `debug` the body carries the error
    /// followed by its chain of underlying causes.
    pub fn to_response(&self, debug: bool) -> Response {
        let body = ErrorBody::new(self, debug);
        (self.status(), Json(body)).into_response()
    }
}

impl IntoResponse for PulseError {
    fn into_response(self) -> Response {
        self.to_response(false)
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub trace: Vec<String>,
}

impl ErrorBody {
    pub fn new(err: &PulseError, debug: bool) -> Self {
        let mut trace = Vec::new();

        if debug {
            trace.push(format!("{:2}. {}", 1, err));
            let mut source = err.source();
            while let Some(cause) = source {
                trace.push(format!("{:2}. {}", trace.len() + 1, cause));
                source = cause.source();
            }
        }

        Self {
            message: err.to_string(),
            code: err.status().as_u16(),
            kind: err.kind(),
            trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            PulseError::UnsupportedVersion(7).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PulseError::RouteNotFound("/nope".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PulseError::MethodNotAllowed {
                method: "POST".into(),
                path: "/ping".into(),
            }
            .status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            PulseError::ConfigNotFound(vec![]).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn trace_only_in_debug() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = PulseError::ConfigRead(io);

        let quiet = ErrorBody::new(&err, false);
        assert!(quiet.trace.is_empty());
        assert_eq!(quiet.kind, "ConfigRead");
        assert_eq!(quiet.code, 500);

        let loud = ErrorBody::new(&err, true);
        assert_eq!(
            loud.trace,
            vec![
                " 1. Failed to read configuration file".to_string(),
                " 2. missing file".to_string(),
            ]
        );
    }

    #[test]
    fn not_found_lists_searched_paths() {
        let err = PulseError::ConfigNotFound(vec![
            PathBuf::from("/a/config.json"),
            PathBuf::from("/b/config.json"),
        ]);

        assert_eq!(
            err.to_string(),
            "config.json not found in: /a/config.json, /b/config.json"
        );
    }
}
