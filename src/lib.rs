//! Pulse – versioned JSON REST server.
//!
//! Requests pick an API version with a vendor media type in `Accept`
//! (`application/vnd.pulse.v1+json`) and are routed to the controller
//! namespace for that version.

pub mod app;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod respond;
pub mod services;
pub mod state;
pub mod version;
