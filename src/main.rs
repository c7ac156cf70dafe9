/*****************************************************************************************
 *
 *  Pulse – Versioned JSON REST Server in Rust
 *  ------------------------------------------
 *
 *  API version negotiated from the Accept header (application/vnd.pulse.vN+json)
 *
 *****************************************************************************************/

use std::process::ExitCode;

use axum::serve;
use tokio::net::TcpListener;

use pulse_server::app;
use pulse_server::config::AppConfig;
use pulse_server::errors::{ErrorBody, PulseError};
use pulse_server::logging;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {e}");

            // The subscriber may not be installed yet, so report on stderr too.
            let body = ErrorBody::new(&e, true);
            eprintln!(
                "{}",
                serde_json::to_string(&body).unwrap_or_else(|_| e.to_string())
            );

            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), PulseError> {
    //
    // ────────────────────────────────────────────────────────
    //  Locate and load config.json
    // ────────────────────────────────────────────────────────
    //
    let config_path = AppConfig::locate()?;
    let cfg = AppConfig::load_from_file(&config_path)?;

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    logging::init(&cfg.log_level)?;

    tracing::info!("Loaded config.json from {}", config_path.display());
    tracing::info!("Starting {} {}…", cfg.name, cfg.server_version);
    tracing::debug!("Loaded configuration: {:?}", cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Build Axum app (versioned namespaces)
    // ────────────────────────────────────────────────────────
    //
    let port = cfg.port;
    let app = app::build_app(cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Bind server and start listening
    // ────────────────────────────────────────────────────────
    //
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    serve(listener, app).with_graceful_shutdown(shutdown()).await?;

    tracing::info!("Goodbye.");
    Ok(())
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
// ─────────────────────────────────────────────────────────────
//
async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }

    tracing::warn!("CTRL+C received — shutting down…");
}
