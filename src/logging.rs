use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

use crate::errors::PulseError;

/// Map a config `log_level` to a filter. Unknown names fall back to INFO.
pub fn level_filter(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => LevelFilter::INFO,
    }
}

/// Install the global stdout subscriber.
pub fn init(log_level: &str) -> Result<(), PulseError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level_filter(log_level))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
