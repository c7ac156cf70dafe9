use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::PulseError;

/// Environment variable that overrides the config.json lookup.
pub const CONFIG_ENV: &str = "PULSE_CONFIG";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Application name, reported in `X-Powered-By`.
    #[serde(default = "default_name")]
    pub name: String,

    /// HTTP port to listen on.
    pub port: u16,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,

    /// Version string returned by `/ping`.
    pub server_version: String,

    /// Vendor tree used in `Accept`, e.g. `vnd.pulse` for
    /// `application/vnd.pulse.v2+json`.
    #[serde(default = "default_vendor")]
    pub vendor: String,

    /// API version used when the request does not ask for one.
    #[serde(default = "default_api_version")]
    pub default_api_version: u32,

    /// Include error causes in error responses.
    #[serde(default)]
    pub debug: bool,
}

fn default_name() -> String {
    "Pulse Rest Server".to_string()
}

fn default_vendor() -> String {
    "vnd.pulse".to_string()
}

fn default_api_version() -> u32 {
    1
}

impl AppConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, PulseError> {
        let file = fs::read_to_string(path.as_ref()).map_err(PulseError::ConfigRead)?;

        Self::from_json(&file)
    }

    pub fn from_json(json: &str) -> Result<Self, PulseError> {
        serde_json::from_str::<AppConfig>(json).map_err(PulseError::ConfigParse)
    }

    /// Find config.json.
    ///
    /// `PULSE_CONFIG` wins when set. Otherwise the file is looked up next to
    /// the executable, then one directory above it.
    pub fn locate() -> Result<PathBuf, PulseError> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let exe_path = env::current_exe()?;
        let exe_dir = exe_path.parent().unwrap_or_else(|| Path::new("."));

        let candidates = vec![
            exe_dir.join("config.json"),
            exe_dir.join("..").join("config.json"),
        ];

        match candidates.iter().position(|p| p.exists()) {
            Some(i) => Ok(candidates[i].clone()),
            None => Err(PulseError::ConfigNotFound(candidates)),
        }
    }
}
