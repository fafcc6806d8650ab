//! Layered service configuration.
//!
//! Values come from built-in defaults, then an optional config file, then
//! `DEVWATCH_`-prefixed environment variables (e.g. `DEVWATCH_LISTEN_ADDR`).
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, File};
use devwatch_store::GatewayConfig;
use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Address the HTTP gateway listens on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// CSV roster of known device ids
    #[serde(default = "default_devices_csv")]
    pub devices_csv: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest accepted upload duration (e.g., "1h")
    #[serde(default = "default_max_upload_time")]
    pub max_upload_time: String,

    /// How far ahead of the server clock a heartbeat may be (e.g., "1m")
    #[serde(default = "default_clock_skew")]
    pub clock_skew: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:6733".to_string()
}

fn default_devices_csv() -> PathBuf {
    PathBuf::from("devices.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_time() -> String {
    "1h".to_string()
}

fn default_clock_skew() -> String {
    "1m".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            devices_csv: default_devices_csv(),
            log_level: default_log_level(),
            max_upload_time: default_max_upload_time(),
            clock_skew: default_clock_skew(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(Environment::with_prefix("DEVWATCH"))
            .build()?
            .try_deserialize()
    }

    /// Gateway configuration with duration strings parsed.
    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        let max_upload_time = parse_duration(&self.max_upload_time)
            .with_context(|| format!("invalid max_upload_time {:?}", self.max_upload_time))?;
        let clock_skew = parse_duration(&self.clock_skew)
            .with_context(|| format!("invalid clock_skew {:?}", self.clock_skew))?;

        Ok(GatewayConfig::builder()
            .listen_addr(self.listen_addr.clone())
            .max_upload_time(max_upload_time)
            .clock_skew(clock_skew)
            .build())
    }
}
