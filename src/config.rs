//! Driver configuration using Figment.
//!
//! Configuration is loaded from:
//! 1. `config/ad5706r.toml` (or an explicit path)
//! 2. Environment variables prefixed with `AD5706R_`
//!
//! # Example
//!
//! ```toml
//! uri = "ip:192.168.2.1"
//! device_name = "ad5706r"
//! log_level = "debug"
//! ```
//!
//! ```no_run
//! use daq_driver_ad5706r::config::DriverConfig;
//!
//! let config = DriverConfig::load()?;
//! config.validate()?;
//! println!("Connecting to {}", config.uri);
//! # Ok::<(), daq_driver_ad5706r::Ad5706rError>(())
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::device::resolve_device_name;
use crate::error::{Ad5706rError, Result};

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "config/ad5706r.toml";

/// Prefix for environment overrides (e.g. `AD5706R_URI`).
pub const ENV_PREFIX: &str = "AD5706R_";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// AD5706R driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// libiio context URI ("local:", "ip:<host>", "serial:<port>,<baud>", "mock:")
    #[serde(default = "default_uri")]
    pub uri: String,
    /// IIO device name; empty selects the default part
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_uri() -> String {
    "local:".to_string()
}

fn default_device_name() -> String {
    "ad5706r".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            device_name: default_device_name(),
            log_level: default_log_level(),
        }
    }
}

impl DriverConfig {
    /// Load from [`DEFAULT_CONFIG_PATH`] and the environment.
    ///
    /// A missing file is not an error; defaults and environment apply.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific file path and the environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::figment(path).extract()?)
    }

    fn figment<P: AsRef<Path>>(path: P) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Check values that parse but make no sense.
    pub fn validate(&self) -> Result<()> {
        resolve_device_name(&self.device_name)?;

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Ad5706rError::InvalidConfig {
                message: format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.log_level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }

    /// Whether the URI selects the built-in simulator.
    pub fn is_mock(&self) -> bool {
        self.uri.starts_with("mock:")
    }
}
