//! Server Configuration
//!
//! Settings come from `firewatch.toml` when present, overridden by
//! `FIREWATCH_*` environment variables. Everything has a default so the
//! server starts with no configuration at all (empty roster included).

use alert_model::Device;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::rate_limit::RateLimitConfig;

/// Configuration error types
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Could not read or deserialize configuration
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listen address
    pub bind_addr: String,
    /// Rate limit applied to the alert intake endpoint
    pub rate_limit: RateLimitConfig,
    /// Device roster served to dashboards
    pub devices: Vec<Device>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            rate_limit: RateLimitConfig::default(),
            devices: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from file and environment
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("firewatch").required(false))
            .add_source(Environment::with_prefix("FIREWATCH").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}
