//! Service configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// HTTP port for the prediction API
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding one model artifact per aid type
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

fn default_api_port() -> u16 {
    8000
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

impl ServiceConfig {
    /// Load configuration from RELIEF_-prefixed environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("RELIEF"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ServiceConfig {
            api_port: default_api_port(),
            model_dir: default_model_dir(),
        }))
    }
}
