//! Service Settings
//!
//! Settings come from an optional TOML file (`CAR_PRICE_CONFIG`, default
//! `config/car-price.toml`) overridden by `CAR_PRICE_*` environment
//! variables, with `__` separating nested keys, e.g.
//! `CAR_PRICE_SERVER__BIND_ADDR=127.0.0.1:9000`.

use artifact_store::ArtifactPaths;
use config::{Config, ConfigError, Environment, File, FileFormat};
use data_validator::ValidationConfig;
use feature_transformer::ColumnLayout;
use serde::{Deserialize, Serialize};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CAR_PRICE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/car-price";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            metrics: true,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, overridden by `RUST_LOG` when set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub artifacts: ArtifactPaths,
    pub layout: ColumnLayout,
    pub validation: ValidationConfig,
}

impl Settings {
    /// Load from the configuration file and environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("CAR_PRICE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse settings from a TOML document
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
