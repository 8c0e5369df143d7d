//! Configuration management for conformance checking
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (conformance.toml)
//! - Environment variables (CONFORMANCE__*)
//!
//! ## Example config file (conformance.toml):
//! ```toml
//! [validation]
//! convert_resources_to_relationships = false
//! permit_resources_for_relationships = true
//! max_depth = 64
//!
//! [render]
//! max_depth = 16
//! max_length = 512
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::render::RenderOptions;
use crate::validator::ValidationOptions;

/// Main configuration for conformance checking
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConformanceConfig {
    /// Validation options applied to every call
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Bounds for rendering values in violation messages
    #[serde(default)]
    pub render: RenderOptions,
}

impl ConformanceConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "conformance.toml",
            ".conformance.toml",
            "config/conformance.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "conformance") {
            let xdg_config = config_dir.config_dir().join("conformance.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CONFORMANCE__VALIDATION__MAX_DEPTH=32
        builder = builder.add_source(
            Environment::with_prefix("CONFORMANCE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
