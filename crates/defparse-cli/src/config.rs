//! Optional TOML configuration for the CLI
//!
//! ```toml
//! [envelope]
//! pipeline = "FME"
//! instance_name = "FME-App"
//! instance_guid = "2f6c..."
//! ```

use std::path::Path;

use defparse_core::EnvelopeSettings;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub envelope: EnvelopeSettings,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| CliError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load the file if given, then apply command-line overrides.
    pub fn resolve(path: Option<&Path>, instance_guid: Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(guid) = instance_guid {
            config.envelope.instance_guid = Some(guid);
        }
        tracing::debug!(?config, "Resolved configuration");
        Ok(config)
    }
}
