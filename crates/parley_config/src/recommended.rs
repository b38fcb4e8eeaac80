use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name probed in the working directory when no explicit config path is
/// given.
pub const SYSTEM_CONFIG_FILE: &str = "system_config.json";

/// The `recommended_settings` block of a system config file, usually produced
/// by a hardware probe script that picks a model suited to the machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendedSettings {
    #[serde(
        rename(serialize = "default_model", deserialize = "model"),
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SystemConfig {
    #[serde(default)]
    recommended_settings: Option<RecommendedSettings>,
}

impl RecommendedSettings {
    /// Reads the recommended settings from `path`. A missing file yields
    /// `None`; an unreadable or malformed one is an error.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No system config found");
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::ReadSystemConfig { path: path.to_path_buf(), source });
            }
        };

        let config: SystemConfig = serde_json::from_str(&content)
            .map_err(|source| Error::ParseSystemConfig { path: path.to_path_buf(), source })?;

        Ok(config.recommended_settings)
    }

    /// Renders the settings as a JSON document keyed by [`crate::Settings`]
    /// field names.
    pub(crate) fn to_overrides(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
