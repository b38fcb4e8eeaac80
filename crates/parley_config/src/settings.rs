use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{RecommendedSettings, Result};

/// Runtime settings for the chat front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[serde(rename_all = "snake_case")]
#[setters(into)]
pub struct Settings {
    /// Base URL of the Ollama-compatible inference server.
    pub ollama_url: Url,
    /// Model used until the user picks another one, and the fallback entry
    /// of the model list when the server cannot be reached.
    pub default_model: String,
    /// Initial sampling temperature.
    pub temperature: f64,
    /// Initial completion budget in tokens.
    pub max_tokens: u32,
    /// Timeout for health probes and model listing.
    pub health_timeout_secs: u64,
    /// Overall deadline of a single generation stream.
    pub generate_timeout_secs: u64,
    /// Timeout for the GPU description tool invocation.
    pub gpu_probe_timeout_secs: u64,
    /// Interval over which CPU usage is sampled.
    pub cpu_sample_interval_ms: u64,
    /// Directory that receives exported transcripts.
    pub export_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Loads settings from three layers, each overriding the previous one:
    ///
    /// 1. `defaults.json`, compiled into the binary
    /// 2. the `recommended_settings` block of `system_config` (when the file
    ///    exists)
    /// 3. environment variables prefixed with `PARLEY_`, using `__` for
    ///    nested keys, e.g. `PARLEY_DEFAULT_MODEL`, `PARLEY_PORT`
    ///
    /// # Errors
    ///
    /// Fails when the system config exists but cannot be read or parsed, or
    /// when a layer holds a value of the wrong type.
    pub fn load(system_config: &Path) -> Result<Self> {
        const DEFAULT_CONFIG: &str = include_str!("../defaults.json");

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Json,
        ));

        if let Some(recommended) = RecommendedSettings::read(system_config)? {
            tracing::info!(path = %system_config.display(), "Applying recommended settings");
            builder = builder.add_source(config::File::from_str(
                &recommended.to_overrides(),
                config::FileFormat::Json,
            ));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }

    pub fn gpu_probe_timeout(&self) -> Duration {
        Duration::from_secs(self.gpu_probe_timeout_secs)
    }

    pub fn cpu_sample_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_interval_ms)
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
