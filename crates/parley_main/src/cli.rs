use std::path::PathBuf;

use clap::Parser;
use parley_config::{SYSTEM_CONFIG_FILE, Settings};

#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"), about = "Local chat front-end for Ollama")]
pub struct Cli {
    /// Address to bind the web UI to.
    #[arg(long)]
    pub host: Option<String>,

    /// Port of the web UI.
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Model selected when the UI starts.
    #[arg(long, short)]
    pub model: Option<String>,

    /// Hardware profile with `recommended_settings`, usually written by the
    /// setup script.
    #[arg(long, short, default_value = SYSTEM_CONFIG_FILE)]
    pub config: PathBuf,

    /// Also write logs to daily files in this directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Open the UI in the default browser once the server listens.
    #[arg(long, default_value_t = false)]
    pub open: bool,
}

impl Cli {
    /// Applies the command line overrides on top of the loaded settings.
    pub fn apply(&self, settings: Settings) -> Settings {
        let mut settings = settings;
        if let Some(host) = &self.host {
            settings = settings.host(host);
        }
        if let Some(port) = self.port {
            settings = settings.port(port);
        }
        if let Some(model) = &self.model {
            settings = settings.default_model(model);
        }
        settings
    }
}
