use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Failed to read system config '{}': {source}", path.display())]
    ReadSystemConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse system config '{}': {source}", path.display())]
    ParseSystemConfig {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
