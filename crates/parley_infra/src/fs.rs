use std::path::Path;

use anyhow::Context as _;
use bytes::Bytes;
use parley_domain::{FileReaderInfra, FileWriterInfra};

#[derive(Default)]
pub struct ParleyFs;

impl ParleyFs {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl FileReaderInfra for ParleyFs {
    async fn read_utf8(&self, path: &Path) -> anyhow::Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[async_trait::async_trait]
impl FileWriterInfra for ParleyFs {
    async fn write(&self, path: &Path, contents: Bytes) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
