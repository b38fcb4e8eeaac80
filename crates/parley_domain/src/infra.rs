use std::path::Path;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use crate::{GenerationRequest, InferenceError, ModelId, ResourceSnapshot};

pub type ResultStream<T, E> = Pin<Box<dyn Stream<Item = std::result::Result<T, E>> + Send>>;

/// Client of the local inference server. None of the operations fail: every
/// problem is folded into a fallback value or a terminal stream item.
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync + 'static {
    /// Models installed on the server, or the configured default model alone
    /// when the server cannot be asked.
    async fn list_models(&self) -> Vec<ModelId>;

    /// Whether the server answers its status endpoint within the probe
    /// timeout.
    async fn check_health(&self) -> bool;

    /// Starts a generation. Every `Ok` item carries the cumulative text so
    /// far; an `Err` item is always the last one. The stream is lazy: nothing
    /// touches the network until it is first polled.
    fn stream_generate(&self, request: GenerationRequest) -> ResultStream<String, InferenceError>;
}

#[async_trait::async_trait]
pub trait FileReaderInfra: Send + Sync {
    async fn read_utf8(&self, path: &Path) -> anyhow::Result<String>;
}

#[async_trait::async_trait]
pub trait FileWriterInfra: Send + Sync {
    /// Writes `contents` to `path`, creating parent directories as needed.
    async fn write(&self, path: &Path, contents: Bytes) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait ResourceProbe: Send + Sync {
    async fn sample(&self) -> crate::Result<ResourceSnapshot>;
}
