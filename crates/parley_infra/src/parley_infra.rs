use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use parley_config::Settings;
use parley_domain::{
    FileReaderInfra, FileWriterInfra, GenerationRequest, InferenceClient, InferenceError, ModelId,
    ResourceProbe, ResourceSnapshot, ResultStream,
};

use crate::{OllamaClient, ParleyFs, SystemResources};

/// Production infrastructure: the inference server, the local file system
/// and the host resource probe behind one handle.
#[derive(Clone)]
pub struct ParleyInfra {
    inference: Arc<OllamaClient>,
    fs: Arc<ParleyFs>,
    resources: Arc<SystemResources>,
}

impl ParleyInfra {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            inference: Arc::new(OllamaClient::new(settings)?),
            fs: Arc::new(ParleyFs::new()),
            resources: Arc::new(SystemResources::new(settings)),
        })
    }
}

#[async_trait::async_trait]
impl InferenceClient for ParleyInfra {
    async fn list_models(&self) -> Vec<ModelId> {
        self.inference.list_models().await
    }

    async fn check_health(&self) -> bool {
        self.inference.check_health().await
    }

    fn stream_generate(&self, request: GenerationRequest) -> ResultStream<String, InferenceError> {
        self.inference.stream_generate(request)
    }
}

#[async_trait::async_trait]
impl FileReaderInfra for ParleyInfra {
    async fn read_utf8(&self, path: &Path) -> anyhow::Result<String> {
        self.fs.read_utf8(path).await
    }
}

#[async_trait::async_trait]
impl FileWriterInfra for ParleyInfra {
    async fn write(&self, path: &Path, contents: Bytes) -> anyhow::Result<()> {
        self.fs.write(path, contents).await
    }
}

#[async_trait::async_trait]
impl ResourceProbe for ParleyInfra {
    async fn sample(&self) -> parley_domain::Result<ResourceSnapshot> {
        self.resources.sample().await
    }
}
