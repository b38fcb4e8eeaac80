use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use parley_config::Settings;
use parley_domain::{
    Error, FileReaderInfra, FileWriterInfra, GenerationRequest, InferenceClient, InferenceError,
    ModelId, ResourceProbe, ResourceSnapshot, ResultStream,
};
use parley_services::ParleyServices;

use crate::Dispatcher;

/// In-memory infrastructure with canned replies. Clones share their state.
#[derive(Clone, Default)]
pub struct StubInfra {
    replies: Arc<Mutex<VecDeque<Vec<String>>>>,
    calls: Arc<Mutex<usize>>,
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl StubInfra {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the cumulative texts of one generation.
    pub fn with_reply<const N: usize>(self, texts: [&str; N]) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(texts.iter().map(|text| text.to_string()).collect());
        self
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
        self
    }

    pub fn generate_calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

pub fn dispatcher(infra: StubInfra) -> Dispatcher<StubInfra> {
    let settings = Settings::load(Path::new("/parley-missing-system-config.json"))
        .unwrap()
        .default_model("codellama:7b")
        .temperature(0.7)
        .max_tokens(2048u32)
        .export_dir("/exports");
    Dispatcher::new(ParleyServices::new(Arc::new(infra), &settings))
}

#[async_trait::async_trait]
impl InferenceClient for StubInfra {
    async fn list_models(&self) -> Vec<ModelId> {
        vec![ModelId::new("llama3")]
    }

    async fn check_health(&self) -> bool {
        true
    }

    fn stream_generate(&self, _request: GenerationRequest) -> ResultStream<String, InferenceError> {
        *self.calls.lock().unwrap() += 1;
        let texts = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        Box::pin(futures::stream::iter(texts.into_iter().map(Ok)))
    }
}

#[async_trait::async_trait]
impl FileReaderInfra for StubInfra {
    async fn read_utf8(&self, path: &Path) -> anyhow::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No such file: {}", path.display()))
    }
}

#[async_trait::async_trait]
impl FileWriterInfra for StubInfra {
    async fn write(&self, path: &Path, contents: Bytes) -> anyhow::Result<()> {
        let content = String::from_utf8(contents.to_vec())?;
        self.files.lock().unwrap().insert(path.to_path_buf(), content);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourceProbe for StubInfra {
    async fn sample(&self) -> parley_domain::Result<ResourceSnapshot> {
        Err(Error::ResourceProbeUnavailable)
    }
}
