use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use chrono::Local;
use parley_domain::{
    Error, FileReaderInfra, FileWriterInfra, GenerationRequest, InferenceClient, InferenceError,
    ModelId, ResourceProbe, ResourceSnapshot, ResultStream,
};
use tokio::sync::mpsc;

type Item = Result<String, InferenceError>;

/// Scripted response of one `stream_generate` call.
pub enum Script {
    Items(Vec<Item>),
    Channel(mpsc::UnboundedReceiver<Item>),
}

impl Script {
    pub fn items<const N: usize>(texts: [&str; N]) -> Self {
        Script::Items(texts.iter().map(|text| Ok(text.to_string())).collect())
    }

    /// A stream fed item by item from the returned sender.
    pub fn channel() -> (mpsc::UnboundedSender<Item>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Script::Channel(rx))
    }
}

/// In-memory infrastructure recording every call it receives.
pub struct MockInfra {
    healthy: bool,
    models: Vec<ModelId>,
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
    files: Mutex<HashMap<PathBuf, String>>,
    fail_writes: bool,
    snapshot: Option<ResourceSnapshot>,
}

impl MockInfra {
    pub fn new() -> Self {
        Self {
            healthy: true,
            models: vec![ModelId::new("llama3")],
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            files: Mutex::new(HashMap::new()),
            fail_writes: false,
            snapshot: None,
        }
    }

    pub fn with_script(self, script: Script) -> Self {
        self.scripts.lock().unwrap().push_back(script);
        self
    }

    pub fn with_health(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn with_models(mut self, models: Vec<ModelId>) -> Self {
        self.models = models;
        self
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.lock().unwrap().insert(path.into(), content.into());
        self
    }

    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn with_snapshot(mut self) -> Self {
        self.snapshot = Some(ResourceSnapshot {
            cpu_percent: 25.0,
            memory_used: 8 * (1 << 30),
            memory_total: 32 * (1 << 30),
            gpu_description: "Not detected".to_string(),
            timestamp: Local::now(),
        });
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn files(&self) -> HashMap<PathBuf, String> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl InferenceClient for MockInfra {
    async fn list_models(&self) -> Vec<ModelId> {
        self.models.clone()
    }

    async fn check_health(&self) -> bool {
        self.healthy
    }

    fn stream_generate(&self, request: GenerationRequest) -> ResultStream<String, InferenceError> {
        self.requests.lock().unwrap().push(request);
        match self.scripts.lock().unwrap().pop_front() {
            Some(Script::Items(items)) => Box::pin(futures::stream::iter(items)),
            Some(Script::Channel(rx)) => Box::pin(futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            })),
            None => Box::pin(futures::stream::empty()),
        }
    }
}

#[async_trait::async_trait]
impl FileReaderInfra for MockInfra {
    async fn read_utf8(&self, path: &Path) -> anyhow::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!(std::io::Error::from(std::io::ErrorKind::NotFound)))
    }
}

#[async_trait::async_trait]
impl FileWriterInfra for MockInfra {
    async fn write(&self, path: &Path, contents: Bytes) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("Permission denied");
        }
        let content = String::from_utf8(contents.to_vec())?;
        self.files.lock().unwrap().insert(path.to_path_buf(), content);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourceProbe for MockInfra {
    async fn sample(&self) -> parley_domain::Result<ResourceSnapshot> {
        self.snapshot.clone().ok_or(Error::ResourceProbeUnavailable)
    }
}
