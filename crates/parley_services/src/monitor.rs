use std::sync::Arc;

use parley_domain::{InferenceClient, ModelId, ResourceProbe, ResourceReport};

pub const STATUS_CONNECTED: &str = "✅ Connected and ready";
pub const STATUS_UNAVAILABLE: &str = "❌ Ollama not available";

/// Formats host resource samples for the resource panel.
pub struct ResourceMonitor<I> {
    infra: Arc<I>,
}

impl<I: ResourceProbe> ResourceMonitor<I> {
    pub fn new(infra: Arc<I>) -> Self {
        Self { infra }
    }

    pub async fn report(&self) -> ResourceReport {
        match self.infra.sample().await {
            Ok(snapshot) => ResourceReport::from(&snapshot),
            Err(err) => {
                tracing::debug!(error = %err, "Resource sampling failed");
                ResourceReport::unavailable()
            }
        }
    }
}

/// Reachability of the inference server and its installed models.
pub struct StatusService<I> {
    infra: Arc<I>,
}

impl<I: InferenceClient> StatusService<I> {
    pub fn new(infra: Arc<I>) -> Self {
        Self { infra }
    }

    pub async fn status(&self) -> &'static str {
        if self.infra.check_health().await { STATUS_CONNECTED } else { STATUS_UNAVAILABLE }
    }

    pub async fn models(&self) -> Vec<ModelId> {
        self.infra.list_models().await
    }
}
