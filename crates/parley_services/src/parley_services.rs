use std::sync::Arc;

use parley_config::Settings;
use parley_domain::{
    FileReaderInfra, FileWriterInfra, GenerationParams, InferenceClient, ResourceProbe,
    SessionContext,
};

use crate::{ModelComparator, ResourceMonitor, StatusService, StreamingRelay, TranscriptStore};

/// Everything the services need from the outside world.
pub trait Infrastructure:
    InferenceClient + FileReaderInfra + FileWriterInfra + ResourceProbe
{
}

impl<T: InferenceClient + FileReaderInfra + FileWriterInfra + ResourceProbe> Infrastructure for T {}

/// Application container wiring every service to one infrastructure handle.
pub struct ParleyServices<I> {
    relay: StreamingRelay<I>,
    transcripts: Arc<TranscriptStore<I>>,
    comparator: Arc<ModelComparator<I>>,
    monitor: Arc<ResourceMonitor<I>>,
    status: Arc<StatusService<I>>,
    defaults: SessionContext,
}

impl<I> Clone for ParleyServices<I> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
            transcripts: self.transcripts.clone(),
            comparator: self.comparator.clone(),
            monitor: self.monitor.clone(),
            status: self.status.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<I: Infrastructure> ParleyServices<I> {
    pub fn new(infra: Arc<I>, settings: &Settings) -> Self {
        let defaults = SessionContext::new(
            settings.default_model.as_str(),
            GenerationParams::new(settings.temperature, settings.max_tokens),
        );

        Self {
            relay: StreamingRelay::new(infra.clone(), defaults.clone()),
            transcripts: Arc::new(TranscriptStore::new(
                infra.clone(),
                settings.export_dir.clone(),
                defaults.clone(),
            )),
            comparator: Arc::new(ModelComparator::new(infra.clone())),
            monitor: Arc::new(ResourceMonitor::new(infra.clone())),
            status: Arc::new(StatusService::new(infra)),
            defaults,
        }
    }

    pub fn relay(&self) -> &StreamingRelay<I> {
        &self.relay
    }

    pub fn transcripts(&self) -> &TranscriptStore<I> {
        &self.transcripts
    }

    pub fn comparator(&self) -> &ModelComparator<I> {
        &self.comparator
    }

    pub fn monitor(&self) -> &ResourceMonitor<I> {
        &self.monitor
    }

    pub fn status(&self) -> &StatusService<I> {
        &self.status
    }

    /// Session context the application starts with.
    pub fn defaults(&self) -> &SessionContext {
        &self.defaults
    }
}
