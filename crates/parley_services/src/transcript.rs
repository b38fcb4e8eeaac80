use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parley_domain::{
    Conversation, Error, FileReaderInfra, FileWriterInfra, GenerationParams, ModelId, Result,
    SessionContext, TranscriptFile,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub status: String,
    /// Absolute path of the written file; absent when nothing was written.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub status: String,
    pub conversation: Conversation,
    pub model: ModelId,
    pub params: GenerationParams,
    /// Whether the file was accepted. A rejected file leaves the other fields
    /// at their defaults.
    pub imported: bool,
}

/// Writes conversations to flat JSON transcript files and reads them back.
pub struct TranscriptStore<I> {
    infra: Arc<I>,
    export_dir: PathBuf,
    defaults: SessionContext,
}

impl<I: FileReaderInfra + FileWriterInfra> TranscriptStore<I> {
    pub fn new(infra: Arc<I>, export_dir: PathBuf, defaults: SessionContext) -> Self {
        Self { infra, export_dir, defaults }
    }

    /// Exports `conversation` together with the model and parameters it was
    /// generated with. Never fails: problems are reported in the status.
    pub async fn export(
        &self,
        conversation: &Conversation,
        model: &ModelId,
        params: GenerationParams,
    ) -> ExportOutcome {
        match self.write_transcript(conversation, model, params).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), messages = conversation.len(), "Exported chat");
                ExportOutcome {
                    status: format!("✅ Chat exported to {}", path.display()),
                    path: Some(path),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Export skipped");
                ExportOutcome { status: err.to_string(), path: None }
            }
        }
    }

    async fn write_transcript(
        &self,
        conversation: &Conversation,
        model: &ModelId,
        params: GenerationParams,
    ) -> Result<PathBuf> {
        if conversation.is_empty() {
            return Err(Error::EmptyConversation);
        }

        let now = Local::now();
        let transcript = TranscriptFile::new(now, model.clone(), params, conversation.clone());
        let json = transcript
            .to_json()
            .map_err(|err| Error::ExportFailed(err.to_string()))?;

        let path = std::path::absolute(self.export_dir.join(TranscriptFile::file_name(&now)))
            .map_err(|err| Error::ExportFailed(err.to_string()))?;

        self.infra
            .write(&path, json.into())
            .await
            .map_err(|err| Error::ExportFailed(format!("{err:#}")))?;

        Ok(path)
    }

    /// Imports a transcript file. Any problem yields an invalid-format status,
    /// an empty conversation and the default model and parameters.
    pub async fn import(&self, path: Option<&Path>) -> ImportOutcome {
        match self.read_transcript(path).await {
            Ok(transcript) => {
                let count = transcript.conversation.len();
                tracing::info!(messages = count, "Imported chat");
                ImportOutcome {
                    status: format!("✅ Imported {count} messages"),
                    conversation: transcript.conversation,
                    model: transcript.model,
                    params: transcript.parameters.into(),
                    imported: true,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Import rejected");
                ImportOutcome {
                    status: err.to_string(),
                    conversation: Conversation::new(),
                    model: self.defaults.model.clone(),
                    params: GenerationParams::default(),
                    imported: false,
                }
            }
        }
    }

    async fn read_transcript(&self, path: Option<&Path>) -> Result<TranscriptFile> {
        let path = path
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| Error::InvalidTranscript("no file provided".to_string()))?;

        let content = self
            .infra
            .read_utf8(path)
            .await
            .map_err(|err| Error::InvalidTranscript(format!("{err:#}")))?;

        TranscriptFile::from_json(&content).map_err(|err| Error::InvalidTranscript(err.to_string()))
    }
}
