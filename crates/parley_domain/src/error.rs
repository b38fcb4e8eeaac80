/// Failures of a single generation stream. The display text is what ends up
/// in the assistant placeholder, so every variant renders as a complete,
/// user-facing sentence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("❌ Error: Ollama is not running or the model is not available.")]
    Unavailable,

    #[error("❌ Error connecting to Ollama: Please ensure Ollama is running.")]
    Connection,

    #[error("❌ Error: HTTP {0}")]
    Status(u16),

    #[error("❌ Timeout: Model is taking too long to respond.")]
    Timeout,

    #[error("❌ Error: {0}")]
    Transport(String),
}

/// User-facing failures of the chat operations. These are reported as status
/// strings, never propagated to the UI as faults.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("❌ Please enter a prompt.")]
    EmptyInput,

    #[error(
        "❌ Need at least 2 models downloaded to compare. Use 'ollama pull <model>' to download more."
    )]
    InsufficientModels,

    #[error("⚠️ Please select two different models to compare.")]
    DuplicateModelSelection,

    #[error("⚠️ No conversation to export.")]
    EmptyConversation,

    #[error("❌ Invalid file format: {0}")]
    InvalidTranscript(String),

    #[error("❌ Export failed: {0}")]
    ExportFailed(String),

    #[error("Resource probe unavailable")]
    ResourceProbeUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;
