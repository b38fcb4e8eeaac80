use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{Conversation, GenerationParams, ModelId};

/// Parameters block of a transcript file. The block itself is mandatory, but
/// either value may be absent and then takes its default.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptParameters {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f64 {
    GenerationParams::DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    GenerationParams::DEFAULT_MAX_TOKENS
}

impl From<GenerationParams> for TranscriptParameters {
    fn from(params: GenerationParams) -> Self {
        Self { temperature: params.temperature, max_tokens: params.max_tokens }
    }
}

impl From<TranscriptParameters> for GenerationParams {
    fn from(params: TranscriptParameters) -> Self {
        GenerationParams::new(params.temperature, params.max_tokens)
    }
}

/// On-disk form of an exported chat.
///
/// `model`, `parameters` and `conversation` are required: a document missing
/// any of them fails to deserialize and is rejected as a whole. `timestamp`
/// is informational only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFile {
    #[serde(default)]
    pub timestamp: String,
    pub model: ModelId,
    pub parameters: TranscriptParameters,
    pub conversation: Conversation,
}

impl TranscriptFile {
    pub fn new(
        timestamp: DateTime<Local>,
        model: ModelId,
        params: GenerationParams,
        conversation: Conversation,
    ) -> Self {
        Self {
            timestamp: timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            model,
            parameters: params.into(),
            conversation,
        }
    }

    /// File name an export taken at `timestamp` is written to.
    pub fn file_name(timestamp: &DateTime<Local>) -> String {
        format!("chat_export_{}.json", timestamp.format("%Y%m%d_%H%M%S"))
    }

    /// Pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
