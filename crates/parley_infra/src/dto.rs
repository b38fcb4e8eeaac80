use parley_domain::GenerationRequest;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: u32,
}

impl From<GenerationRequest> for GenerateRequest {
    fn from(request: GenerationRequest) -> Self {
        Self {
            model: request.model.as_str().to_string(),
            prompt: request.prompt,
            stream: request.stream,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

/// One line of the newline-delimited generate response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct GenerateChunk {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
}

/// Response of `GET /api/tags`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagsModel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct TagsModel {
    pub name: String,
}

/// Folds generate chunks into the cumulative response text.
#[derive(Debug, Default)]
pub(crate) struct TextAccumulator {
    text: String,
}

/// Outcome of feeding one line to a [`TextAccumulator`].
#[derive(Debug, PartialEq)]
pub(crate) struct LineUpdate {
    /// Cumulative text, present when the line grew it.
    pub text: Option<String>,
    /// The line carried the terminal marker.
    pub done: bool,
}

impl TextAccumulator {
    /// Applies one raw line. Blank and unparseable lines yield `None`.
    pub fn apply(&mut self, line: &[u8]) -> Option<LineUpdate> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        let chunk: GenerateChunk = match serde_json::from_slice(line) {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::debug!(error = %err, "Skipping malformed stream line");
                return None;
            }
        };

        let text = match chunk.response {
            Some(fragment) if !fragment.is_empty() => {
                self.text.push_str(&fragment);
                Some(self.text.clone())
            }
            _ => None,
        };

        Some(LineUpdate { text, done: chunk.done })
    }
}
