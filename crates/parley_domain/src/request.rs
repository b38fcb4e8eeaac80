use derive_setters::Setters;

use crate::{GenerationParams, Message, ModelId, SessionContext, build_prompt};

/// A single completion call. Built fresh per call and never persisted.
#[derive(Clone, Debug, PartialEq, Setters)]
#[setters(into)]
pub struct GenerationRequest {
    pub model: ModelId,
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<ModelId>, prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stream: true,
        }
    }

    /// Builds a streaming request for `new_message` on top of `history`, using
    /// the model and parameters of the session.
    pub fn for_turn(context: &SessionContext, history: &[Message], new_message: &str) -> Self {
        Self::new(
            context.model.clone(),
            build_prompt(history, new_message),
            context.params,
        )
    }
}
