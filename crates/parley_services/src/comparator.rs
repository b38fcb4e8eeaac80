use std::sync::Arc;

use chrono::{DateTime, Local};
use futures::StreamExt;
use parley_domain::{
    Error, GenerationParams, GenerationRequest, InferenceClient, ModelId, build_prompt,
};
use serde::Serialize;

/// Dropdown entry shown when fewer than two models are installed.
pub const INSUFFICIENT_MODELS: &str = "Need at least 2 models";

/// Choices for the two comparison dropdowns.
pub fn model_choices(models: Vec<ModelId>) -> Vec<ModelId> {
    if models.len() < 2 {
        vec![ModelId::new(INSUFFICIENT_MODELS)]
    } else {
        models
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonOutcome {
    pub comparison: String,
    pub status: String,
}

impl From<Error> for ComparisonOutcome {
    fn from(err: Error) -> Self {
        Self { comparison: String::new(), status: err.to_string() }
    }
}

#[derive(Debug)]
struct Response<'a> {
    model: &'a ModelId,
    text: String,
}

/// Runs one prompt through two models, one after the other, and lays the
/// final answers side by side.
pub struct ModelComparator<I> {
    infra: Arc<I>,
}

impl<I: InferenceClient> ModelComparator<I> {
    pub fn new(infra: Arc<I>) -> Self {
        Self { infra }
    }

    pub async fn compare(
        &self,
        prompt: &str,
        model_a: &ModelId,
        model_b: &ModelId,
        params: GenerationParams,
    ) -> ComparisonOutcome {
        if let Err(err) = check_selection(prompt, model_a, model_b) {
            return err.into();
        }

        tracing::info!(%model_a, %model_b, "Comparing models");
        let a = Response { model: model_a, text: self.collect(prompt, model_a, params).await };
        let b = Response { model: model_b, text: self.collect(prompt, model_b, params).await };

        ComparisonOutcome {
            comparison: render(prompt, &a, &b, Local::now()),
            status: "✅ Comparison completed".to_string(),
        }
    }

    /// Drains one generation and keeps its last item.
    async fn collect(&self, prompt: &str, model: &ModelId, params: GenerationParams) -> String {
        let request = GenerationRequest::new(model.clone(), build_prompt(&[], prompt), params);
        let mut stream = self.infra.stream_generate(request);

        let mut text = String::new();
        while let Some(item) = stream.next().await {
            text = match item {
                Ok(text) => text,
                Err(err) => err.to_string(),
            };
        }
        text
    }
}

fn check_selection(prompt: &str, model_a: &ModelId, model_b: &ModelId) -> Result<(), Error> {
    if prompt.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    if [model_a, model_b]
        .iter()
        .any(|model| model.as_str() == INSUFFICIENT_MODELS)
    {
        return Err(Error::InsufficientModels);
    }
    if model_a == model_b {
        return Err(Error::DuplicateModelSelection);
    }
    Ok(())
}

fn render(prompt: &str, a: &Response<'_>, b: &Response<'_>, at: DateTime<Local>) -> String {
    let section = |label: &str, response: &Response<'_>| {
        format!(
            "---\n\n### {label} {}\n\n{}\n\n*Length: {} characters*\n\n",
            response.model,
            response.text,
            response.text.chars().count()
        )
    };

    format!(
        "## Model Comparison\n\n**Prompt:** {prompt}\n\n{}{}---\n\n*Completed at: {}*",
        section("🅰️", a),
        section("🅱️", b),
        at.format("%H:%M:%S")
    )
}
