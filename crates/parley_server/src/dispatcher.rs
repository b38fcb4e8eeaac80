use futures::StreamExt;
use parley_domain::{GenerationParams, SessionContext};
use parley_services::{Infrastructure, ParleyServices, model_choices};

use crate::{ActionOutput, SessionState, UiAction};

/// Routes [`UiAction`]s to the services that handle them.
pub struct Dispatcher<I> {
    services: ParleyServices<I>,
}

impl<I> Clone for Dispatcher<I> {
    fn clone(&self) -> Self {
        Self { services: self.services.clone() }
    }
}

impl<I: Infrastructure> Dispatcher<I> {
    pub fn new(services: ParleyServices<I>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &ParleyServices<I> {
        &self.services
    }

    pub async fn state(&self) -> SessionState {
        let relay = self.services.relay();
        SessionState { conversation: relay.snapshot().await, context: relay.context().await }
    }

    pub async fn dispatch(&self, action: UiAction) -> ActionOutput {
        tracing::debug!(action = %action.id(), "Dispatching");
        let relay = self.services.relay();

        match action {
            UiAction::Send { message } => match relay.submit(&message).await {
                Ok(frames) => ActionOutput {
                    conversation: frames.collect::<Vec<_>>().await.pop(),
                    ..Default::default()
                },
                Err(err) => ActionOutput {
                    conversation: Some(relay.snapshot().await),
                    status: Some(err.to_string()),
                    ..Default::default()
                },
            },
            UiAction::Clear => {
                relay.clear().await;
                ActionOutput { conversation: Some(relay.snapshot().await), ..Default::default() }
            }
            UiAction::RefreshStatus => ActionOutput {
                status: Some(self.services.status().status().await.to_string()),
                ..Default::default()
            },
            UiAction::RefreshResources => ActionOutput {
                resources: Some(self.services.monitor().report().await),
                ..Default::default()
            },
            UiAction::ListModels => {
                let models = self.services.status().models().await;
                ActionOutput {
                    comparison_models: Some(model_choices(models.clone())),
                    models: Some(models),
                    ..Default::default()
                }
            }
            UiAction::SwitchModel { model } => ActionOutput {
                status: Some(relay.switch_model(model).await),
                ..Default::default()
            },
            UiAction::SetParameters { temperature, max_tokens } => ActionOutput {
                params: Some(relay.set_params(GenerationParams::new(temperature, max_tokens)).await),
                ..Default::default()
            },
            UiAction::Export => {
                let context = relay.context().await;
                let outcome = self
                    .services
                    .transcripts()
                    .export(&relay.snapshot().await, &context.model, context.params)
                    .await;
                ActionOutput {
                    status: Some(outcome.status),
                    path: outcome.path,
                    ..Default::default()
                }
            }
            UiAction::Import { path } => {
                let outcome = self.services.transcripts().import(path.as_deref()).await;
                relay
                    .load(
                        outcome.conversation.clone(),
                        SessionContext::new(outcome.model.clone(), outcome.params),
                    )
                    .await;
                let context = relay.context().await;
                ActionOutput {
                    conversation: Some(outcome.conversation),
                    status: Some(outcome.status),
                    model: Some(context.model),
                    params: Some(context.params),
                    ..Default::default()
                }
            }
            UiAction::Compare { prompt, model_a, model_b, temperature, max_tokens } => {
                let outcome = self
                    .services
                    .comparator()
                    .compare(
                        &prompt,
                        &model_a,
                        &model_b,
                        GenerationParams::new(temperature, max_tokens).clamped(),
                    )
                    .await;
                ActionOutput {
                    comparison: Some(outcome.comparison),
                    status: Some(outcome.status),
                    ..Default::default()
                }
            }
        }
    }
}
