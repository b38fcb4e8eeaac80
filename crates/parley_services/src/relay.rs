use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use parley_domain::{
    Conversation, Error, GenerationParams, GenerationRequest, InferenceClient, Message, ModelId,
    Result, SessionContext,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// The generation currently filling the last assistant placeholder.
#[derive(Debug)]
struct ActiveTurn {
    id: u64,
    placeholder: usize,
    cancel: CancellationToken,
}

/// Handle a turn's stream keeps to check whether it is still the active one.
#[derive(Debug, Clone)]
struct TurnHandle {
    id: u64,
    cancel: CancellationToken,
}

/// State of the single chat session: what to generate with, the
/// conversation, and at most one in-flight turn.
#[derive(Debug)]
pub struct ChatSession {
    context: SessionContext,
    conversation: Conversation,
    active: Option<ActiveTurn>,
    next_turn: u64,
}

impl ChatSession {
    pub fn new(context: SessionContext) -> Self {
        Self { context, conversation: Conversation::new(), active: None, next_turn: 0 }
    }

    /// Cancels the in-flight turn, if any. Its placeholder keeps whatever it
    /// held at that point.
    fn supersede(&mut self) {
        if let Some(turn) = self.active.take() {
            tracing::debug!(turn = turn.id, "Superseding in-flight turn");
            turn.cancel.cancel();
        }
    }

    fn begin_turn(&mut self, message: &str) -> (TurnHandle, GenerationRequest) {
        self.supersede();

        let request = GenerationRequest::for_turn(&self.context, &self.conversation, message);
        self.conversation.push(Message::user(message));
        let placeholder = self.conversation.push(Message::placeholder());

        let id = self.next_turn;
        self.next_turn += 1;
        let cancel = CancellationToken::new();
        self.active = Some(ActiveTurn { id, placeholder, cancel: cancel.clone() });

        (TurnHandle { id, cancel }, request)
    }

    /// Overwrites the placeholder of `turn`. Refused once the turn has been
    /// superseded.
    fn apply(&mut self, turn: u64, text: String) -> bool {
        match &self.active {
            Some(active) if active.id == turn => self.conversation.overwrite(active.placeholder, text),
            _ => false,
        }
    }

    fn finish(&mut self, turn: u64) {
        if self.active.as_ref().is_some_and(|active| active.id == turn) {
            self.active = None;
        }
    }
}

/// Bridges generation streams to conversation updates.
///
/// Every submitted message appends a user turn and an empty assistant
/// placeholder, then each cumulative text item overwrites the placeholder and
/// produces one frame. Submitting again, clearing, or loading a transcript
/// supersedes the in-flight turn, which then stops without touching the
/// conversation.
pub struct StreamingRelay<I> {
    infra: Arc<I>,
    session: Arc<Mutex<ChatSession>>,
}

impl<I> Clone for StreamingRelay<I> {
    fn clone(&self) -> Self {
        Self { infra: self.infra.clone(), session: self.session.clone() }
    }
}

impl<I: InferenceClient> StreamingRelay<I> {
    pub fn new(infra: Arc<I>, context: SessionContext) -> Self {
        Self { infra, session: Arc::new(Mutex::new(ChatSession::new(context))) }
    }

    /// Starts a new turn and returns its frames: first the conversation with
    /// the new user message and empty placeholder, then one snapshot per
    /// generation item. Dropping the stream stops the generation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for a blank message, leaving the
    /// conversation untouched.
    pub async fn submit(&self, message: &str) -> Result<BoxStream<'static, Conversation>> {
        if message.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let (turn, request, initial) = {
            let mut session = self.session.lock().await;
            let (turn, request) = session.begin_turn(message);
            (turn, request, session.conversation.clone())
        };
        tracing::info!(turn = turn.id, model = %request.model, "Submitting message");

        let mut upstream = self.infra.stream_generate(request);
        let session = self.session.clone();

        Ok(async_stream::stream! {
            yield initial;

            loop {
                let item = tokio::select! {
                    biased;
                    _ = turn.cancel.cancelled() => break,
                    item = upstream.next() => item,
                };
                let Some(item) = item else {
                    break;
                };
                let text = match item {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::warn!(turn = turn.id, error = %err, "Generation failed");
                        err.to_string()
                    }
                };

                let snapshot = {
                    let mut session = session.lock().await;
                    if !session.apply(turn.id, text) {
                        break;
                    }
                    session.conversation.clone()
                };
                yield snapshot;
            }

            session.lock().await.finish(turn.id);
            tracing::debug!(turn = turn.id, "Turn finished");
        }
        .boxed())
    }

    /// Drops the conversation and stops any in-flight turn.
    pub async fn clear(&self) {
        let mut session = self.session.lock().await;
        session.supersede();
        session.conversation.clear();
    }

    /// Replaces the conversation and the session context, e.g. after an
    /// import.
    pub async fn load(&self, conversation: Conversation, context: SessionContext) {
        let mut session = self.session.lock().await;
        session.supersede();
        session.conversation = conversation;
        session.context = SessionContext::new(context.model, context.params);
    }

    pub async fn snapshot(&self) -> Conversation {
        self.session.lock().await.conversation.clone()
    }

    pub async fn context(&self) -> SessionContext {
        self.session.lock().await.context.clone()
    }

    /// Selects the model for following turns.
    pub async fn switch_model(&self, model: ModelId) -> String {
        if model.is_blank() {
            return "No model selected".to_string();
        }
        let status = format!("Switched to {model}");
        self.session.lock().await.context.model = model;
        status
    }

    /// Stores new sampling parameters, clamped to their ranges, and returns
    /// the values in effect.
    pub async fn set_params(&self, params: GenerationParams) -> GenerationParams {
        let params = params.clamped();
        self.session.lock().await.context.params = params;
        params
    }
}
