use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use futures::{Stream, StreamExt, stream};
use parley_services::Infrastructure;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{ACTIONS, Dispatcher, UiAction};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Builds the browser-facing router.
pub fn router<I: Infrastructure>(dispatcher: Dispatcher<I>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/actions", get(actions))
        .route("/api/state", get(state::<I>))
        .route("/api/action", post(action::<I>))
        .route("/api/chat", post(chat::<I>))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn actions() -> impl IntoResponse {
    Json(ACTIONS)
}

async fn state<I: Infrastructure>(State(dispatcher): State<Dispatcher<I>>) -> impl IntoResponse {
    Json(dispatcher.state().await)
}

async fn action<I: Infrastructure>(
    State(dispatcher): State<Dispatcher<I>>,
    body: Bytes,
) -> Response {
    match serde_json::from_slice::<UiAction>(&body) {
        Ok(action) => Json(dispatcher.dispatch(action).await).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Rejected action");
            (StatusCode::BAD_REQUEST, format!("Invalid action: {err}")).into_response()
        }
    }
}

/// Streams the conversation after every generation item as `frame` events,
/// followed by a single `done` event. Closing the connection stops the
/// generation.
async fn chat<I: Infrastructure>(
    State(dispatcher): State<Dispatcher<I>>,
    body: Bytes,
) -> Response {
    let request = match serde_json::from_slice::<ChatRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            return (StatusCode::BAD_REQUEST, format!("Invalid chat request: {err}"))
                .into_response();
        }
    };

    match dispatcher.services().relay().submit(&request.message).await {
        Ok(frames) => Sse::new(frame_events(frames))
            .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
            .into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    }
}

fn frame_events<S, T>(frames: S) -> impl Stream<Item = Result<Event, Infallible>> + Send
where
    S: Stream<Item = T> + Send,
    T: serde::Serialize,
{
    frames
        .map(|frame| {
            let data = serde_json::to_string(&frame).unwrap_or_else(|_| "[]".to_string());
            Ok(Event::default().event("frame").data(data))
        })
        .chain(stream::once(async { Ok(Event::default().event("done").data("")) }))
}
