//! Route handlers. Upstream trouble never turns into an error status: the
//! engine degrades to placeholder text and the handlers always answer 200.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use crate::core::pool;
use crate::domain::model::{AgentResponse, ModelKind, StreamEvent};
use crate::server::schema::{
    FeedbackRequest, HealthResponse, RunAgentRequest, StatusResponse, StreamParams,
};
use crate::server::state::AppState;

const STREAM_BUFFER: usize = 16;

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        models: ModelKind::POOL.len(),
    })
}

/// `POST /api/run-agent`
pub async fn run_agent(
    State(state): State<AppState>,
    Json(req): Json<RunAgentRequest>,
) -> Json<AgentResponse> {
    let requested = req.models.unwrap_or_default();
    Json(state.engine.run(&req.query, &requested).await)
}

/// `GET /api/run-agent/stream`
pub async fn run_agent_stream(
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let selected = pool::parse_model_list(params.models.as_deref());
    let (tx, rx) = mpsc::channel(STREAM_BUFFER);

    let engine = state.engine.clone();
    let pacing = state.pacing.clone();
    tokio::spawn(async move {
        engine.run_staged(&params.query, selected, &pacing, tx).await;
    });

    let events = ReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(to_sse_event(&event)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        tracing::warn!("Dropping unserializable stream event: {}", e);
        Event::default().comment("unserializable event")
    })
}

/// `POST /api/feedback`
pub async fn submit_feedback(Json(req): Json<FeedbackRequest>) -> Json<StatusResponse> {
    tracing::info!(model = %req.model, feedback = %req.feedback, "📝 Feedback received");
    Json(StatusResponse { status: "ok" })
}
