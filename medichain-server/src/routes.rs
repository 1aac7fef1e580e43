use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use medichain_agents::prompts::with_disclaimer;
use medichain_history::{MessageRole, SessionSummary, StoredMessage};
use serde::{Deserialize, Serialize};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::{AppState, ServerConfig, ServerError};

const SERVICE_NAME: &str = "MEDICAL CHAT API";
const SERVICE_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// `conversation_id` wins over its alias `session_id` when both are sent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub conversation_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: String,
    /// Local wall-clock time, `HH:MM AM`.
    pub timestamp: String,
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionQuery {
    conversation_id: Option<String>,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    messages: Vec<StoredMessage>,
}

#[derive(Debug, Serialize)]
struct SessionsResponse {
    sessions: Vec<SessionSummary>,
}

fn session_key(primary: Option<String>, alias: Option<String>) -> Option<String> {
    primary
        .filter(|id| !id.trim().is_empty())
        .or(alias.filter(|id| !id.trim().is_empty()))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online".to_string(),
        service: SERVICE_NAME.to_string(),
        version: SERVICE_VERSION.to_string(),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let message = body
        .message
        .filter(|message| !message.trim().is_empty())
        .ok_or(ServerError::BadRequest("No message provided"))?;
    let session_id = session_key(body.conversation_id, body.session_id)
        .ok_or(ServerError::BadRequest("No conversation_id provided"))?;

    // Held for the whole turn; a second request on this session waits here.
    let mut session = state.lock_session(&session_id).await;

    let turn = state
        .workflow()
        .run_turn(session.state.clone(), message.as_str());
    let result = match tokio::time::timeout(state.turn_timeout(), turn).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!(%session_id, "chat turn timed out, session left unchanged");
            return Err(ServerError::Timeout(state.turn_timeout()));
        }
    };

    let answer = result.generation.clone().unwrap_or_default();
    let source = result.source.clone();
    session.state = result;
    state.record(&session_id, MessageRole::User, &message).await;
    state
        .record(&session_id, MessageRole::Assistant, &answer)
        .await;
    drop(session);

    Ok(Json(ChatResponse {
        success: !answer.trim().is_empty(),
        response: with_disclaimer(&answer),
        source,
        timestamp: chrono::Local::now().format("%I:%M %p").to_string(),
    }))
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let session_id = session_key(query.conversation_id, query.session_id)
        .ok_or(ServerError::BadRequest("No conversation_id provided"))?;

    let messages = match state.store() {
        Some(store) => store.get_chat_history(&session_id).await.unwrap_or_else(|err| {
            tracing::warn!(%session_id, error = %err, "failed to read history");
            Vec::new()
        }),
        None => Vec::new(),
    };
    Ok(Json(HistoryResponse { messages }))
}

async fn sessions(State(state): State<AppState>) -> Json<SessionsResponse> {
    let sessions = match state.store() {
        Some(store) => store.list_sessions().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to list sessions");
            Vec::new()
        }),
        None => Vec::new(),
    };
    Json(SessionsResponse { sessions })
}

async fn delete_session(State(state): State<AppState>, Path(session_id): Path<String>) -> StatusCode {
    let was_live = state.forget(&session_id).await;
    if let Some(store) = state.store() {
        if let Err(err) = store.delete_session(&session_id).await {
            tracing::warn!(%session_id, error = %err, "failed to delete stored session");
        }
    }
    tracing::info!(%session_id, was_live, "session deleted");
    StatusCode::NO_CONTENT
}

/// All routes, with CORS open to any origin, a body size limit and request tracing.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let state = state.with_turn_timeout(config.turn_timeout);
    let mut app = Router::new()
        .route("/", get(health))
        .route("/api/chat", post(chat))
        .route("/api/history", get(history))
        .route("/api/sessions", get(sessions))
        .route("/api/sessions/:id", delete(delete_session))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());
    if let Some(limit) = config.max_concurrent_requests {
        app = app.layer(ConcurrencyLimitLayer::new(limit));
    }
    app
}
