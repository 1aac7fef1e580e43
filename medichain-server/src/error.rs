use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use medichain_agents::WorkflowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("chat turn timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::Workflow(WorkflowError::MissingQuestion) => StatusCode::BAD_REQUEST,
            ServerError::Workflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "chat request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
