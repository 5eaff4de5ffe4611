use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use maya_core::session::Turn;
use serde::{Deserialize, Serialize};

use crate::conversation;
use crate::state::AppState;
use crate::widget;

/// Error body returned by every API route
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<maya_core::Error> for ApiError {
    fn from(err: maya_core::Error) -> Self {
        let status = match &err {
            maya_core::Error::Validation(_) => StatusCode::BAD_REQUEST,
            maya_core::Error::NotFound(_) => StatusCode::NOT_FOUND,
            maya_core::Error::Session(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, "{}", self.message);
        }
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub project_id: String,
    pub language_code: String,
    pub sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session: String,
    pub transcript: Vec<Turn>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
    pub language_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub reply: String,
    pub notice: Option<String>,
    pub transcript: Vec<Turn>,
}

pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(widget::render(&state.chat))
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running".to_string(),
        project_id: state.project_id.clone(),
        language_code: state.client.language_code().to_string(),
        sessions: state.sessions.len(),
    })
}

pub async fn create_session_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let session = state.sessions.create().map_err(|e| match e {
        maya_core::Error::Session(message) => {
            ApiError::new(StatusCode::SERVICE_UNAVAILABLE, message)
        }
        other => other.into(),
    })?;
    let transcript = state.sessions.transcript(&session)?;
    tracing::info!(session = %session, "Chat session started");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session,
            transcript,
        }),
    ))
}

pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let snapshot = state.sessions.get(&session)?;
    Ok(Json(SessionResponse {
        session,
        transcript: snapshot.transcript().to_vec(),
    }))
}

pub async fn post_message_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Detached so a dropped connection still completes the turn.
    let task = tokio::spawn(async move {
        conversation::exchange(
            &state.sessions,
            &state.client,
            &session,
            &payload.text,
            payload.language_code.as_deref(),
        )
        .await
    });

    let outcome = task
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;

    Ok(Json(MessageResponse {
        reply: outcome.reply,
        notice: outcome.notice,
        transcript: outcome.transcript,
    }))
}

pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.end(&session) {
        tracing::info!(session = %session, "Chat session ended");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Not found: session {}", session),
        ))
    }
}
