//! HTTP request handlers
//!
//! Implements the REST surface of the anonymous Q&A feature. Mutations that
//! realtime clients care about (new answers, reactions) also emit onto the
//! event bus, so REST and realtime submissions fan out identically.

use crate::db;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use placehub_common::events::QaEvent;
use placehub_common::models::{
    Answer, NewAnswer, Question, QuestionWithCount, Session, SessionStats,
};
use placehub_common::{time, Error};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSessionRequest {
    session_id: String,
    animal_icon: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    text: String,
    session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    reaction: String,
}

// ============================================================================
// Error mapping
// ============================================================================

/// Handler-level error rendered as `{"error": message}` JSON
///
/// Validation errors map to 400, missing resources to 404, everything else
/// to 500 with the underlying message.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            other => {
                error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "placehub-qa".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Session Endpoints
// ============================================================================

/// POST /sessions/init - Establish or recall a pseudonymous session
///
/// Idempotent: repeated calls return the existing record with the originally
/// chosen icon.
pub async fn init_session(
    State(state): State<AppState>,
    Json(req): Json<InitSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    let session = db::sessions::init_session(&state.db, &req.session_id, &req.animal_icon).await?;
    Ok(Json(session))
}

/// GET /sessions/:session_id/stats - Per-session answer counts by question status
pub async fn get_session_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStats>, ApiError> {
    let stats = db::stats::session_stats(&state.db, &session_id).await?;
    Ok(Json(stats))
}

// ============================================================================
// Question Endpoints
// ============================================================================

/// POST /questions - Submit an anonymous question
pub async fn create_question(
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    let question = db::questions::create_question(&state.db, &req.text, &req.session_id).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /questions - All questions with live answer counts, newest first
pub async fn list_questions(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionWithCount>>, ApiError> {
    let questions = db::questions::list_questions(&state.db).await?;
    Ok(Json(questions))
}

/// GET /questions/:id - Single question
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Question>, ApiError> {
    let question = db::questions::get_question(&state.db, id).await?;
    Ok(Json(question))
}

/// PATCH /questions/:id/status - Moderation status overwrite
pub async fn set_question_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Question>, ApiError> {
    let status = req.status.parse()?;
    let question = db::questions::set_status(&state.db, id, status).await?;
    Ok(Json(question))
}

// ============================================================================
// Answer Endpoints
// ============================================================================

/// POST /answers - Submit an answer
///
/// Broadcasts ANSWER_RECEIVED to every realtime client on success.
pub async fn create_answer(
    State(state): State<AppState>,
    Json(req): Json<NewAnswer>,
) -> Result<(StatusCode, Json<Answer>), ApiError> {
    let answer = db::answers::create_answer(&state.db, req).await?;
    state.events.emit(QaEvent::AnswerReceived(answer.clone()));
    Ok((StatusCode::CREATED, Json(answer)))
}

/// GET /answers/:id - All answers for a question, oldest first
///
/// The path segment is the *question* id.
pub async fn list_answers(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Result<Json<Vec<Answer>>, ApiError> {
    let answers = db::answers::list_by_question(&state.db, question_id).await?;
    Ok(Json(answers))
}

/// POST /answers/:id/react - Increment a reaction label
///
/// Broadcasts REACTION_UPDATED to every realtime client on success; a
/// missing answer is a 404 here (unlike the realtime path, which drops
/// silently).
pub async fn react_to_answer(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
    Json(req): Json<ReactRequest>,
) -> Result<Json<Answer>, ApiError> {
    let answer = db::answers::react(&state.db, answer_id, &req.reaction)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Answer not found: {}", answer_id)))?;

    state.events.emit(QaEvent::ReactionUpdated {
        answer_id: answer.id,
        reactions: answer.reactions.clone(),
        reaction: req.reaction,
        timestamp: time::now(),
    });

    Ok(Json(answer))
}

/// PATCH /answers/:id/status - Moderation status overwrite for answers
pub async fn set_answer_status(
    State(state): State<AppState>,
    Path(answer_id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Answer>, ApiError> {
    let status = req.status.parse()?;
    let answer = db::answers::set_status(&state.db, answer_id, status).await?;
    Ok(Json(answer))
}
