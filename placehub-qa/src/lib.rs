//! placehub-qa library - anonymous Q&A service
//!
//! Session-scoped anonymous questions and answers with reaction counters,
//! pushed to every connected client over a shared WebSocket channel, plus a
//! background sweep that archives aged questions.

use axum::{
    routing::{get, patch, post},
    Router,
};
use placehub_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod archiver;
pub mod db;

/// Events buffered per subscriber before a slow client starts lagging
const EVENT_BUS_CAPACITY: usize = 100;

/// Application state shared across HTTP handlers and the realtime hub
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event broadcaster feeding every open realtime connection
    pub events: Arc<EventBus>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            events: Arc::new(EventBus::new(EVENT_BUS_CAPACITY)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(api::handlers::health))
        // Session registry
        .route("/sessions/init", post(api::handlers::init_session))
        .route(
            "/sessions/:session_id/stats",
            get(api::handlers::get_session_stats),
        )
        // Questions
        .route(
            "/questions",
            post(api::handlers::create_question).get(api::handlers::list_questions),
        )
        .route("/questions/:id", get(api::handlers::get_question))
        .route(
            "/questions/:id/status",
            patch(api::handlers::set_question_status),
        )
        // Answers (GET takes a question id, the others an answer id)
        .route("/answers", post(api::handlers::create_answer))
        .route("/answers/:id", get(api::handlers::list_answers))
        .route("/answers/:id/react", post(api::handlers::react_to_answer))
        .route("/answers/:id/status", patch(api::handlers::set_answer_status))
        // Realtime channel
        .route("/live", get(api::live::live_stream))
        .with_state(state)
        // Enable CORS for the SPA front end
        .layer(CorsLayer::permissive())
}
