//! # pledge-api
//!
//! HTTP API for pledgewatch community notes.
//!
//! [`router`] assembles the routes and middleware around an [`AppState`];
//! the `pledge-api` binary wires that to configuration, storage and a TCP
//! listener.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use governor::RateLimiter;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pledge_core::{
    defaults, ClassificationStatsResponse, Note, NoteClassification, NoteDraft, NoteScoreUpdate,
    NoteScores, NoteStatus, RatingTallies, ScoredNotesResponse,
};
use pledge_db::Database;

pub use config::{ServerConfig, StorageBackend};
pub use error::ApiError;
pub use services::{NoteService, SyncScoresResponse};

use handlers::{health, notes};
use middleware::{rate_limit_middleware, MakeRequestUuidV7};

/// Global rate limiter type (direct quota, not keyed per client).
pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
    /// Database handle when running on PostgreSQL.
    pub db: Option<Database>,
    pub storage: StorageBackend,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

/// OpenAPI documentation served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pledgewatch Notes API",
        description = "Community fact-check notes on tracked promises"
    ),
    paths(
        health::health_check,
        notes::create_note,
        notes::get_note,
        notes::list_notes_by_author,
        notes::list_notes_by_promise,
        notes::get_scored_notes,
        notes::delete_note,
        notes::update_note_scores,
        notes::sync_promise_scores,
        notes::classification_stats,
    ),
    components(schemas(
        Note,
        NoteDraft,
        NoteStatus,
        NoteClassification,
        NoteScores,
        NoteScoreUpdate,
        RatingTallies,
        ScoredNotesResponse,
        ClassificationStatsResponse,
        SyncScoresResponse,
    )),
    tags(
        (name = "Notes", description = "Note lifecycle and display views"),
        (name = "Scoring", description = "Score write-back from the scoring process"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

/// Build the application router with all middleware applied.
pub fn router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/v1/notes", post(notes::create_note))
        .route(
            "/api/v1/notes/stats/by-classification",
            get(notes::classification_stats),
        )
        .route(
            "/api/v1/notes/by-author/:author_id",
            get(notes::list_notes_by_author),
        )
        .route(
            "/api/v1/notes/promise/:promise_id",
            get(notes::list_notes_by_promise),
        )
        .route(
            "/api/v1/notes/promise/:promise_id/scored",
            get(notes::get_scored_notes),
        )
        .route(
            "/api/v1/notes/promise/:promise_id/sync-scores",
            post(notes::sync_promise_scores),
        )
        .route(
            "/api/v1/notes/:id",
            get(notes::get_note).delete(notes::delete_note),
        )
        .route("/api/v1/notes/:id/scores", put(notes::update_note_scores))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(defaults::REQUEST_BODY_LIMIT))
        .with_state(state)
}
