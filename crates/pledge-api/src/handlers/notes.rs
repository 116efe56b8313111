//! Note HTTP handlers.
//!
//! Thin adapters over [`NoteService`](crate::services::NoteService): they
//! validate query parameters, delegate, and let [`ApiError`] pick the status.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::services::SyncScoresResponse;
use crate::{ApiError, AppState};
use pledge_core::{
    defaults, ClassificationStatsResponse, ListNotesRequest, Note, NoteDraft, NoteScores,
    NoteStatus, ScoredNotesResponse,
};

/// Query parameters for note listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListNotesQuery {
    /// Exact-match status filter (e.g. `currently_rated_helpful`)
    pub status: Option<String>,
    /// Page size, 1 to 100 (default 50)
    pub limit: Option<i64>,
    /// Records to skip (default 0)
    pub offset: Option<i64>,
}

impl ListNotesQuery {
    /// Validate and convert into a repository request.
    pub fn into_request(self) -> Result<ListNotesRequest, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<NoteStatus>)
            .transpose()
            .map_err(ApiError::BadRequest)?;

        if let Some(limit) = self.limit {
            if limit < 1 || limit > defaults::PAGE_LIMIT_MAX {
                return Err(ApiError::BadRequest(format!(
                    "limit must be between 1 and {}",
                    defaults::PAGE_LIMIT_MAX
                )));
            }
        }
        if matches!(self.offset, Some(offset) if offset < 0) {
            return Err(ApiError::BadRequest("offset must be >= 0".to_string()));
        }

        Ok(ListNotesRequest {
            status,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// Query parameters for deleting a note.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteNoteQuery {
    /// Identity of the requester; must match the note's author
    pub author_id: i64,
}

/// Query parameters for classification statistics.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassificationStatsQuery {
    pub promise_id: i64,
}

/// Create a note.
///
/// # Returns
/// - 201 Created with the stored note (status `needs_more_ratings`)
/// - 400 Bad Request if validation fails
#[utoipa::path(post, path = "/api/v1/notes", tag = "Notes",
    request_body = NoteDraft,
    responses(
        (status = 201, description = "Created", body = Note),
        (status = 400, description = "Validation failed")))]
pub async fn create_note(
    State(state): State<AppState>,
    Json(draft): Json<NoteDraft>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state.notes.create(draft).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Get a note by ID.
#[utoipa::path(get, path = "/api/v1/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note", body = Note),
        (status = 404, description = "Note not found")))]
pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.notes.get(id).await?))
}

/// List an author's notes, newest first.
#[utoipa::path(get, path = "/api/v1/notes/by-author/{author_id}", tag = "Notes",
    params(("author_id" = i64, Path, description = "Author ID"), ListNotesQuery),
    responses(
        (status = 200, description = "Notes", body = [Note]),
        (status = 400, description = "Invalid query")))]
pub async fn list_notes_by_author(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let req = query.into_request()?;
    Ok(Json(state.notes.list_by_author(author_id, req).await?))
}

/// List a promise's notes by intercept (unscored last), then newest first.
#[utoipa::path(get, path = "/api/v1/notes/promise/{promise_id}", tag = "Notes",
    params(("promise_id" = i64, Path, description = "Promise ID"), ListNotesQuery),
    responses(
        (status = 200, description = "Notes", body = [Note]),
        (status = 400, description = "Invalid query")))]
pub async fn list_notes_by_promise(
    State(state): State<AppState>,
    Path(promise_id): Path<i64>,
    Query(query): Query<ListNotesQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let req = query.into_request()?;
    Ok(Json(state.notes.list_by_promise(promise_id, req).await?))
}

/// Ranked display view of every note on a promise, with summary counts.
#[utoipa::path(get, path = "/api/v1/notes/promise/{promise_id}/scored", tag = "Notes",
    params(("promise_id" = i64, Path, description = "Promise ID")),
    responses((status = 200, description = "Ranked notes", body = ScoredNotesResponse)))]
pub async fn get_scored_notes(
    State(state): State<AppState>,
    Path(promise_id): Path<i64>,
) -> Result<Json<ScoredNotesResponse>, ApiError> {
    Ok(Json(state.notes.scored_notes(promise_id).await?))
}

/// Delete a note.
///
/// # Returns
/// - 204 No Content on success
/// - 400 Bad Request if the note has been rated helpful
/// - 403 Forbidden if the requester is not the author
/// - 404 Not Found if the note doesn't exist
#[utoipa::path(delete, path = "/api/v1/notes/{id}", tag = "Notes",
    params(("id" = Uuid, Path, description = "Note ID"), DeleteNoteQuery),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Note is protected"),
        (status = 403, description = "Requester is not the author"),
        (status = 404, description = "Note not found")))]
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteNoteQuery>,
) -> Result<StatusCode, ApiError> {
    state.notes.delete(id, query.author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Scorer write-back for one note.
#[utoipa::path(put, path = "/api/v1/notes/{id}/scores", tag = "Scoring",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = NoteScores,
    responses(
        (status = 200, description = "Updated note", body = Note),
        (status = 404, description = "Note not found")))]
pub async fn update_note_scores(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(scores): Json<NoteScores>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.notes.apply_scores(id, scores).await?))
}

/// Pull the latest scores for a promise from the scorer.
#[utoipa::path(post, path = "/api/v1/notes/promise/{promise_id}/sync-scores", tag = "Scoring",
    params(("promise_id" = i64, Path, description = "Promise ID")),
    responses((status = 200, description = "Sync report", body = SyncScoresResponse)))]
pub async fn sync_promise_scores(
    State(state): State<AppState>,
    Path(promise_id): Path<i64>,
) -> Result<Json<SyncScoresResponse>, ApiError> {
    Ok(Json(state.notes.sync_scores(promise_id).await?))
}

/// Helpful-note counts per classification for a promise.
#[utoipa::path(get, path = "/api/v1/notes/stats/by-classification", tag = "Notes",
    params(ClassificationStatsQuery),
    responses((status = 200, description = "Counts", body = ClassificationStatsResponse)))]
pub async fn classification_stats(
    State(state): State<AppState>,
    Query(query): Query<ClassificationStatsQuery>,
) -> Result<Json<ClassificationStatsResponse>, ApiError> {
    Ok(Json(state.notes.classification_stats(query.promise_id).await?))
}
