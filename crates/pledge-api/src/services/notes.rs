//! Note service: the operations the HTTP layer exposes.
//!
//! Composes a [`NoteRepository`] with the ranker, the statistics aggregator
//! and a [`Scorer`]. Display views always work on the full note set of a
//! promise, never on a page of it.
//!
//! ## Score sync
//!
//! `sync_scores` pulls the scorer's latest output for a promise and writes it
//! back note by note. Updates for notes that no longer exist, or that belong
//! to another promise, are skipped with a warning.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use pledge_core::{
    rank_for_display, summarize, ClassificationStatsResponse, Error, ListNotesRequest, Note,
    NoteDraft, NoteRepository, NoteScores, Result, Scorer, ScoredNotesResponse,
};

/// Outcome of a score sync for one promise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SyncScoresResponse {
    pub promise_id: i64,
    /// Updates written back.
    pub applied: usize,
    /// Updates ignored because their note is gone or belongs elsewhere.
    pub skipped: usize,
    pub algorithm_version: String,
}

/// Note operations over a pluggable repository and scorer.
#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
    scorer: Arc<dyn Scorer>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>, scorer: Arc<dyn Scorer>) -> Self {
        Self { repo, scorer }
    }

    /// Version label of the scorer backing this service.
    pub fn algorithm_version(&self) -> &str {
        self.scorer.algorithm_version()
    }

    pub async fn create(&self, draft: NoteDraft) -> Result<Note> {
        self.repo.create(draft).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Note> {
        self.repo.fetch(id).await
    }

    pub async fn list_by_author(&self, author_id: i64, req: ListNotesRequest) -> Result<Vec<Note>> {
        self.repo.list_by_author(author_id, req).await
    }

    pub async fn list_by_promise(
        &self,
        promise_id: i64,
        req: ListNotesRequest,
    ) -> Result<Vec<Note>> {
        self.repo.list_by_promise(promise_id, req).await
    }

    /// Ranked display view of a promise with its summary statistics.
    pub async fn scored_notes(&self, promise_id: i64) -> Result<ScoredNotesResponse> {
        let notes = self.repo.list_all_for_promise(promise_id).await?;
        let stats = summarize(&notes);
        let notes = rank_for_display(notes);

        debug!(
            subsystem = "api",
            component = "notes",
            op = "scored_notes",
            promise_id,
            result_count = notes.len(),
            helpful = stats.helpful_notes_count,
            "Ranked notes for display"
        );

        Ok(ScoredNotesResponse {
            promise_id,
            notes,
            total_notes: stats.total_notes,
            helpful_notes_count: stats.helpful_notes_count,
            needs_more_ratings_count: stats.needs_more_ratings_count,
            last_scored_at: stats.last_scored_at,
            algorithm_version: self.algorithm_version().to_string(),
        })
    }

    pub async fn delete(&self, id: Uuid, requester: i64) -> Result<()> {
        self.repo.delete(id, requester).await
    }

    /// Scorer write-back for a single note.
    pub async fn apply_scores(&self, id: Uuid, scores: NoteScores) -> Result<Note> {
        self.repo.apply_scores(id, scores).await
    }

    /// Pull the scorer's output for a promise and write it back.
    pub async fn sync_scores(&self, promise_id: i64) -> Result<SyncScoresResponse> {
        let updates = self.scorer.fetch_scores(promise_id).await?;
        let mut applied = 0;
        let mut skipped = 0;

        for update in updates {
            let note = match self.repo.fetch(update.note_id).await {
                Ok(note) => note,
                Err(e) if e.is_not_found() => {
                    warn!(
                        subsystem = "api",
                        component = "notes",
                        op = "sync_scores",
                        note_id = %update.note_id,
                        promise_id,
                        "Skipping score for missing note"
                    );
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if note.promise_id != promise_id {
                warn!(
                    subsystem = "api",
                    component = "notes",
                    op = "sync_scores",
                    note_id = %update.note_id,
                    promise_id,
                    note_promise_id = note.promise_id,
                    "Skipping score for note on another promise"
                );
                skipped += 1;
                continue;
            }

            match self.repo.apply_scores(update.note_id, update.scores).await {
                Ok(_) => applied += 1,
                // Deleted between fetch and write-back.
                Err(Error::NoteNotFound(_)) => skipped += 1,
                Err(Error::InvalidInput(reason)) => {
                    warn!(
                        subsystem = "api",
                        component = "notes",
                        op = "sync_scores",
                        note_id = %update.note_id,
                        promise_id,
                        reason = %reason,
                        "Skipping invalid score"
                    );
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            subsystem = "api",
            component = "notes",
            op = "sync_scores",
            promise_id,
            applied,
            skipped,
            "Score sync finished"
        );

        Ok(SyncScoresResponse {
            promise_id,
            applied,
            skipped,
            algorithm_version: self.algorithm_version().to_string(),
        })
    }

    /// Helpful-note counts per classification.
    pub async fn classification_stats(&self, promise_id: i64) -> Result<ClassificationStatsResponse> {
        let classifications = self.repo.classification_counts(promise_id).await?;
        Ok(ClassificationStatsResponse {
            promise_id,
            classifications,
        })
    }
}
