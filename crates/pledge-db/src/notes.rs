//! Note repository implementation.

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use pledge_core::{
    check_delete_parts, decode_sources, encode_sources, Error, ListNotesRequest, Note,
    NoteClassification, NoteDraft, NoteRepository, NoteScores, NoteStatus, Result,
};

/// Columns selected for every full note read, in `map_row_to_note` order.
const NOTE_COLUMNS: &str = "id, promise_id, author_id, summary, content, sources, classification, \
     status, helpfulness_score, note_intercept, note_factor, helpful_count, \
     somewhat_helpful_count, not_helpful_count, created_at, updated_at, scored_at";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// =============================================================================
// ROW MAPPING
// =============================================================================

fn parse_status(raw: &str) -> Result<NoteStatus> {
    raw.parse().map_err(Error::Serialization)
}

fn parse_classification(raw: &str) -> Result<NoteClassification> {
    raw.parse().map_err(Error::Serialization)
}

/// Map a database row to a Note. `sources` degrades to empty if unreadable.
fn map_row_to_note(row: &PgRow) -> Result<Note> {
    let status: String = row.get("status");
    let classification: String = row.get("classification");
    let sources: Option<String> = row.get("sources");

    Ok(Note {
        id: row.get("id"),
        promise_id: row.get("promise_id"),
        author_id: row.get("author_id"),
        summary: row.get("summary"),
        content: row.get("content"),
        sources: decode_sources(sources.as_deref()),
        classification: parse_classification(&classification)?,
        status: parse_status(&status)?,
        helpfulness_score: row.get("helpfulness_score"),
        note_intercept: row.get("note_intercept"),
        note_factor: row.get("note_factor"),
        helpful_count: row.get("helpful_count"),
        somewhat_helpful_count: row.get("somewhat_helpful_count"),
        not_helpful_count: row.get("not_helpful_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        scored_at: row.get("scored_at"),
    })
}

fn map_rows(rows: Vec<PgRow>) -> Result<Vec<Note>> {
    rows.iter().map(map_row_to_note).collect()
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, draft: NoteDraft) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.create_tx(&mut tx, draft).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "create",
            note_id = %note.id,
            promise_id = note.promise_id,
            author_id = note.author_id,
            "Note created"
        );
        Ok(note)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        let sql = format!("SELECT {} FROM note WHERE id = $1", NOTE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;
        map_row_to_note(&row)
    }

    async fn list_by_author(&self, author_id: i64, req: ListNotesRequest) -> Result<Vec<Note>> {
        let start = Instant::now();
        let sql = format!(
            "SELECT {} FROM note
             WHERE author_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4",
            NOTE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(author_id)
            .bind(req.status.map(|s| s.as_str()))
            .bind(req.effective_limit())
            .bind(req.effective_offset())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list_by_author",
            author_id,
            result_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed notes by author"
        );
        map_rows(rows)
    }

    async fn list_by_promise(
        &self,
        promise_id: i64,
        req: ListNotesRequest,
    ) -> Result<Vec<Note>> {
        let start = Instant::now();
        let sql = format!(
            "SELECT {} FROM note
             WHERE promise_id = $1 AND ($2::text IS NULL OR status = $2)
             ORDER BY note_intercept DESC NULLS LAST, created_at DESC, id DESC
             LIMIT $3 OFFSET $4",
            NOTE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(promise_id)
            .bind(req.status.map(|s| s.as_str()))
            .bind(req.effective_limit())
            .bind(req.effective_offset())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list_by_promise",
            promise_id,
            result_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed notes by promise"
        );
        map_rows(rows)
    }

    async fn list_all_for_promise(&self, promise_id: i64) -> Result<Vec<Note>> {
        let sql = format!(
            "SELECT {} FROM note WHERE promise_id = $1 ORDER BY id",
            NOTE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(promise_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        map_rows(rows)
    }

    async fn delete(&self, id: Uuid, requester: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.delete_tx(&mut tx, id, requester).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "notes",
            op = "delete",
            note_id = %id,
            author_id = requester,
            "Note deleted"
        );
        Ok(())
    }

    async fn apply_scores(&self, id: Uuid, scores: NoteScores) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let note = self.apply_scores_tx(&mut tx, id, scores).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "apply_scores",
            note_id = %id,
            status = %note.status,
            "Scores applied"
        );
        Ok(note)
    }

    async fn classification_counts(
        &self,
        promise_id: i64,
    ) -> Result<BTreeMap<NoteClassification, i64>> {
        let rows = sqlx::query(
            "SELECT classification, COUNT(id) AS count
             FROM note
             WHERE promise_id = $1 AND status = $2
             GROUP BY classification",
        )
        .bind(promise_id)
        .bind(NoteStatus::CurrentlyRatedHelpful.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let classification: String = row.get("classification");
            counts.insert(parse_classification(&classification)?, row.get("count"));
        }
        Ok(counts)
    }
}

// =============================================================================
// TRANSACTION-AWARE VARIANTS
// =============================================================================

/// Transaction-aware variants.
///
/// These accept an existing transaction so several note operations can be
/// composed into one unit of work.
impl PgNoteRepository {
    /// Insert a note within an existing transaction.
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        draft: NoteDraft,
    ) -> Result<Note> {
        draft.validate()?;

        let note = Note::from_draft(Uuid::now_v7(), draft, Utc::now());
        let sources = encode_sources(&note.sources)?;

        sqlx::query(
            "INSERT INTO note (id, promise_id, author_id, summary, content, sources,
                               classification, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
        )
        .bind(note.id)
        .bind(note.promise_id)
        .bind(note.author_id)
        .bind(&note.summary)
        .bind(&note.content)
        .bind(&sources)
        .bind(note.classification.as_str())
        .bind(note.status.as_str())
        .bind(note.created_at)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(note)
    }

    /// Guarded delete within an existing transaction.
    ///
    /// The row lock taken here blocks a concurrent score write-back until the
    /// transaction ends, so the status checked is the status deleted.
    pub async fn delete_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        requester: i64,
    ) -> Result<()> {
        let row = sqlx::query("SELECT author_id, status FROM note WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;

        let status: String = row.get("status");
        check_delete_parts(id, row.get("author_id"), parse_status(&status)?, requester)?;

        sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Apply scorer output within an existing transaction.
    pub async fn apply_scores_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        scores: NoteScores,
    ) -> Result<Note> {
        scores.validate()?;

        let now = Utc::now();
        let tallies = scores.tallies;
        let sql = format!(
            "UPDATE note SET
                status = $2,
                helpfulness_score = $3,
                note_intercept = $4,
                note_factor = $5,
                scored_at = $6,
                updated_at = $7,
                helpful_count = GREATEST(helpful_count, COALESCE($8, helpful_count)),
                somewhat_helpful_count = GREATEST(somewhat_helpful_count, COALESCE($9, somewhat_helpful_count)),
                not_helpful_count = GREATEST(not_helpful_count, COALESCE($10, not_helpful_count))
             WHERE id = $1
             RETURNING {}",
            NOTE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(scores.status.as_str())
            .bind(scores.helpfulness_score)
            .bind(scores.note_intercept)
            .bind(scores.note_factor)
            .bind(scores.scored_at.unwrap_or(now))
            .bind(now)
            .bind(tallies.map(|t| t.helpful))
            .bind(tallies.map(|t| t.somewhat_helpful))
            .bind(tallies.map(|t| t.not_helpful))
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;
        map_row_to_note(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_errors_are_serialization() {
        assert_eq!(
            parse_status("currently_rated_helpful").unwrap(),
            NoteStatus::CurrentlyRatedHelpful
        );
        assert!(matches!(
            parse_status("archived"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_parse_classification() {
        assert_eq!(
            parse_classification("in_progress").unwrap(),
            NoteClassification::InProgress
        );
        assert!(parse_classification("").is_err());
    }

    #[test]
    fn test_note_columns_cover_every_field() {
        for column in [
            "promise_id",
            "sources",
            "note_intercept",
            "not_helpful_count",
            "scored_at",
        ] {
            assert!(NOTE_COLUMNS.contains(column), "missing {}", column);
        }
        assert_eq!(NOTE_COLUMNS.split(',').count(), 17);
    }
}
