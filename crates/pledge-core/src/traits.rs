//! Core traits for pledgewatch abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable storage backends and scorers.

use async_trait::async_trait;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::defaults;
use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY TRAITS
// =============================================================================

/// Request for a paginated note listing.
#[derive(Debug, Clone, Default)]
pub struct ListNotesRequest {
    /// Exact-match status filter.
    pub status: Option<NoteStatus>,
    /// Maximum results (defaults to 50, never more than 100).
    pub limit: Option<i64>,
    /// Pagination offset.
    pub offset: Option<i64>,
}

impl ListNotesRequest {
    /// Effective page size after applying the default and the hard cap.
    pub fn effective_limit(&self) -> i64 {
        clamp_limit(self.limit)
    }

    /// Effective offset; negative offsets read as the first page.
    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(defaults::PAGE_OFFSET).max(0)
    }
}

/// Apply the default page size and the hard upper bound.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(defaults::PAGE_LIMIT)
        .clamp(0, defaults::PAGE_LIMIT_MAX)
}

/// Repository for note storage.
///
/// Every mutating call is a single durable transaction whose result is
/// visible to the next read.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Validate and persist a draft; assigns id, timestamps and initial status.
    async fn create(&self, draft: NoteDraft) -> Result<Note>;

    /// Fetch a note by ID.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// Notes by an author, newest first.
    async fn list_by_author(&self, author_id: i64, req: ListNotesRequest) -> Result<Vec<Note>>;

    /// Notes on a promise, intercept descending (nulls last), then newest first.
    async fn list_by_promise(&self, promise_id: i64, req: ListNotesRequest)
        -> Result<Vec<Note>>;

    /// Every note on a promise, unpaginated and unordered.
    async fn list_all_for_promise(&self, promise_id: i64) -> Result<Vec<Note>>;

    /// Guarded delete: existence, ownership and protected-state checks run
    /// atomically with the delete itself.
    async fn delete(&self, id: Uuid, requester: i64) -> Result<()>;

    /// Write scorer output back onto a note.
    async fn apply_scores(&self, id: Uuid, scores: NoteScores) -> Result<Note>;

    /// Helpful-note counts per classification for a promise.
    async fn classification_counts(
        &self,
        promise_id: i64,
    ) -> Result<BTreeMap<NoteClassification, i64>>;
}

// =============================================================================
// SCORER TRAITS
// =============================================================================

/// Read-only view of the out-of-band scoring algorithm.
///
/// The core never computes scores; it only reads what the scorer has
/// published and labels responses with the scorer's version.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Version label of the model that produced the stored scores.
    fn algorithm_version(&self) -> &str;

    /// Latest published scores for a promise's notes.
    async fn fetch_scores(&self, promise_id: i64) -> Result<Vec<NoteScoreUpdate>>;
}

/// Scorer whose results arrive by push (score write-back) only.
#[derive(Debug, Clone)]
pub struct PublishedScorer {
    version: String,
}

impl PublishedScorer {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Default for PublishedScorer {
    fn default() -> Self {
        Self::new(defaults::ALGORITHM_VERSION)
    }
}

#[async_trait]
impl Scorer for PublishedScorer {
    fn algorithm_version(&self) -> &str {
        &self.version
    }

    async fn fetch_scores(&self, _promise_id: i64) -> Result<Vec<NoteScoreUpdate>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_defaults() {
        assert_eq!(clamp_limit(None), 50);
        assert_eq!(clamp_limit(Some(10)), 10);
    }

    #[test]
    fn test_clamp_limit_caps_at_max() {
        assert_eq!(clamp_limit(Some(100)), 100);
        assert_eq!(clamp_limit(Some(500)), 100);
        assert_eq!(clamp_limit(Some(i64::MAX)), 100);
    }

    #[test]
    fn test_clamp_limit_floors_negative() {
        assert_eq!(clamp_limit(Some(-5)), 0);
    }

    #[test]
    fn test_effective_offset() {
        let req = ListNotesRequest {
            offset: Some(-10),
            ..Default::default()
        };
        assert_eq!(req.effective_offset(), 0);
        assert_eq!(ListNotesRequest::default().effective_offset(), 0);
        let req = ListNotesRequest {
            offset: Some(20),
            ..Default::default()
        };
        assert_eq!(req.effective_offset(), 20);
    }

    #[tokio::test]
    async fn test_published_scorer() {
        let scorer = PublishedScorer::default();
        assert_eq!(scorer.algorithm_version(), "1.0.0");
        assert!(scorer.fetch_scores(1).await.unwrap().is_empty());

        let custom = PublishedScorer::new("2.1.0-bridging");
        assert_eq!(custom.algorithm_version(), "2.1.0-bridging");
    }
}
