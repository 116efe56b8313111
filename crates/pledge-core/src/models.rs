//! Core data models for pledgewatch.
//!
//! These types are shared across all pledgewatch crates and represent
//! community notes attached to tracked promises.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// NOTE STATUS
// =============================================================================

/// Rating-driven lifecycle status of a note.
///
/// Notes start in `NeedsMoreRatings`. Only the external scoring process moves
/// a note between statuses.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    /// Not enough ratings have been collected to decide
    #[default]
    NeedsMoreRatings,
    /// Community consensus: the note is helpful
    CurrentlyRatedHelpful,
    /// Community consensus: the note is not helpful
    CurrentlyRatedNotHelpful,
}

impl NoteStatus {
    /// Helpful notes are community-validated and may no longer be deleted.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::CurrentlyRatedHelpful)
    }

    /// Database/wire string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsMoreRatings => "needs_more_ratings",
            Self::CurrentlyRatedHelpful => "currently_rated_helpful",
            Self::CurrentlyRatedNotHelpful => "currently_rated_not_helpful",
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NoteStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "needs_more_ratings" => Ok(Self::NeedsMoreRatings),
            "currently_rated_helpful" => Ok(Self::CurrentlyRatedHelpful),
            "currently_rated_not_helpful" => Ok(Self::CurrentlyRatedNotHelpful),
            _ => Err(format!("Invalid note status: {}", s)),
        }
    }
}

// =============================================================================
// NOTE CLASSIFICATION
// =============================================================================

/// The note author's judgment of where the promise stands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NoteClassification {
    PromiseKept,
    PromiseBroken,
    InProgress,
    Compromise,
    Stalled,
    NotYetRated,
}

impl NoteClassification {
    /// Database/wire string for this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PromiseKept => "promise_kept",
            Self::PromiseBroken => "promise_broken",
            Self::InProgress => "in_progress",
            Self::Compromise => "compromise",
            Self::Stalled => "stalled",
            Self::NotYetRated => "not_yet_rated",
        }
    }
}

impl std::fmt::Display for NoteClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NoteClassification {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "promise_kept" => Ok(Self::PromiseKept),
            "promise_broken" => Ok(Self::PromiseBroken),
            "in_progress" => Ok(Self::InProgress),
            "compromise" => Ok(Self::Compromise),
            "stalled" => Ok(Self::Stalled),
            "not_yet_rated" => Ok(Self::NotYetRated),
            _ => Err(format!("Invalid note classification: {}", s)),
        }
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Community fact-check note attached to a promise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub promise_id: i64,
    pub author_id: i64,
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub classification: NoteClassification,
    pub status: NoteStatus,
    /// Scored attributes, written back by the external scorer.
    pub helpfulness_score: Option<f64>,
    pub note_intercept: Option<f64>,
    pub note_factor: Option<f64>,
    /// Rating tallies, maintained by rating ingestion.
    pub helpful_count: i64,
    pub somewhat_helpful_count: i64,
    pub not_helpful_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scored_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Build a freshly created, unscored note from a validated draft.
    pub fn from_draft(id: Uuid, draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            promise_id: draft.promise_id,
            author_id: draft.author_id,
            summary: draft.summary,
            content: draft.content,
            sources: draft.sources,
            classification: draft.classification,
            status: NoteStatus::NeedsMoreRatings,
            helpfulness_score: None,
            note_intercept: None,
            note_factor: None,
            helpful_count: 0,
            somewhat_helpful_count: 0,
            not_helpful_count: 0,
            created_at: now,
            updated_at: now,
            scored_at: None,
        }
    }

    pub fn tallies(&self) -> RatingTallies {
        RatingTallies {
            helpful: self.helpful_count,
            somewhat_helpful: self.somewhat_helpful_count,
            not_helpful: self.not_helpful_count,
        }
    }

    /// Apply scorer output in place. Tallies never decrease.
    pub fn apply_scores(&mut self, scores: &NoteScores, now: DateTime<Utc>) {
        self.status = scores.status;
        self.helpfulness_score = scores.helpfulness_score;
        self.note_intercept = scores.note_intercept;
        self.note_factor = scores.note_factor;
        self.scored_at = Some(scores.scored_at.unwrap_or(now));
        if let Some(incoming) = &scores.tallies {
            let merged = self.tallies().merge(incoming);
            self.helpful_count = merged.helpful;
            self.somewhat_helpful_count = merged.somewhat_helpful;
            self.not_helpful_count = merged.not_helpful;
        }
        self.updated_at = now;
    }
}

/// Author submission for a new note.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteDraft {
    pub promise_id: i64,
    pub author_id: i64,
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub classification: NoteClassification,
}

impl NoteDraft {
    /// Reject malformed submissions before anything is written.
    pub fn validate(&self) -> Result<()> {
        if self.promise_id <= 0 {
            return Err(Error::InvalidInput("promise_id must be >= 1".into()));
        }
        if self.author_id <= 0 {
            return Err(Error::InvalidInput("author_id must be >= 1".into()));
        }
        if self.summary.trim().is_empty() {
            return Err(Error::InvalidInput("summary must not be empty".into()));
        }
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput("content must not be empty".into()));
        }
        if let Some(idx) = self.sources.iter().position(|s| s.trim().is_empty()) {
            return Err(Error::InvalidInput(format!(
                "sources[{}] must not be empty",
                idx
            )));
        }
        Ok(())
    }
}

// =============================================================================
// SCORING TYPES
// =============================================================================

/// Rating counters for a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RatingTallies {
    pub helpful: i64,
    pub somewhat_helpful: i64,
    pub not_helpful: i64,
}

impl RatingTallies {
    /// Counter-wise maximum, so a stale write can never move a tally backwards.
    pub fn merge(&self, other: &RatingTallies) -> RatingTallies {
        RatingTallies {
            helpful: self.helpful.max(other.helpful),
            somewhat_helpful: self.somewhat_helpful.max(other.somewhat_helpful),
            not_helpful: self.not_helpful.max(other.not_helpful),
        }
    }
}

/// Scored attributes produced by the external scoring algorithm for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteScores {
    pub status: NoteStatus,
    pub helpfulness_score: Option<f64>,
    pub note_intercept: Option<f64>,
    pub note_factor: Option<f64>,
    /// When the scorer ran; defaults to the write time.
    #[serde(default)]
    pub scored_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tallies: Option<RatingTallies>,
}

impl NoteScores {
    /// Scores, when present, must be finite.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("helpfulness_score", self.helpfulness_score),
            ("note_intercept", self.note_intercept),
            ("note_factor", self.note_factor),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(Error::InvalidInput(format!("{} must be finite", field)));
            }
        }
        Ok(())
    }
}

/// Scorer output addressed to a specific note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteScoreUpdate {
    pub note_id: Uuid,
    #[serde(flatten)]
    pub scores: NoteScores,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Ranked note set for a promise with summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScoredNotesResponse {
    pub promise_id: i64,
    pub notes: Vec<Note>,
    pub total_notes: i64,
    pub helpful_notes_count: i64,
    pub needs_more_ratings_count: i64,
    pub last_scored_at: Option<DateTime<Utc>>,
    pub algorithm_version: String,
}

/// Helpful-note counts per classification for a promise.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ClassificationStatsResponse {
    pub promise_id: i64,
    pub classifications: BTreeMap<NoteClassification, i64>,
}
