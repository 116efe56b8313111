//! Summary statistics over a promise's note set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Note, NoteClassification, NoteStatus};

/// Counts and freshness for a full note set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSetStats {
    pub total_notes: i64,
    pub helpful_notes_count: i64,
    pub needs_more_ratings_count: i64,
    /// Latest `scored_at` across the set; `None` if nothing was ever scored.
    pub last_scored_at: Option<DateTime<Utc>>,
}

/// Summarize a note set. Every note counts toward `total_notes`.
pub fn summarize(notes: &[Note]) -> NoteSetStats {
    notes.iter().fold(NoteSetStats::default(), |mut acc, note| {
        acc.total_notes += 1;
        match note.status {
            NoteStatus::CurrentlyRatedHelpful => acc.helpful_notes_count += 1,
            NoteStatus::NeedsMoreRatings => acc.needs_more_ratings_count += 1,
            NoteStatus::CurrentlyRatedNotHelpful => {}
        }
        acc.last_scored_at = match (acc.last_scored_at, note.scored_at) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        acc
    })
}

/// Count helpful notes per classification. Classifications with no helpful
/// note are omitted.
pub fn helpful_by_classification(notes: &[Note]) -> BTreeMap<NoteClassification, i64> {
    let mut counts = BTreeMap::new();
    for note in notes
        .iter()
        .filter(|n| n.status == NoteStatus::CurrentlyRatedHelpful)
    {
        *counts.entry(note.classification).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteDraft;
    use chrono::Duration;
    use uuid::Uuid;

    fn note(status: NoteStatus, classification: NoteClassification) -> Note {
        let mut n = Note::from_draft(
            Uuid::now_v7(),
            NoteDraft {
                promise_id: 1,
                author_id: 1,
                summary: "s".into(),
                content: "c".into(),
                sources: vec![],
                classification,
            },
            Utc::now(),
        );
        n.status = status;
        n
    }

    #[test]
    fn test_counts_by_status() {
        let notes = vec![
            note(NoteStatus::NeedsMoreRatings, NoteClassification::PromiseKept),
            note(NoteStatus::NeedsMoreRatings, NoteClassification::PromiseBroken),
            note(
                NoteStatus::CurrentlyRatedHelpful,
                NoteClassification::PromiseKept,
            ),
        ];
        let stats = summarize(&notes);
        assert_eq!(stats.total_notes, 3);
        assert_eq!(stats.helpful_notes_count, 1);
        assert_eq!(stats.needs_more_ratings_count, 2);
        assert_eq!(stats.last_scored_at, None);
    }

    #[test]
    fn test_not_helpful_counts_only_toward_total() {
        let notes = vec![note(
            NoteStatus::CurrentlyRatedNotHelpful,
            NoteClassification::Stalled,
        )];
        let stats = summarize(&notes);
        assert_eq!(stats.total_notes, 1);
        assert_eq!(stats.helpful_notes_count, 0);
        assert_eq!(stats.needs_more_ratings_count, 0);
    }

    #[test]
    fn test_last_scored_at_is_max_of_present_values() {
        let now = Utc::now();
        let mut a = note(NoteStatus::NeedsMoreRatings, NoteClassification::InProgress);
        a.scored_at = Some(now - Duration::hours(5));
        let mut b = note(
            NoteStatus::CurrentlyRatedHelpful,
            NoteClassification::InProgress,
        );
        b.scored_at = Some(now);
        let c = note(NoteStatus::NeedsMoreRatings, NoteClassification::InProgress);

        let stats = summarize(&[a, c, b]);
        assert_eq!(stats.last_scored_at, Some(now));
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(summarize(&[]), NoteSetStats::default());
        assert!(helpful_by_classification(&[]).is_empty());
    }

    #[test]
    fn test_classification_breakdown_excludes_non_helpful() {
        let notes = vec![
            note(
                NoteStatus::CurrentlyRatedHelpful,
                NoteClassification::PromiseKept,
            ),
            note(NoteStatus::NeedsMoreRatings, NoteClassification::PromiseBroken),
        ];
        let counts = helpful_by_classification(&notes);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(&NoteClassification::PromiseKept), Some(&1));
        assert!(!counts.contains_key(&NoteClassification::PromiseBroken));
    }

    #[test]
    fn test_classification_breakdown_counts_each_value() {
        let notes = vec![
            note(
                NoteStatus::CurrentlyRatedHelpful,
                NoteClassification::Compromise,
            ),
            note(
                NoteStatus::CurrentlyRatedHelpful,
                NoteClassification::Compromise,
            ),
            note(
                NoteStatus::CurrentlyRatedHelpful,
                NoteClassification::PromiseBroken,
            ),
            note(
                NoteStatus::CurrentlyRatedNotHelpful,
                NoteClassification::PromiseKept,
            ),
        ];
        let counts = helpful_by_classification(&notes);
        assert_eq!(counts.get(&NoteClassification::Compromise), Some(&2));
        assert_eq!(counts.get(&NoteClassification::PromiseBroken), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
