//! Display ordering for a promise's notes.
//!
//! The primary view partitions notes into two tiers: community-validated
//! (`CurrentlyRatedHelpful`) notes first, everything else after. Within a
//! tier notes are ordered by `note_intercept` descending, with a missing
//! intercept ranked below every scored note of the same tier. Remaining ties
//! fall back to `id` ascending, which for UUIDv7 ids is creation order.
//!
//! The plain promise listing uses a different, tier-less order (intercept
//! descending with nulls last, then newest first); it is exposed here so the
//! in-memory repository sorts exactly like the SQL `ORDER BY`.

use std::cmp::Ordering;

use crate::models::{Note, NoteStatus};

/// Ranking tier: lower sorts first.
pub fn tier(status: NoteStatus) -> u8 {
    match status {
        NoteStatus::CurrentlyRatedHelpful => 0,
        NoteStatus::NeedsMoreRatings | NoteStatus::CurrentlyRatedNotHelpful => 1,
    }
}

/// Intercept usable for ordering; NaN is treated as absent.
fn intercept(note: &Note) -> Option<f64> {
    note.note_intercept.filter(|v| !v.is_nan())
}

/// Descending by intercept with absent values last.
fn cmp_intercept_desc(a: &Note, b: &Note) -> Ordering {
    match (intercept(a), intercept(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Canonical display comparator.
pub fn cmp_display(a: &Note, b: &Note) -> Ordering {
    tier(a.status)
        .cmp(&tier(b.status))
        .then_with(|| cmp_intercept_desc(a, b))
        .then_with(|| a.id.cmp(&b.id))
}

/// Order a promise's full note set for display. Pure; does not re-query.
pub fn rank_for_display(mut notes: Vec<Note>) -> Vec<Note> {
    notes.sort_by(cmp_display);
    notes
}

/// Promise listing order: intercept desc (nulls last), then newest first.
pub fn cmp_promise_listing(a: &Note, b: &Note) -> Ordering {
    cmp_intercept_desc(a, b)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Author listing order: newest first.
pub fn cmp_author_listing(a: &Note, b: &Note) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
