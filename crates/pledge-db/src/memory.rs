//! In-process note repository.
//!
//! Holds notes in a shared map behind an async `RwLock`. Listing orders and
//! the delete guard are the same functions the SQL repository relies on, so
//! both backends answer every query identically. Used by the API's `memory`
//! storage backend and by tests that run without PostgreSQL.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use pledge_core::ranking::{cmp_author_listing, cmp_promise_listing};
use pledge_core::{
    check_deletable, decode_sources, encode_sources, helpful_by_classification, Error,
    ListNotesRequest, Note, NoteClassification, NoteDraft, NoteRepository, NoteScores, Result,
};

/// A note as held in memory. Sources stay in their encoded column form so
/// reads go through the same decoding as rows from the database.
#[derive(Debug, Clone)]
struct StoredNote {
    note: Note,
    sources: Option<String>,
}

impl StoredNote {
    fn load(&self) -> Note {
        Note {
            sources: decode_sources(self.sources.as_deref()),
            ..self.note.clone()
        }
    }
}

/// Memory-backed implementation of NoteRepository.
#[derive(Clone, Default)]
pub struct MemoryNoteRepository {
    notes: Arc<RwLock<HashMap<Uuid, StoredNote>>>,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }

    async fn select<F>(&self, keep: F) -> Vec<Note>
    where
        F: Fn(&Note) -> bool,
    {
        self.notes
            .read()
            .await
            .values()
            .filter(|stored| keep(&stored.note))
            .map(StoredNote::load)
            .collect()
    }
}

fn page(notes: Vec<Note>, req: &ListNotesRequest) -> Vec<Note> {
    notes
        .into_iter()
        .skip(req.effective_offset() as usize)
        .take(req.effective_limit() as usize)
        .collect()
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn create(&self, draft: NoteDraft) -> Result<Note> {
        draft.validate()?;

        let note = Note::from_draft(Uuid::now_v7(), draft, Utc::now());
        let sources = encode_sources(&note.sources)?;
        let stored = StoredNote {
            note: Note {
                sources: Vec::new(),
                ..note.clone()
            },
            sources: Some(sources),
        };
        self.notes.write().await.insert(note.id, stored);

        info!(
            subsystem = "db",
            component = "memory",
            op = "create",
            note_id = %note.id,
            promise_id = note.promise_id,
            author_id = note.author_id,
            "Note created"
        );
        Ok(note)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        self.notes
            .read()
            .await
            .get(&id)
            .map(StoredNote::load)
            .ok_or(Error::NoteNotFound(id))
    }

    async fn list_by_author(&self, author_id: i64, req: ListNotesRequest) -> Result<Vec<Note>> {
        let mut notes = self
            .select(|n| n.author_id == author_id && req.status.map_or(true, |s| n.status == s))
            .await;
        notes.sort_by(cmp_author_listing);
        let notes = page(notes, &req);

        debug!(
            subsystem = "db",
            component = "memory",
            op = "list_by_author",
            author_id,
            result_count = notes.len(),
            "Listed notes by author"
        );
        Ok(notes)
    }

    async fn list_by_promise(
        &self,
        promise_id: i64,
        req: ListNotesRequest,
    ) -> Result<Vec<Note>> {
        let mut notes = self
            .select(|n| n.promise_id == promise_id && req.status.map_or(true, |s| n.status == s))
            .await;
        notes.sort_by(cmp_promise_listing);
        let notes = page(notes, &req);

        debug!(
            subsystem = "db",
            component = "memory",
            op = "list_by_promise",
            promise_id,
            result_count = notes.len(),
            "Listed notes by promise"
        );
        Ok(notes)
    }

    async fn list_all_for_promise(&self, promise_id: i64) -> Result<Vec<Note>> {
        let mut notes = self.select(|n| n.promise_id == promise_id).await;
        notes.sort_by_key(|n| n.id);
        Ok(notes)
    }

    async fn delete(&self, id: Uuid, requester: i64) -> Result<()> {
        // Check and removal share one write guard.
        let mut notes = self.notes.write().await;
        let stored = notes.get(&id).ok_or(Error::NoteNotFound(id))?;
        check_deletable(&stored.note, requester)?;
        notes.remove(&id);

        info!(
            subsystem = "db",
            component = "memory",
            op = "delete",
            note_id = %id,
            author_id = requester,
            "Note deleted"
        );
        Ok(())
    }

    async fn apply_scores(&self, id: Uuid, scores: NoteScores) -> Result<Note> {
        scores.validate()?;

        let mut notes = self.notes.write().await;
        let stored = notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        stored.note.apply_scores(&scores, Utc::now());

        debug!(
            subsystem = "db",
            component = "memory",
            op = "apply_scores",
            note_id = %id,
            status = %stored.note.status,
            "Scores applied"
        );
        Ok(stored.load())
    }

    async fn classification_counts(
        &self,
        promise_id: i64,
    ) -> Result<BTreeMap<NoteClassification, i64>> {
        let notes = self.select(|n| n.promise_id == promise_id).await;
        Ok(helpful_by_classification(&notes))
    }
}
