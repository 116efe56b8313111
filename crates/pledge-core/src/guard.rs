//! Integrity rules for mutating a note.
//!
//! Repositories call [`check_deletable`] inside the same transaction (or
//! lock scope) as the delete itself, after the existence check has already
//! succeeded.

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Note, NoteStatus};

/// Verify that `requester` may delete a note in its current state.
///
/// Fails with [`Error::OwnershipViolation`] when the requester is not the
/// author, and with [`Error::ProtectedState`] when the note has been rated
/// helpful. Either failure alone is sufficient to reject.
pub fn check_deletable(note: &Note, requester: i64) -> Result<()> {
    check_delete_parts(note.id, note.author_id, note.status, requester)
}

/// Same rules as [`check_deletable`] when only the guarded columns were
/// loaded.
pub fn check_delete_parts(
    note_id: uuid::Uuid,
    author_id: i64,
    status: NoteStatus,
    requester: i64,
) -> Result<()> {
    if author_id != requester {
        info!(
            subsystem = "core",
            component = "guard",
            note_id = %note_id,
            author_id = requester,
            "Delete rejected: requester is not the author"
        );
        return Err(Error::OwnershipViolation {
            note_id,
            requester,
        });
    }
    if status.is_protected() {
        info!(
            subsystem = "core",
            component = "guard",
            note_id = %note_id,
            status = %status,
            "Delete rejected: note is community-validated"
        );
        return Err(Error::ProtectedState(note_id));
    }
    Ok(())
}
