//! Error types for pledgewatch.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using pledgewatch's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pledgewatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Requester is not the author of the note they tried to mutate
    #[error("Only the author can delete this note (note {note_id}, requester {requester})")]
    OwnershipViolation { note_id: Uuid, requester: i64 },

    /// Note has been validated by the community and can no longer be deleted
    #[error("Cannot delete a note that has been rated helpful by the community: {0}")]
    ProtectedState(Uuid),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True when the addressed note does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NoteNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_note_not_found() {
        let id = Uuid::nil();
        let err = Error::NoteNotFound(id);
        assert_eq!(err.to_string(), format!("Note not found: {}", id));
    }

    #[test]
    fn test_error_display_ownership_violation() {
        let id = Uuid::nil();
        let err = Error::OwnershipViolation {
            note_id: id,
            requester: 42,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Only the author can delete this note"));
        assert!(msg.contains("requester 42"));
    }

    #[test]
    fn test_error_display_protected_state() {
        let id = Uuid::new_v4();
        let err = Error::ProtectedState(id);
        assert!(err.to_string().contains("rated helpful by the community"));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("summary must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid input: summary must not be empty");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NoteNotFound(Uuid::nil()).is_not_found());
        assert!(!Error::ProtectedState(Uuid::nil()).is_not_found());
        assert!(!Error::InvalidInput("limit".into()).is_not_found());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
