//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

/// Error returned by every handler, rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    Internal(pledge_core::Error),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
}

impl From<pledge_core::Error> for ApiError {
    fn from(err: pledge_core::Error) -> Self {
        use pledge_core::Error;

        match err {
            Error::NoteNotFound(_) => ApiError::NotFound("Note not found".to_string()),
            Error::OwnershipViolation { .. } => {
                ApiError::Forbidden("Only the author can delete this note".to_string())
            }
            Error::ProtectedState(_) => ApiError::BadRequest(
                "Cannot delete a note that has been rated helpful by the community".to_string(),
            ),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledge_core::Error;
    use uuid::Uuid;

    fn status_of(err: Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        let id = Uuid::now_v7();
        assert_eq!(status_of(Error::NoteNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::OwnershipViolation {
                note_id: id,
                requester: 2
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(Error::ProtectedState(id)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(Error::InvalidInput("summary must not be empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::Serialization("bad status".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_guard_messages() {
        let id = Uuid::now_v7();
        match ApiError::from(Error::ProtectedState(id)) {
            ApiError::BadRequest(msg) => assert!(msg.contains("rated helpful")),
            other => panic!("unexpected {:?}", other),
        }
        match ApiError::from(Error::OwnershipViolation {
            note_id: id,
            requester: 9,
        }) {
            ApiError::Forbidden(msg) => assert_eq!(msg, "Only the author can delete this note"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
