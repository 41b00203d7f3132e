//! Translation of service errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::domain::BoardError;

/// Status code for an error returned by a board operation
pub fn status_for(e: &anyhow::Error) -> StatusCode {
    match e.downcast_ref::<BoardError>() {
        Some(BoardError::UserNotFound(_))
        | Some(BoardError::TaskNotFound { .. })
        | Some(BoardError::LibraryTaskNotFound(_))
        | Some(BoardError::RuleNotFound(_))
        | Some(BoardError::TemplateNotFound(_))
        | Some(BoardError::WeekNotFound(_)) => StatusCode::NOT_FOUND,
        Some(BoardError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(BoardError::DuplicateName(_)) => StatusCode::CONFLICT,
        Some(BoardError::ConfirmationRequired) => StatusCode::PRECONDITION_REQUIRED,
        Some(BoardError::NothingToUndo) => StatusCode::GONE,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(action: &str, e: anyhow::Error) -> Response {
    let status = status_for(&e);
    if status.is_server_error() {
        error!("Failed to {}: {:#}", action, e);
        (status, format!("Failed to {}", action)).into_response()
    } else {
        warn!("Rejected {}: {}", action, e);
        (status, e.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&BoardError::UserNotFound("user::1".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&BoardError::validation("Name must not be empty").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&BoardError::DuplicateName("Maja".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(status_for(&BoardError::NothingToUndo.into()), StatusCode::GONE);
        assert_eq!(status_for(&anyhow!("disk full")), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_context_keeps_board_error() {
        let e = anyhow::Error::from(BoardError::ConfirmationRequired).context("import");
        assert_eq!(status_for(&e), StatusCode::PRECONDITION_REQUIRED);
    }
}
