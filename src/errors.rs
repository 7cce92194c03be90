use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::api::envelope::codes;

/// One invalid field in a request, addressed the way the client sent it
/// (`body.name`, `params.id`, `query._sort`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Failures the domain itself defines, as opposed to infrastructure
/// problems. Callers match on these instead of parsing error strings.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Player with id {0} not found")]
    PlayerNotFound(Uuid),
    #[error("Game with id {0} not found")]
    GameNotFound(Uuid),
    #[error("Game with id {0} is closed and can no longer change")]
    GameClosed(Uuid),
    #[error("Game with id {0} already has the maximum number of players")]
    GameFull(Uuid),
    #[error("Player {player} is not a participant of game {game}")]
    WinnerNotParticipant { game: Uuid, player: Uuid },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Boundary error, rendered as the uniform error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::PlayerNotFound(_) | DomainError::GameNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            DomainError::GameClosed(_) | DomainError::GameFull(_) => {
                ApiError::Conflict(err.to_string())
            }
            DomainError::WinnerNotParticipant { .. } => {
                ApiError::Validation(vec![FieldError::new("body.winner_ids", err.to_string())])
            }
            DomainError::Internal(err) => ApiError::Internal(err),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Serialize)]
struct ErrorEnvelope {
    code: u32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetail>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, error) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                codes::INVALID_DATA,
                "Request validation failed".to_string(),
                Some(ErrorDetail::Fields(fields)),
            ),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, codes::CONFLICT, message, None)
            }
            ApiError::Internal(err) => {
                log::error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    Some(ErrorDetail::Message(err.to_string())),
                )
            }
        };

        let body = ErrorEnvelope {
            code,
            message,
            error,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_not_found() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApiError::from(DomainError::PlayerNotFound(id)),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(DomainError::GameNotFound(id)),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_terminal_state_maps_to_conflict() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApiError::from(DomainError::GameClosed(id)),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(DomainError::GameFull(id)),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn test_bad_winner_maps_to_validation_on_winner_ids() {
        let err = DomainError::WinnerNotParticipant {
            game: Uuid::new_v4(),
            player: Uuid::new_v4(),
        };
        match ApiError::from(err) {
            ApiError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].path, "body.winner_ids");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
