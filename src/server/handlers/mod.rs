//! HTTP handlers for the server.

pub mod catalog;
pub mod flyer;
pub mod templates;

use axum::http::StatusCode;
use tracing::warn;
use uuid::Uuid;

use crate::error::EncarteError;

/// Handler error: status plus a message shown to the user.
pub type ApiError = (StatusCode, String);

/// Map a library error onto an HTTP status.
pub fn api_error(e: EncarteError) -> ApiError {
    let status = match &e {
        EncarteError::NoProducts | EncarteError::Validation(_) | EncarteError::Csv(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EncarteError::UnknownTemplate(_) => StatusCode::BAD_REQUEST,
        EncarteError::Image(_) => StatusCode::BAD_GATEWAY,
        EncarteError::Render(_)
        | EncarteError::Export(_)
        | EncarteError::Config(_)
        | EncarteError::Transport(_)
        | EncarteError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(error = %e, "request failed");
    }
    (status, e.to_string())
}

pub fn parse_workspace_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid workspace id '{}'", id)))
}

pub fn workspace_not_found(id: Uuid) -> ApiError {
    (StatusCode::NOT_FOUND, format!("Workspace {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(api_error(EncarteError::NoProducts).0, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            api_error(EncarteError::Validation(ValidationError::PromoNotLower)).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(api_error(EncarteError::UnknownTemplate("x".into())).0, StatusCode::BAD_REQUEST);
        assert_eq!(api_error(EncarteError::Render("x".into())).0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_message_is_user_facing() {
        let (_, message) = api_error(EncarteError::Validation(ValidationError::PromoNotLower));
        assert_eq!(message, "O preço promocional deve ser menor que o preço original");
    }
}
