//! Unified page error handling.
//!
//! Validation, conflict and auth failures are normally recovered inside the
//! handler (flash + redirect back to the form); what escapes here renders as
//! an error page with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::views;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid credentials.")]
    Auth,
    #[error("You do not have access to this card.")]
    Forbidden,
    #[error("Page not found.")]
    NotFound,
    #[error("Something went wrong on our side.")]
    Database(#[source] sqlx::Error),
    #[error("Something went wrong on our side.")]
    Internal(String),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::Validation(_) => StatusCode::BAD_REQUEST,
            PageError::Conflict(_) => StatusCode::CONFLICT,
            PageError::Auth => StatusCode::UNAUTHORIZED,
            PageError::Forbidden => StatusCode::FORBIDDEN,
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Database(_) | PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for PageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => PageError::NotFound,
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                PageError::Conflict("Username or email already exists.".to_string())
            }
            _ => PageError::Database(err),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, views::error_page(status, &self.to_string())).into_response()
    }
}
