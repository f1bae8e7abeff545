use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::modules::document_store::DocumentStoreError;
use crate::modules::storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} configuration not set")]
    ConfigurationMissing(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("upload failed: {0}")]
    Storage(#[source] StorageError),

    #[error("document store save failed: {0}")]
    DocumentStore(#[from] DocumentStoreError),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            // A bad name is the caller's fault, not the remote's
            StorageError::InvalidObjectName(name) => {
                AppError::BadRequest(format!("invalid object name: '{}'", name))
            }
            other => AppError::Storage(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::ConfigurationMissing(_)
            | AppError::Storage(_)
            | AppError::DocumentStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{}", message);
        } else {
            tracing::debug!("Rejected request: {}", message);
        }

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Method fallback for POST-only routes
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
