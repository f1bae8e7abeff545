use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::core::error::method_not_allowed;
use crate::features::files::dtos::MAX_MULTIPART_SIZE;
use crate::features::files::handlers::{upload_file, FileState};
use crate::modules::storage::ObjectStorage;

/// Create routes for the files feature
pub fn routes(storage: Option<Arc<dyn ObjectStorage>>) -> Router {
    Router::new()
        .route(
            "/upload-file",
            post(upload_file)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(MAX_MULTIPART_SIZE)),
        )
        .with_state(FileState { storage })
}
