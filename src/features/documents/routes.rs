use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::sync::Arc;

use crate::core::error::method_not_allowed;
use crate::features::documents::handlers::{save_json, DocumentState};
use crate::modules::document_store::DocumentStoreClient;

/// Create routes for the documents feature
pub fn routes(client: Option<Arc<DocumentStoreClient>>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/save-json",
            post(save_json)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(DocumentState { client })
}
