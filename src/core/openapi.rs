use axum::Json;
use utoipa::OpenApi;

use crate::features::documents::handlers as documents_handlers;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storage Relay API",
        description = "Relays file uploads to object storage and JSON documents to a document store"
    ),
    paths(
        // Files
        files_handlers::upload_file,
        // Documents
        documents_handlers::save_json,
    ),
    components(schemas(files_dtos::UploadFileDto, files_dtos::UploadResponseDto)),
    tags(
        (name = "files", description = "Object storage uploads"),
        (name = "documents", description = "Document store writes")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
