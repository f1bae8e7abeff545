use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{
    UploadFileDto, UploadResponseDto, FILE_FIELD, MAX_MULTIPART_SIZE, OBJECT_NAME_FIELD,
};
use crate::modules::storage::{sanitize_object_name, ObjectStorage};

/// Shared state for the upload route
#[derive(Clone)]
pub struct FileState {
    /// `None` when object storage is not configured
    pub storage: Option<Arc<dyn ObjectStorage>>,
}

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `objectName`: Destination object name (optional, defaults to the file's name)
#[utoipa::path(
    post,
    path = "/upload-file",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form with optional objectName field",
    ),
    responses(
        (status = 201, description = "File stored", body = UploadResponseDto),
        (status = 400, description = "Malformed multipart body or missing file", content_type = "text/plain"),
        (status = 405, description = "Method not allowed", content_type = "text/plain"),
        (status = 413, description = "Body exceeds the multipart size limit", content_type = "text/plain"),
        (status = 500, description = "Storage not configured or upload failed", content_type = "text/plain")
    )
)]
pub async fn upload_file(
    State(state): State<FileState>,
    request: Request,
) -> Result<(StatusCode, Json<UploadResponseDto>)> {
    // Configuration is checked before the body is touched
    let storage = state
        .storage
        .clone()
        .ok_or(AppError::ConfigurationMissing("object storage"))?;

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(format!("parse multipart: {}", e)))?;

    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut object_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("parse multipart", e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            FILE_FIELD if file_data.is_none() => {
                file_name = field.file_name().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("read file data", e))?;
                file_data = Some(data.to_vec());
            }
            OBJECT_NAME_FIELD if object_name.is_none() => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("read objectName", e))?;
                object_name = Some(text);
            }
            _ => {
                debug!("Ignoring multipart field: {}", field_name);
            }
        }
    }

    let file_data = file_data.ok_or_else(|| {
        AppError::BadRequest(format!("read file: missing '{}' field", FILE_FIELD))
    })?;

    let object_name = object_name
        .filter(|name| !name.is_empty())
        .or_else(|| file_name.as_deref().and_then(sanitize_object_name))
        .ok_or_else(|| AppError::BadRequest("object name is required".to_string()))?;

    let size = file_data.len();
    let stored = storage.upload(&object_name, file_data).await?;

    info!("Stored object '{}' ({} bytes)", stored, size);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponseDto { object: stored }),
    ))
}

fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "{}: body exceeds {} bytes",
            context, MAX_MULTIPART_SIZE
        ))
    } else {
        AppError::BadRequest(format!("{}: {}", context, err.body_text()))
    }
}
