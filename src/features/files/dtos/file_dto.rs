use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for API documentation only.
/// The actual handler reads the multipart body directly.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Destination object name; defaults to the uploaded file's name
    #[schema(example = "report.pdf")]
    pub object_name: Option<String>,
}

/// Response DTO for a stored upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    /// Key the object was stored under
    pub object: String,
}

/// Ceiling for the whole multipart body (32MB)
pub const MAX_MULTIPART_SIZE: usize = 32 * 1024 * 1024;

/// Multipart part carrying the file bytes
pub const FILE_FIELD: &str = "file";

/// Optional multipart field overriding the object name
pub const OBJECT_NAME_FIELD: &str = "objectName";
