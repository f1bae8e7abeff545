use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, FromRequest, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::modules::document_store::{DocumentStoreClient, DocumentStoreError};

/// Shared state for the document route
#[derive(Clone)]
pub struct DocumentState {
    /// `None` when the document store is not configured
    pub client: Option<Arc<DocumentStoreClient>>,
}

/// Save a JSON document
///
/// The body is forwarded as-is; on success the document store's status code
/// and body are relayed verbatim.
#[utoipa::path(
    post,
    path = "/save-json",
    tag = "documents",
    request_body(
        content = serde_json::Value,
        content_type = "application/json",
        description = "Opaque JSON document",
    ),
    responses(
        (status = 201, description = "Document store reply, relayed verbatim", body = serde_json::Value),
        (status = 400, description = "Request body could not be read", content_type = "text/plain"),
        (status = 405, description = "Method not allowed", content_type = "text/plain"),
        (status = 413, description = "Body exceeds MAX_REQUEST_BODY_SIZE", content_type = "text/plain"),
        (status = 500, description = "Document store not configured, unreachable or rejected the document", content_type = "text/plain")
    )
)]
pub async fn save_json(State(state): State<DocumentState>, request: Request) -> Result<Response> {
    let client = state
        .client
        .clone()
        .ok_or(AppError::ConfigurationMissing("document store"))?;

    let body = Bytes::from_request(request, &()).await.map_err(body_error)?;

    debug!("Forwarding {} byte JSON document", body.len());

    let saved = client.save(body.to_vec()).await.inspect_err(|e| {
        if let DocumentStoreError::Rejected { status, body } = e {
            warn!(
                "Document store rejected document with {}: {}",
                status,
                String::from_utf8_lossy(body)
            );
        }
    })?;

    let content_type = saved
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Ok((saved.status, [(header::CONTENT_TYPE, content_type)], saved.body).into_response())
}

fn body_error(rejection: BytesRejection) -> AppError {
    let message = format!("read body: {}", rejection.body_text());
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::DocumentStoreConfig;
    use crate::features::documents::routes;
    use crate::modules::document_store::DocumentStoreClient;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(mock_server: &MockServer) -> TestServer {
        let client = DocumentStoreClient::new(&DocumentStoreConfig {
            url: mock_server.uri(),
            database: "docs".to_string(),
            username: None,
            password: String::new(),
        });
        TestServer::new(routes(Some(Arc::new(client)), 1024 * 1024)).unwrap()
    }

    #[tokio::test]
    async fn test_save_json_relays_created_document() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/docs"))
            .and(body_json(json!({"x": 1})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_raw(r#"{"id":"doc1","ok":true}"#, "application/json"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server);
        let response = server.post("/save-json").json(&json!({"x": 1})).await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.text(), r#"{"id":"doc1","ok":true}"#);
        assert_eq!(response.header("content-type"), "application/json");
    }

    #[tokio::test]
    async fn test_save_json_relays_other_success_statuses() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_string("accepted"))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server);
        let response = server.post("/save-json").text("{}").await;

        response.assert_status(StatusCode::ACCEPTED);
        assert_eq!(response.text(), "accepted");
    }

    #[tokio::test]
    async fn test_save_json_conflict_becomes_server_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_raw(r#"{"error":"conflict"}"#, "application/json"),
            )
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server);
        let response = server.post("/save-json").json(&json!({"x": 1})).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let text = response.text();
        assert!(text.contains("409"));
        assert!(!text.contains(r#"{"error":"conflict"}"#));
    }

    #[tokio::test]
    async fn test_save_json_without_configuration() {
        let server = TestServer::new(routes(None, 1024)).unwrap();

        let response = server.post("/save-json").json(&json!({"x": 1})).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text(), "document store configuration not set");
    }

    #[tokio::test]
    async fn test_save_json_oversized_body_is_payload_too_large() {
        let mock_server = MockServer::start().await;
        let client = DocumentStoreClient::new(&DocumentStoreConfig {
            url: mock_server.uri(),
            database: "docs".to_string(),
            username: None,
            password: String::new(),
        });
        let server = TestServer::new(routes(Some(Arc::new(client)), 4)).unwrap();

        let response = server.post("/save-json").text(r#"{"too":"long"}"#).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_json_rejects_other_methods() {
        let server = TestServer::new(routes(None, 1024)).unwrap();

        let response = server.get("/save-json").await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.text(), "method not allowed");
    }
}
