use base64::prelude::*;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, StatusCode, Url};

use super::DocumentStoreError;
use crate::core::config::DocumentStoreConfig;

/// Raw reply from the document store
#[derive(Debug, Clone)]
pub struct DocumentStoreResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Vec<u8>,
}

/// Client for the Cloudant/CouchDB document REST API
pub struct DocumentStoreClient {
    http_client: Client,
    base_url: String,
    database: String,
    username: Option<String>,
    password: String,
}

impl DocumentStoreClient {
    pub fn new(config: &DocumentStoreConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            database: config.database.clone(),
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone(),
        }
    }

    /// `<base>/<database>`, the collection endpoint new documents are POSTed to
    pub fn database_url(&self) -> Result<Url, DocumentStoreError> {
        let raw = format!("{}/{}", self.base_url, self.database);
        Url::parse(&raw).map_err(|e| DocumentStoreError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Create a new document from raw JSON bytes
    ///
    /// The body is read in full whatever the status. Statuses of 300 and above
    /// come back as [`DocumentStoreError::Rejected`] with the body attached.
    pub async fn save(&self, json: Vec<u8>) -> Result<DocumentStoreResponse, DocumentStoreError> {
        let url = self.database_url()?;

        tracing::debug!("Saving document to {} ({} bytes)", url, json.len());

        let mut request = self
            .http_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(json);

        if let Some(username) = &self.username {
            request = request.header(
                header::AUTHORIZATION,
                basic_auth_header(username, &self.password),
            );
        }

        let response = request
            .send()
            .await
            .map_err(|e| DocumentStoreError::Transport(e.to_string()))?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();

        let body = response
            .bytes()
            .await
            .map_err(|e| DocumentStoreError::ReadBody {
                status,
                message: e.to_string(),
            })?
            .to_vec();

        if status.as_u16() >= 300 {
            return Err(DocumentStoreError::Rejected { status, body });
        }

        Ok(DocumentStoreResponse {
            status,
            content_type,
            body,
        })
    }
}

/// `Basic base64(username:password)`
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", BASE64_STANDARD.encode(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str, username: Option<&str>, password: &str) -> DocumentStoreConfig {
        DocumentStoreConfig {
            url: url.to_string(),
            database: "docs".to_string(),
            username: username.map(str::to_string),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_basic_auth_header() {
        assert_eq!(basic_auth_header("user", "pass"), "Basic dXNlcjpwYXNz");
        assert_eq!(basic_auth_header("user", ""), "Basic dXNlcjo=");
    }

    #[test]
    fn test_database_url_strips_trailing_slash() {
        let client = DocumentStoreClient::new(&config("https://acct.cloudant.com/", None, ""));
        assert_eq!(
            client.database_url().unwrap().as_str(),
            "https://acct.cloudant.com/docs"
        );
    }

    #[test]
    fn test_database_url_invalid() {
        let client = DocumentStoreClient::new(&config("not a url", None, ""));
        assert!(matches!(
            client.database_url(),
            Err(DocumentStoreError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_save_returns_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/docs"))
            .and(header_eq("content-type", "application/json"))
            .and(body_bytes(br#"{"x":1}"#.to_vec()))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_raw(r#"{"id":"doc1","ok":true}"#, "application/json"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = format!("{}/", mock_server.uri());
        let client = DocumentStoreClient::new(&config(&base, None, ""));
        let response = client.save(br#"{"x":1}"#.to_vec()).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body, br#"{"id":"doc1","ok":true}"#.to_vec());
        assert_eq!(
            response.content_type.unwrap().to_str().unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_save_sends_basic_auth_when_username_set() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/docs"))
            .and(header_eq("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            DocumentStoreClient::new(&config(&mock_server.uri(), Some("user"), "pass"));
        let response = client.save(b"{}".to_vec()).await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_save_without_username_sends_no_auth() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&mock_server)
            .await;

        // Password alone does not enable auth
        let client = DocumentStoreClient::new(&config(&mock_server.uri(), None, "pass"));
        client.save(b"{}".to_vec()).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_save_rejected_keeps_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_raw(r#"{"error":"conflict"}"#, "application/json"),
            )
            .mount(&mock_server)
            .await;

        let client = DocumentStoreClient::new(&config(&mock_server.uri(), None, ""));
        let err = client.save(b"{}".to_vec()).await.unwrap_err();

        match err {
            DocumentStoreError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(body, br#"{"error":"conflict"}"#.to_vec());
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_redirect_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(304))
            .mount(&mock_server)
            .await;

        let client = DocumentStoreClient::new(&config(&mock_server.uri(), None, ""));
        let err = client.save(b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(
            err,
            DocumentStoreError::Rejected { status, .. } if status == StatusCode::NOT_MODIFIED
        ));
    }

    #[tokio::test]
    async fn test_save_connection_failure_is_transport_error() {
        // Bind then drop to get a port nobody is listening on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = DocumentStoreClient::new(&config(&format!("http://{}", addr), None, ""));
        let err = client.save(b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(err, DocumentStoreError::Transport(_)));
    }
}
