use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        // Parse origins into HeaderValue
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Method and path of an in-flight request, captured before the inner
/// service consumes the request
#[derive(Debug, Clone)]
pub struct RequestLine {
    pub method: Method,
    pub path: String,
}

impl RequestLine {
    pub fn from_request(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
        }
    }

    fn started(&self) {
        tracing::info!("{} {} started", self.method, self.path);
    }

    fn completed(&self, status: StatusCode) {
        tracing::info!(
            "{} {} completed with {}",
            self.method,
            self.path,
            status.as_u16()
        );
    }
}

/// Logs every request when it starts and the status it completed with.
///
/// The response passes through untouched.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let line = RequestLine::from_request(&request);
    line.started();

    let response = next.run(request).await;

    line.completed(response.status());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn, routing::post, Router};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_request_logging_passes_response_through() {
        async fn teapot() -> (StatusCode, &'static str) {
            (StatusCode::IM_A_TEAPOT, "short and stout")
        }

        let app = Router::new()
            .route("/brew", post(teapot))
            .layer(from_fn(request_logging));
        let server = TestServer::new(app).unwrap();

        let response = server.post("/brew").await;

        response.assert_status(StatusCode::IM_A_TEAPOT);
        assert_eq!(response.text(), "short and stout");
    }

    #[test]
    fn test_request_line_keeps_path_only() {
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/save-json?debug=1")
            .body(axum::body::Body::empty())
            .unwrap();

        let line = RequestLine::from_request(&request);
        assert_eq!(line.method, Method::POST);
        assert_eq!(line.path, "/save-json");
    }
}
