// src/error/middleware.rs

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{ErrorClassifier, Failure, RaisedFailure};

/// What the classifier needs to know about the request that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub accepts_json: bool,
    pub path_is_api: bool,
}

impl RequestContext {
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let path = uri.path();
        let path_is_api = path == "/api" || path.starts_with("/api/");

        let wants_json_type = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .and_then(|accept| accept.split(',').next())
            .map(|first| {
                let media = first.split(';').next().unwrap_or_default().trim();
                media.contains("/json") || media.contains("+json")
            })
            .unwrap_or(false);
        let is_xhr = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        Self { accepts_json: wants_json_type || is_xhr, path_is_api }
    }

    pub fn wants_json(&self) -> bool {
        self.accepts_json || self.path_is_api
    }
}

/// Replaces any response carrying a [`RaisedFailure`] with its classified
/// rendering. Error statuses produced by the framework itself (405 and the
/// like) are classified as plain HTTP failures. Non-JSON requests get a bare
/// status page.
pub async fn render_failures(
    State(classifier): State<Arc<ErrorClassifier>>,
    request: Request,
    next: Next,
) -> Response {
    let context = RequestContext::from_parts(request.uri(), request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    let raised = response
        .extensions()
        .get::<RaisedFailure>()
        .map(|RaisedFailure(failure)| Arc::clone(failure));
    let failure = match raised {
        Some(failure) => failure,
        None if is_error(response.status()) => Arc::new(Failure::http(
            response.status(),
            response.status().canonical_reason().unwrap_or("Error"),
        )),
        None => return response,
    };
    // 405 must keep advertising the allowed methods
    let allow = response.headers().get(header::ALLOW).cloned();

    let status = failure.status();
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), error = %failure, "request failed");
    } else {
        tracing::debug!(%method, %path, status = status.as_u16(), error = %failure, "request rejected");
    }

    let mut rendered = match classifier.classify(&failure, &context) {
        Some(rendered) => rendered.into_response(),
        None => (status, status.canonical_reason().unwrap_or("Error")).into_response(),
    };
    if let Some(allow) = allow {
        rendered.headers_mut().insert(header::ALLOW, allow);
    }
    rendered
}

fn is_error(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

/// Unknown routes.
pub async fn route_not_found() -> Failure {
    Failure::http(StatusCode::NOT_FOUND, "Not Found")
}

/// Panic payloads from `CatchPanicLayer` become unclassified failures. Pair
/// with [`super::trace::install_panic_hook`] to report where the panic
/// happened.
pub fn panic_to_failure(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    Failure::panicked(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::trace::install_panic_hook;
    use axum::{
        body::{to_bytes, Body},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use std::sync::atomic::{AtomicU32, Ordering};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    fn context(path: &str, accept: Option<&str>) -> RequestContext {
        let uri: Uri = path.parse().unwrap();
        let mut headers = HeaderMap::new();
        if let Some(accept) = accept {
            headers.insert(header::ACCEPT, accept.parse().unwrap());
        }
        RequestContext::from_parts(&uri, &headers)
    }

    #[test]
    fn api_paths_are_detected() {
        assert!(context("/api", None).path_is_api);
        assert!(context("/api/classes?x=1", None).path_is_api);
        assert!(!context("/apiary", None).path_is_api);
        assert!(!context("/health", None).path_is_api);
    }

    #[test]
    fn accept_header_is_negotiated() {
        assert!(context("/", Some("application/json")).accepts_json);
        assert!(context("/", Some("application/problem+json; charset=utf-8")).accepts_json);
        assert!(!context("/", Some("text/html,application/json")).accepts_json);
        assert!(!context("/", None).accepts_json);
    }

    #[test]
    fn xhr_requests_want_json() {
        let uri: Uri = "/".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", "XMLHttpRequest".parse().unwrap());
        assert!(RequestContext::from_parts(&uri, &headers).accepts_json);
    }

    async fn broken() -> Result<&'static str, Failure> {
        Err(Failure::invalid_field("email", "required"))
    }

    static PANIC_LINE: AtomicU32 = AtomicU32::new(0);

    async fn panicking() -> &'static str {
        PANIC_LINE.store(line!() + 1, Ordering::SeqCst);
        panic!("kaboom")
    }

    fn app(diagnostic: bool) -> Router {
        let classifier = Arc::new(ErrorClassifier::new(diagnostic));
        Router::new()
            .route("/api/broken", get(broken))
            .route("/broken", get(broken))
            .route("/api/panic", get(panicking))
            .route("/ok", get(|| async { "fine" }))
            .fallback(route_not_found)
            .layer(CatchPanicLayer::custom(panic_to_failure))
            .layer(from_fn_with_state(classifier, render_failures))
    }

    async fn send(app: Router, uri: &str, accept: Option<&str>) -> (StatusCode, String) {
        send_with(app, "GET", uri, accept).await.0
    }

    async fn send_with(
        app: Router,
        method: &str,
        uri: &str,
        accept: Option<&str>,
    ) -> ((StatusCode, String), HeaderMap) {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        ((status, String::from_utf8(bytes.to_vec()).unwrap()), headers)
    }

    #[tokio::test]
    async fn api_failures_render_as_json() {
        let (status, body) = send(app(false), "/api/broken", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["errors"]["email"], serde_json::json!(["required"]));
    }

    #[tokio::test]
    async fn browser_failures_render_plain_status() {
        let (status, body) = send(app(true), "/broken", Some("text/html")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, "Unprocessable Entity");
    }

    #[tokio::test]
    async fn json_accept_outside_api_renders_json() {
        let (status, body) = send(app(false), "/broken", Some("application/json")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.starts_with(r#"{"message":"Validation failed""#));
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let (status, body) = send(app(false), "/api/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"message":"Not Found"}"#);

        let (status, body) = send(app(false), "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not Found");
    }

    #[tokio::test]
    async fn panics_become_server_errors() {
        let (status, body) = send(app(false), "/api/panic", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"message":"Server error"}"#);

        let (_, body) = send(app(true), "/api/panic", None).await;
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["message"], "kaboom");
        assert_eq!(body["exception"], "panic");
    }

    #[tokio::test]
    async fn panics_report_the_panicking_line() {
        install_panic_hook();
        let (_, body) = send(app(true), "/api/panic", None).await;
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(body["file"], file!());
        assert_eq!(body["line"], u64::from(PANIC_LINE.load(Ordering::SeqCst)));
        let trace = body["trace"].as_array().unwrap();
        assert!(trace.iter().all(|f| !f.as_str().unwrap().contains("panic_to_failure")));
    }

    #[tokio::test]
    async fn framework_errors_are_classified() {
        let ((status, body), headers) = send_with(app(false), "POST", "/api/broken", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, r#"{"message":"Method Not Allowed"}"#);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(headers.contains_key(header::ALLOW));

        let ((status, body), _) = send_with(app(false), "POST", "/ok", Some("text/html")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "Method Not Allowed");
    }

    #[tokio::test]
    async fn successful_responses_pass_through() {
        let (status, body) = send(app(false), "/ok", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "fine");
    }
}
