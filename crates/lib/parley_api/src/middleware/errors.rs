//! Error middleware: unmatched routes, panics and error body rendering.

use std::any::Any;

use axum::{
    Json,
    extract::{OriginalUri, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::config::Environment;
use crate::error::{AppError, ErrorReport};
use crate::models::ErrorResponse;

/// Router fallback: every unmatched route is a 404 naming the requested path.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(format!("Not Found - {uri}"))
}

/// `CatchPanicLayer` handler: a panicking handler becomes a 500.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "request handler panicked");

    AppError::Internal {
        message: "Internal server error".into(),
        source: Some(detail.into()),
    }
    .into_response()
}

/// Axum middleware: re-renders error responses as `{message, stack}`,
/// including the trace only outside production.
pub async fn error_handler(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    match response.extensions().get::<ErrorReport>() {
        Some(report) => render_error(response.status(), report, environment),
        None => response,
    }
}

/// Build the JSON error body for `report`.
pub fn render_error(status: StatusCode, report: &ErrorReport, environment: Environment) -> Response {
    let stack = if environment.is_production() {
        None
    } else {
        Some(report.trace.clone())
    };
    let body = Json(ErrorResponse {
        message: report.message.clone(),
        stack,
    });
    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http, routing::get};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    fn app(environment: Environment) -> Router {
        Router::new()
            .route("/boom", get(boom))
            .route(
                "/teapot",
                get(|| async {
                    AppError::Status {
                        code: 700,
                        message: "no such status".into(),
                    }
                }),
            )
            .fallback(not_found)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(axum::middleware::from_fn_with_state(
                environment,
                error_handler,
            ))
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, ErrorResponse) {
        let req = http::Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.expect("request");
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("parse JSON"))
    }

    #[tokio::test]
    async fn unmatched_route_names_the_path() {
        let (status, body) = send(app(Environment::Development), "/nowhere?x=1").await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("Not Found - /nowhere?x=1", body.message);
        assert!(body.stack.is_some());
    }

    #[tokio::test]
    async fn production_suppresses_trace() {
        let (status, body) = send(app(Environment::Production), "/nowhere").await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert!(body.stack.is_none());
    }

    #[tokio::test]
    async fn panic_becomes_internal_error() {
        let (status, body) = send(app(Environment::Development), "/boom").await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
        assert_eq!("Internal server error", body.message);
        let stack = body.stack.expect("trace outside production");
        assert!(stack.iter().any(|line| line.contains("kaboom")));

        let (_, body) = send(app(Environment::Production), "/boom").await;
        assert!(body.stack.is_none());
    }

    #[tokio::test]
    async fn invalid_attached_status_is_clamped() {
        let (status, body) = send(app(Environment::Development), "/teapot").await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
        assert_eq!("no such status", body.message);
    }

    #[test]
    fn render_error_keeps_status() {
        let report = ErrorReport {
            message: "m".into(),
            trace: vec!["t".into()],
        };
        let resp = render_error(StatusCode::BAD_REQUEST, &report, Environment::Production);
        assert_eq!(StatusCode::BAD_REQUEST, resp.status());
    }
}
