//! Application error types.

use std::error::Error as StdError;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Application-level errors with HTTP status mapping.
///
/// The `Display` text is the message sent to clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Error carrying its own status code. Codes outside 100..=599 become 500.
    #[error("{message}")]
    Status { code: u16, message: String },

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl AppError {
    /// Internal error whose message is the underlying error's text.
    pub fn internal<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AppError::Internal {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Status code attached to this error, before clamping.
    pub fn raw_status(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::NotFound(_) => 404,
            AppError::Status { code, .. } => *code,
            AppError::Internal { .. } => 500,
        }
    }

    /// Response status: the attached code when valid, otherwise 500.
    pub fn status_code(&self) -> StatusCode {
        clamp_status(self.raw_status())
    }
}

/// Map an attached status code onto a response status.
pub fn clamp_status(code: u16) -> StatusCode {
    if !(100..=599).contains(&code) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Message and diagnostic trace of an error, attached to error responses so
/// the error middleware can re-render them.
#[derive(Clone, Debug)]
pub struct ErrorReport {
    pub message: String,
    /// The error's debug form followed by its `source()` chain.
    pub trace: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut trace = vec![format!("{err:?}")];
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            trace,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let report = ErrorReport::from_error(&self);

        // The default body never carries the trace; `error_handler` adds it
        // back outside production.
        let body = Json(ErrorResponse {
            message: report.message.clone(),
            stack: None,
        });
        let mut response = (status, body).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Not Found".into()),
            _ => AppError::internal(e),
        }
    }
}

impl From<parley_core::chats::ChatError> for AppError {
    fn from(e: parley_core::chats::ChatError) -> Self {
        use parley_core::chats::ChatError;
        match e {
            ChatError::Validation(msg) => AppError::Validation(msg),
            ChatError::ChatNotFound | ChatError::UserNotFound => AppError::NotFound(e.to_string()),
            ChatError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                AppError::Validation(rejection.body_text())
            }
            _ => AppError::Status {
                code: rejection.status().as_u16(),
                message: rejection.body_text(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::chats::ChatError;

    #[test]
    fn attached_status_is_used_when_valid() {
        let err = AppError::Status {
            code: 418,
            message: "teapot".into(),
        };
        assert_eq!(StatusCode::IM_A_TEAPOT, err.status_code());
    }

    #[test]
    fn out_of_range_status_is_forced_to_500() {
        for code in [0, 42, 99, 600, 999] {
            let err = AppError::Status {
                code,
                message: "bad code".into(),
            };
            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, err.status_code(), "code {code}");
        }
        assert_eq!(StatusCode::CONTINUE, clamp_status(100));
        assert_eq!(StatusCode::from_u16(599).unwrap(), clamp_status(599));
    }

    #[test]
    fn chat_errors_map_to_http_classes() {
        let validation = AppError::from(ChatError::Validation("nope".into()));
        assert_eq!(StatusCode::BAD_REQUEST, validation.status_code());

        let missing = AppError::from(ChatError::ChatNotFound);
        assert_eq!(StatusCode::NOT_FOUND, missing.status_code());
        assert_eq!("Chat Not Found", missing.to_string());

        let db = AppError::from(ChatError::DbError(sqlx::Error::PoolTimedOut));
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, db.status_code());
        assert_eq!(sqlx::Error::PoolTimedOut.to_string(), db.to_string());
    }

    #[test]
    fn report_trace_follows_source_chain() {
        let err = AppError::internal(sqlx::Error::PoolTimedOut);
        let report = ErrorReport::from_error(&err);

        assert_eq!(err.to_string(), report.message);
        assert_eq!(2, report.trace.len());
        assert!(report.trace[0].starts_with("Internal"));
        assert!(report.trace[1].starts_with("caused by: "));
    }

    #[test]
    fn response_body_omits_trace_by_default() {
        let response = AppError::Validation("User ID is required".into()).into_response();
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }
}
