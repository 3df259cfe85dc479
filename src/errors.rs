use crate::date::CanonicalDate;
use crate::models::ValidationReport;
use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by the calculation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("validation failed: {}", .0.errors.join(", "))]
    Validation(ValidationReport),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("no data found for {0} after recalculation")]
    MissingRecord(CanonicalDate),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(report) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: serde_json::to_string(&report).unwrap_or_else(|_| report.errors.join(", ")),
            },
            EngineError::InvalidDate(_) => Self::bad_request(err.to_string()),
            EngineError::MissingRecord(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: err.to_string(),
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_messages() {
        let err = EngineError::Validation(ValidationReport {
            is_valid: false,
            errors: vec!["a".into(), "b".into()],
            warnings: vec![],
        });
        assert_eq!(err.to_string(), "validation failed: a, b");
    }

    #[test]
    fn engine_errors_map_to_http_status() {
        let err: AppError = EngineError::InvalidDate("x".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: AppError = EngineError::Validation(ValidationReport::default()).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message.contains("is_valid"));
    }
}
