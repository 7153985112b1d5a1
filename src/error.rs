// src/error.rs

use thiserror::Error;

use crate::validation::ValidationReport;

/// Errors surfaced by the quiz authoring and grading core.
///
/// `Validation`, `NotFound` and `Forbidden` are raised before any write is
/// attempted. `Persistence` means a transaction was rolled back.
#[derive(Debug, Error)]
pub enum QuizError {
    // 400 Bad Request
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    // 404 Not Found
    #[error("Not found: {0}")]
    NotFound(String),

    // 403 Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // 500 Internal Server Error
    #[error("Internal error: {0}")]
    Persistence(String),
}

impl QuizError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            QuizError::Validation(_) => 400,
            QuizError::Forbidden(_) => 403,
            QuizError::NotFound(_) => 404,
            QuizError::Persistence(_) => 500,
        }
    }

    pub(crate) fn quiz_not_found(course_id: i64, quiz_id: i64) -> Self {
        tracing::warn!(course_id, quiz_id, "Quiz not found");
        QuizError::NotFound(format!("Quiz {} not found in course {}", quiz_id, course_id))
    }
}

/// Converts `sqlx::Error` into `QuizError::Persistence`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for QuizError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Storage error: {:?}", err);
        QuizError::Persistence(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for QuizError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        tracing::error!("Migration error: {:?}", err);
        QuizError::Persistence(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for QuizError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        tracing::error!("Transaction exceeded its time bound and was rolled back");
        QuizError::Persistence("transaction timed out".to_string())
    }
}

pub type QuizResult<T> = Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(QuizError::Validation(ValidationReport::default()).status_code(), 400);
        assert_eq!(QuizError::Forbidden("no".into()).status_code(), 403);
        assert_eq!(QuizError::NotFound("gone".into()).status_code(), 404);
        assert_eq!(QuizError::Persistence("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_sqlx_error_maps_to_persistence() {
        let err: QuizError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, QuizError::Persistence(_)));
    }
}
