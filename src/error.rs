//! Error types for Bibliotheca server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    BadValue = 5,
    Duplicate = 6,
    InventoryViolation = 7,
    NoAvailableCopies = 8,
    NoInventoryRecord = 9,
    DuplicateActiveLoan = 10,
    LoanAlreadyReturned = 11,
    NoSuchLoan = 12,
}

/// Violations of the per (book, branch) stock counters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Cannot have negative total copies (total {total}, change {delta})")]
    NegativeTotal { total: i32, delta: i32 },

    #[error("Copy counts cannot be negative")]
    NegativeCount,

    #[error("Copy count out of range (current {current}, change {delta})")]
    CountOverflow { current: i32, delta: i32 },

    #[error("Available copies ({available}) cannot exceed total copies ({total})")]
    AvailableExceedsTotal { available: i32, total: i32 },

    #[error("No available copies of this book in the selected branch")]
    NoAvailableCopies,

    #[error("Book {book_id} is not stocked at branch {branch_id}")]
    RecordMissing { book_id: i32, branch_id: i32 },
}

/// Loan lifecycle violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoanError {
    #[error("Student already has an active loan for this book")]
    DuplicateActiveLoan,

    #[error("Loan is already returned")]
    AlreadyReturned,

    #[error("Loan with id {0} not found")]
    NotFound(i32),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Loan error: {0}")]
    Loan(#[from] LoanError),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// HTTP status and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
            AppError::Inventory(e) => match e {
                InventoryError::NoAvailableCopies => {
                    (StatusCode::CONFLICT, ErrorCode::NoAvailableCopies)
                }
                InventoryError::RecordMissing { .. } => {
                    (StatusCode::CONFLICT, ErrorCode::NoInventoryRecord)
                }
                InventoryError::NegativeTotal { .. }
                | InventoryError::NegativeCount
                | InventoryError::CountOverflow { .. }
                | InventoryError::AvailableExceedsTotal { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InventoryViolation)
                }
            },
            AppError::Loan(e) => match e {
                LoanError::DuplicateActiveLoan => {
                    (StatusCode::CONFLICT, ErrorCode::DuplicateActiveLoan)
                }
                LoanError::AlreadyReturned => {
                    (StatusCode::CONFLICT, ErrorCode::LoanAlreadyReturned)
                }
                LoanError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchLoan),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Inventory(e) => e.to_string(),
            AppError::Loan(e) => e.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Map constraint violations of a write to user-facing errors.
///
/// `what` names the record being written, e.g. "Branch".
pub fn map_constraint_error(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return AppError::Conflict(format!("{} already exists", what));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return AppError::Validation(format!(
                    "{} references a missing record or is still referenced",
                    what
                ));
            }
            _ => {}
        }
    }
    AppError::Database(err)
}

/// True when `err` is a unique violation on the named index or constraint
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_status_codes() {
        let err = AppError::from(InventoryError::NoAvailableCopies);
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);

        let err = AppError::from(InventoryError::NegativeTotal { total: 2, delta: -3 });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InventoryViolation)
        );

        let err = AppError::from(InventoryError::CountOverflow { current: 5, delta: i32::MAX });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InventoryViolation)
        );
    }

    #[test]
    fn test_loan_status_codes() {
        assert_eq!(
            AppError::from(LoanError::DuplicateActiveLoan).status_and_code(),
            (StatusCode::CONFLICT, ErrorCode::DuplicateActiveLoan)
        );
        assert_eq!(
            AppError::from(LoanError::AlreadyReturned).status_and_code().0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(LoanError::NotFound(7)).status_and_code().0,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = AppError::Validation("Book is not stocked at this branch".to_string());
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LoanError::NotFound(42).to_string(),
            "Loan with id 42 not found"
        );
        assert_eq!(
            InventoryError::AvailableExceedsTotal { available: 3, total: 2 }.to_string(),
            "Available copies (3) cannot exceed total copies (2)"
        );
    }

    #[test]
    fn test_non_database_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound, "any"));
        assert!(matches!(
            map_constraint_error(sqlx::Error::RowNotFound, "Branch"),
            AppError::Database(_)
        ));
    }
}
