//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can report, from an expired access token to a foreign key
//! violation while creating a task, ends up as one of its variants.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers simply return
//! `Result<_, AppError>` and the client receives a JSON body of the form
//! `{"error": "<message>"}` with the matching status code.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` make `?` work everywhere.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is missing (HTTP 401).
    Unauthorized(String),
    /// The caller is authenticated but may not touch the resource (HTTP 403).
    Forbidden(String),
    /// A malformed request or a rejected create/update/delete (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Database failure that is not a constraint violation (HTTP 500).
    DatabaseError(String),
    /// Payload validation failed (HTTP 400).
    ValidationError(String),
}

impl AppError {
    pub fn task_not_found(task_id: Uuid) -> Self {
        AppError::NotFound(format!("No task with task_id={}", task_id))
    }

    pub fn comment_not_found(comment_id: Uuid) -> Self {
        AppError::NotFound(format!("No comment with comment_id={}", comment_id))
    }

    pub fn user_not_found(param: &str) -> Self {
        AppError::NotFound(format!("User with {} is not found.", param))
    }

    pub fn user_already_exists(param: &str) -> Self {
        AppError::BadRequest(format!("User with {} already exists.", param))
    }

    pub fn not_creator() -> Self {
        AppError::Forbidden("Only creator is allowed to do it.".into())
    }

    /// Converts a database error raised while writing `resource`.
    ///
    /// Constraint violations are the client's fault and become a `BadRequest`
    /// prefixed with `context` (e.g. "Can't create task"); everything else stays a
    /// `DatabaseError`.
    pub fn from_write(error: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_foreign_key_violation() {
                log::error!("{}: {}", context, db_error);
                return AppError::BadRequest(format!(
                    "{}: No row with such foreign key id",
                    context
                ));
            }
            if db_error.is_unique_violation() || db_error.is_check_violation() {
                log::error!("{}: {}", context, db_error);
                return AppError::BadRequest(format!("{}: {}", context, db_error.message()));
            }
            // not_null_violation
            if db_error.code().as_deref() == Some("23502") {
                log::error!("{}: {}", context, db_error);
                return AppError::BadRequest(format!("{}: {}", context, db_error.message()));
            }
        }
        AppError::from(error)
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::ValidationError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::DatabaseError(msg) | AppError::InternalServerError(msg) = self {
            log::error!("{}", msg);
        }
        HttpResponse::build(self.status()).json(json!({
            "error": self.message()
        }))
    }
}

/// `RowNotFound` becomes a generic `NotFound`; every other database error is a 500.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT failures outside the access-token path (which maps kinds itself) are 401s.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
