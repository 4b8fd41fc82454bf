use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::dto::envelope::FieldError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("You have already applied to this vacancy")]
    DuplicateApplication,

    #[error("Vacancy not found or no longer accepting applications")]
    VacancyUnavailable,

    #[error("Upload a resume to your profile before applying")]
    MissingResume,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_)
            | Error::Conflict(_)
            | Error::DuplicateApplication
            | Error::MissingResume
            | Error::InvalidTransition(_)
            | Error::Validation(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) | Error::VacancyUnavailable => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let body = match self {
            Error::Validation(err) => json!({
                "success": false,
                "message": "Validation failed",
                "errors": field_errors(&err),
            }),
            Error::BadRequest(msg)
            | Error::Conflict(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg) => json!({ "success": false, "message": msg }),
            Error::Json(err) => json!({ "success": false, "message": err.to_string() }),
            err @ (Error::DuplicateApplication
            | Error::VacancyUnavailable
            | Error::MissingResume
            | Error::InvalidTransition(_)) => {
                json!({ "success": false, "message": err.to_string() })
            }
            other => {
                tracing::error!(error = %other, "request failed");
                json!({ "success": false, "message": "An unexpected error occurred" })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}

/// Name of the unique constraint a failed insert/update tripped, if any.
pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if db_err.code().as_deref() != Some("23505") {
        return None;
    }
    Some(db_err.constraint().unwrap_or_default().to_string())
}

/// Flattens nested validator output into `{field, message}` pairs.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_field_errors(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_field_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code));
                    out.push(FieldError {
                        field: path.clone(),
                        message,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_field_errors(inner, &format!("{}[{}]", path, idx), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{Validate, ValidationError};

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(range(min = 1, max = 5))]
        rating: i32,
    }

    #[test]
    fn lifecycle_errors_map_to_documented_statuses() {
        assert_eq!(Error::DuplicateApplication.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::MissingResume.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::VacancyUnavailable.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::Unauthorized("no".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_are_flattened_per_field() {
        let sample = Sample {
            name: "ab".into(),
            rating: 9,
        };
        let err = sample.validate().unwrap_err();
        let fields = field_errors(&err);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "name");
        assert_eq!(fields[0].message, "too short");
        assert_eq!(fields[1].field, "rating");
        assert!(fields[1].message.contains("range"));
    }

    #[test]
    fn schema_errors_use_custom_message() {
        let mut errors = ValidationErrors::new();
        let mut e = ValidationError::new("salary_range");
        e.message = Some("max below min".into());
        errors.add("salary", e);
        let fields = field_errors(&errors);
        assert_eq!(fields[0].field, "salary");
        assert_eq!(fields[0].message, "max below min");
    }
}
