//! Error types for the note store and their HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use notes_types::ErrorResponse;
use std::collections::BTreeMap;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NoteError>;

/// One or more request fields failed their constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Validation failed for: {}", field_list(.errors))]
pub struct ValidationError {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record the failure of `result` under `field`, passing a success through.
    pub fn collect<T>(&mut self, field: &str, result: std::result::Result<T, &str>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }
}

fn field_list(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Error)]
pub enum NoteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Note with id '{0}' not found")]
    NotFound(String),
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Note(#[from] NoteError),

    /// The body could not be read as the expected JSON shape
    #[error("{message}")]
    BadBody { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Note(NoteError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Note(NoteError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::BadBody { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match &self {
            ApiError::Note(NoteError::Validation(v)) => v.errors().clone(),
            _ => BTreeMap::new(),
        };

        if status == StatusCode::NOT_FOUND {
            log::debug!("{}", self);
        } else {
            log::warn!("Rejected request ({}): {}", status.as_u16(), self);
        }

        let body = ErrorResponse {
            code: status.as_u16(),
            status: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
            errors,
        };

        (status, Json(body)).into_response()
    }
}
