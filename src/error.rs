//! Dataset Errors
//!
//! The error taxonomy shared by the locator, the record cache and the HTTP
//! handlers. Every variant maps to exactly one HTTP status; the response body
//! is always `{ "error": ..., "details"?: ... }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::language::Language;
use crate::storage::error::StoreError;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Unsupported language")]
    UnsupportedLanguage(String),

    #[error("Invalid part number")]
    InvalidPart(String),

    /// No candidate folder holds any object for this language.
    #[error("{label} not found")]
    DatasetNotFound {
        lang: Language,
        label: &'static str,
    },

    #[error("Part not found")]
    PartNotFound { lang: Language, part: u32 },

    #[error("Object not found")]
    ObjectNotFound { path: String },

    /// A part could not be gunzipped or parsed. Never cached.
    #[error("Dataset corrupt")]
    DatasetCorrupt { path: String, reason: String },

    #[error("Storage unavailable")]
    StoreUnavailable(#[source] StoreError),

    #[error("Internal error")]
    Internal(String),
}

impl DatasetError {
    pub fn status(&self) -> StatusCode {
        match self {
            DatasetError::UnsupportedLanguage(_) | DatasetError::InvalidPart(_) => {
                StatusCode::BAD_REQUEST
            }
            DatasetError::DatasetNotFound { .. }
            | DatasetError::PartNotFound { .. }
            | DatasetError::ObjectNotFound { .. } => StatusCode::NOT_FOUND,
            DatasetError::DatasetCorrupt { .. }
            | DatasetError::StoreUnavailable(_)
            | DatasetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NOT_FOUND
    }

    fn details(&self) -> Option<String> {
        match self {
            DatasetError::DatasetCorrupt { path, reason } => Some(format!("{path}: {reason}")),
            DatasetError::StoreUnavailable(e) => Some(e.to_string()),
            DatasetError::Internal(message) => Some(message.clone()),
            _ => None,
        }
    }
}

impl From<StoreError> for DatasetError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { path } => DatasetError::ObjectNotFound { path },
            other => DatasetError::StoreUnavailable(other),
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for DatasetError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {} ({:?})", self, self.details());
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}
