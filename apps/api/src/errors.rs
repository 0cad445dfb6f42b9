use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::collage::CompositeError;
use crate::history::store::StoreError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// User-fixable input problem. Raised before any collaborator call.
    #[error("Validation error [{code}]: {message}")]
    Validation { code: &'static str, message: String },

    /// Network, quota or parse failure from the external AI service.
    #[error("Collaborator error: {message}")]
    Collaborator {
        message: String,
        details: Option<String>,
        troubleshooting: Vec<String>,
    },

    #[error("File read error: {0}")]
    FileRead(String),

    #[error("Collage composition failed: {0}")]
    Composite(#[from] CompositeError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unexpected error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The uniform error object rendered to clients and kept in the analysis snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub troubleshooting: Vec<String>,
}

impl AppError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            message: message.into(),
        }
    }

    /// Wraps a collaborator failure with a user-facing message.
    /// The technical cause goes to `details`; tips depend on the failure kind.
    pub fn collaborator(message: impl Into<String>, err: LlmError) -> Self {
        AppError::Collaborator {
            message: message.into(),
            troubleshooting: err.troubleshooting(),
            details: Some(err.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::FileRead(_) => StatusCode::BAD_REQUEST,
            AppError::Collaborator { .. } => StatusCode::BAD_GATEWAY,
            AppError::Composite(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            AppError::Validation { code, message } => ErrorBody {
                code: (*code).to_string(),
                message: message.clone(),
                details: None,
                troubleshooting: vec![],
            },
            AppError::Collaborator {
                message,
                details,
                troubleshooting,
            } => ErrorBody {
                code: "COLLABORATOR_ERROR".to_string(),
                message: message.clone(),
                details: details.clone(),
                troubleshooting: troubleshooting.clone(),
            },
            AppError::FileRead(msg) => ErrorBody {
                code: "FILE_READ_ERROR".to_string(),
                message: "Could not read or decode the uploaded file.".to_string(),
                details: Some(msg.clone()),
                troubleshooting: vec![],
            },
            AppError::Composite(e) => ErrorBody {
                code: "COMPOSITE_FAILED".to_string(),
                message: "The collage could not be created.".to_string(),
                details: Some(e.to_string()),
                troubleshooting: vec![],
            },
            AppError::NotFound(msg) => ErrorBody {
                code: "NOT_FOUND".to_string(),
                message: msg.clone(),
                details: None,
                troubleshooting: vec![],
            },
            AppError::Conflict(msg) => ErrorBody {
                code: "ANALYSIS_IN_PROGRESS".to_string(),
                message: msg.clone(),
                details: None,
                troubleshooting: vec![],
            },
            AppError::Internal(e) => ErrorBody {
                code: "UNEXPECTED_ERROR".to_string(),
                message: "An unexpected error occurred".to_string(),
                details: Some(format!("{e:#}")),
                troubleshooting: vec![],
            },
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal(anyhow::Error::new(e).context("History storage failed"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Collaborator { details, .. } => {
                tracing::error!("Collaborator error: {}", details.as_deref().unwrap_or("-"));
            }
            AppError::Composite(e) => tracing::error!("Collage error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }

        let status = self.status();
        let body = Json(json!({ "error": self.body() }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body_carries_code() {
        let body = AppError::validation("CONTENT_TYPE_REQUIRED", "Pick a content type").body();
        assert_eq!(body.code, "CONTENT_TYPE_REQUIRED");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_internal_error_always_has_details() {
        let err = AppError::Internal(anyhow::anyhow!("disk on fire"));
        let body = err.body();
        assert_eq!(body.code, "UNEXPECTED_ERROR");
        assert!(body.details.unwrap().contains("disk on fire"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_collaborator_error_has_tips() {
        let err = AppError::collaborator(
            "Failed to get analysis from AI service.",
            LlmError::RateLimited { retries: 3 },
        );
        let body = err.body();
        assert_eq!(body.code, "COLLABORATOR_ERROR");
        assert!(!body.troubleshooting.is_empty());
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_empty_troubleshooting_is_omitted_from_json() {
        let body = AppError::NotFound("History entry x not found".to_string()).body();
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("troubleshooting").is_none());
        assert!(value.get("details").is_none());
    }
}
