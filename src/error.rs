use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Error as SqlxError;
use std::collections::HashMap;
use thiserror::Error as ThisError;
use tracing::error;

use crate::service::json_scan::ScanError;

#[derive(Debug, ThisError)]
pub enum AdvisorError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Unsupported database url scheme: {0}")]
    UnsupportedDatabase(String),

    #[error("Required fields missing")]
    MissingFields,

    #[error("Required data missing")]
    MissingData,

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Unknown farmer: {0}")]
    UnknownFarmer(i64),

    #[error("Assessment not found")]
    AssessmentNotFound,

    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("No response received from AI model")]
    EmptyModelResponse,

    #[error("AI response did not contain valid JSON data: {0}")]
    JsonScan(#[from] ScanError),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Gemini API error: {0:?}")]
    GeminiServerError(GeminiError),

    #[error("Weather provider error: {0}")]
    Weather(String),

    #[error("{message}: {source}")]
    Internal {
        message: &'static str,
        #[source]
        source: Box<AdvisorError>,
    },
}

impl AdvisorError {
    /// Wrap a server-side failure with the message the route reports to clients.
    /// Client errors pass through untouched.
    pub fn internal(message: &'static str) -> impl FnOnce(AdvisorError) -> AdvisorError {
        move |source| match source {
            e if e.is_client_error() => e,
            e @ AdvisorError::Internal { .. } => e,
            source => AdvisorError::Internal {
                message,
                source: Box::new(source),
            },
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AdvisorError::MissingFields
                | AdvisorError::MissingData
                | AdvisorError::InvalidField { .. }
                | AdvisorError::MalformedBody(_)
                | AdvisorError::UnknownFarmer(_)
                | AdvisorError::AssessmentNotFound
        )
    }
}

impl IntoResponse for AdvisorError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            AdvisorError::MissingFields => (StatusCode::BAD_REQUEST, "MISSING_FIELDS"),
            AdvisorError::MissingData => (StatusCode::BAD_REQUEST, "MISSING_DATA"),
            AdvisorError::InvalidField { .. } => (StatusCode::BAD_REQUEST, "INVALID_FIELD"),
            AdvisorError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "MALFORMED_BODY"),
            AdvisorError::UnknownFarmer(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_FARMER"),
            AdvisorError::AssessmentNotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AdvisorError::Reqwest(_)
            | AdvisorError::UpstreamStatus(_)
            | AdvisorError::GeminiServerError(_)
            | AdvisorError::Weather(_) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match &self {
            AdvisorError::Internal { message, source } => {
                error!(error = %source, "{message}");
                (*message).to_string()
            }
            e if e.is_client_error() => e.to_string(),
            e => {
                error!(error = %e, "request failed");
                "An internal server error occurred.".to_string()
            }
        };

        (
            status,
            Json(ApiErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

/// Error body returned to clients. `error` stays a plain string so existing
/// form clients can show it directly.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
}

/// Gemini API error response structure
#[derive(Deserialize, Debug)]
pub struct GeminiError {
    pub error: GeminiErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct GeminiErrorBody {
    pub code: u32,
    pub message: String,
    pub status: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
