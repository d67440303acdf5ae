//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API and the mapping
//! of core errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use postdata_core::{PostdataError, StanzaFeature, SyllableKind};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// INFO RESPONSE
// =============================================================================

/// Service description returned by `/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl InfoResponse {
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: "POSTDATA 2 DraCor API".to_string(),
            version: version.into(),
            description: "Connects POSTDATA to a DraCor-like Frontend".to_string(),
        }
    }
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// Query string of `/corpora`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorporaParams {
    pub include: Option<String>,
}

// =============================================================================
// SYLLABLES RESPONSE
// =============================================================================

/// Syllable counts of one kind for a poem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllablesResponse {
    pub kind: SyllableKind,
    pub total: i64,
    pub in_stanzas: StanzaFeature,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body of every failed JSON endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub PostdataError);

impl ApiError {
    /// HTTP status for the wrapped error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            PostdataError::PoemNotFound(_) | PostdataError::UnknownCorpus(_) => {
                StatusCode::NOT_FOUND
            }
            PostdataError::InvalidSyllableType(_)
            | PostdataError::InvalidDatatypeFlag(_)
            | PostdataError::MalformedUri(_) => StatusCode::BAD_REQUEST,
            PostdataError::ConnectionError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PostdataError> for ApiError {
    fn from(error: PostdataError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
