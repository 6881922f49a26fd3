//! Error types for catalog resolution and rendering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error codes for tool consumers.
///
/// These codes form a **stable API contract**; once published, variant names
/// and their serialized `snake_case` strings must never change across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// A status, symbolic code or name does not match any catalog entry.
    UnknownCatalogEntry,
    /// The error type registry was used before `load_errors` completed.
    RegistryNotLoaded,
    /// Neither a mapping nor a fallback exists for a failure.
    UnresolvableFailure,
    /// Nothing was given to resolve or serialize.
    InvalidDescriptorInput,
    /// A status value could not be normalized to an integer.
    InvalidStatus,
    /// JSON (de)serialization error.
    JsonParseError,
}

#[derive(Debug, Error)]
pub enum JsonApiError {
    #[error(
        "Error {key} definition not found in the error catalog{}",
        .failure.as_deref().map(|f| format!(" (mapped from {f})")).unwrap_or_default()
    )]
    UnknownCatalogEntry {
        key: String,
        failure: Option<String>,
    },

    #[error("Error type registry not loaded")]
    RegistryNotLoaded,

    #[error("No mapping found for {failure} and no fallback error set")]
    UnresolvableFailure { failure: String },

    #[error("Cannot resolve an empty error list")]
    InvalidDescriptorInput,

    #[error("Invalid status {value:?}: expected an integer HTTP status")]
    InvalidStatus { value: String },

    #[error("JSON (de)serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JsonApiError {
    pub(crate) fn unknown(key: impl ToString) -> Self {
        JsonApiError::UnknownCatalogEntry {
            key: key.to_string(),
            failure: None,
        }
    }

    pub(crate) fn unknown_mapping(key: impl ToString, failure: impl ToString) -> Self {
        JsonApiError::UnknownCatalogEntry {
            key: key.to_string(),
            failure: Some(failure.to_string()),
        }
    }

    /// Returns the stable error code for this error variant.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            JsonApiError::UnknownCatalogEntry { .. } => ErrorCode::UnknownCatalogEntry,
            JsonApiError::RegistryNotLoaded => ErrorCode::RegistryNotLoaded,
            JsonApiError::UnresolvableFailure { .. } => ErrorCode::UnresolvableFailure,
            JsonApiError::InvalidDescriptorInput => ErrorCode::InvalidDescriptorInput,
            JsonApiError::InvalidStatus { .. } => ErrorCode::InvalidStatus,
            JsonApiError::Json(_) => ErrorCode::JsonParseError,
        }
    }

    /// Returns the offending key or value, if the variant carries one.
    pub fn key(&self) -> Option<&str> {
        match self {
            JsonApiError::UnknownCatalogEntry { key, .. } => Some(key),
            JsonApiError::UnresolvableFailure { failure } => Some(failure),
            JsonApiError::InvalidStatus { value } => Some(value),
            JsonApiError::RegistryNotLoaded
            | JsonApiError::InvalidDescriptorInput
            | JsonApiError::Json(_) => None,
        }
    }

    /// Produces a structured JSON error.
    ///
    /// Format: `{"code": "...", "message": "...", "key": "..." | null}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
            "key": self.key(),
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
