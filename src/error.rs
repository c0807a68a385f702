//! Error types shared across the client.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, server rejections with a JSON payload, and server
//! rejections without one all map onto `ApiError`. Storage faults stay
//! separate so callers can tell "the server said no" from "the disk said no".

use std::path::PathBuf;

// =============================================================================
// API
// =============================================================================

/// Errors produced by remote API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("API request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, payload: Option<serde_json::Value> },

    /// A success response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),
}

impl ApiError {
    /// Structured error payload returned by the server, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Status { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// The payload's `detail` message, the convention the API uses for
    /// human-readable failures.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.payload()?.get("detail")?.as_str()
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Durable token storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token store io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// SESSION
// =============================================================================

/// Failures reported by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Server-provided error payload, when the failure came from the API.
    #[must_use]
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Api(e) => e.payload(),
            Self::Store(_) => None,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Configuration could not be assembled from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    MissingVar { var: &'static str },
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
