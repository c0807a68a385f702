//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_STATE_DIR: &str = ".feedline";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const API_BASE_VAR: &str = "FEEDLINE_API_BASE";
pub const STATE_DIR_VAR: &str = "FEEDLINE_STATE_DIR";
pub const REQUEST_TIMEOUT_VAR: &str = "FEEDLINE_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "FEEDLINE_CONNECT_TIMEOUT_SECS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every endpoint is relative to, without a trailing slash.
    pub api_base: String,
    /// Directory holding the durable token file.
    pub state_dir: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `FEEDLINE_API_BASE`
    ///
    /// Optional:
    /// - `FEEDLINE_STATE_DIR`: default `.feedline`
    /// - `FEEDLINE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FEEDLINE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup(API_BASE_VAR).ok_or(ConfigError::MissingVar { var: API_BASE_VAR })?;
        let api_base = normalize_base_url(&raw_base)?;
        let state_dir = lookup(STATE_DIR_VAR)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let timeouts = Timeouts {
            request_secs: parse_u64_or(lookup(REQUEST_TIMEOUT_VAR).as_deref(), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64_or(lookup(CONNECT_TIMEOUT_VAR).as_deref(), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { api_base, state_dir, timeouts })
    }
}

/// Validate a base URL and strip trailing slashes so endpoint joins stay uniform.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] when the value is not an absolute URL.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidBaseUrl { url: trimmed.to_owned(), reason: e.to_string() })?;
    Ok(trimmed.trim_end_matches('/').to_owned())
}

fn parse_u64_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
