//! Wire types for the social-feed REST API.
//!
//! Only the fields the client acts on are typed. Everything else the server
//! sends is kept in `extra` so it survives a round trip untouched.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

/// Server sentinel announcing that a like was added.
pub const LIKED_MESSAGE: &str = "Curtiu!";
/// Server sentinel announcing that a like was removed.
pub const UNLIKED_MESSAGE: &str = "Curtiu cancelada!";

// =============================================================================
// CREDENTIAL
// =============================================================================

/// Opaque bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Username/password pair posted to the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("username", &self.username).field("password", &"***").finish()
    }
}

/// Body of a successful `POST token/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: Credential,
}

// =============================================================================
// USER / POST
// =============================================================================

/// The authenticated user's profile. Opaque beyond display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Whatever the server uses as an identifier; never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Missing or null counts are treated as zero.
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `null` and absent both read as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewPost<'a> {
    pub content: &'a str,
}

// =============================================================================
// LIKE TOGGLE
// =============================================================================

/// Body of `POST posts/:id/like/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Outcome of a like toggle, decoded from the server's message sentinel.
///
/// Serializes as `"liked"`, `"unliked"` or `{"unrecognized": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeToggle {
    Liked,
    Unliked,
    /// Any other message; carried verbatim and otherwise ignored.
    Unrecognized(String),
}

impl LikeToggle {
    /// Exact-match decoding of the legacy message strings.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        match message {
            LIKED_MESSAGE => Self::Liked,
            UNLIKED_MESSAGE => Self::Unliked,
            other => Self::Unrecognized(other.to_owned()),
        }
    }
}

impl From<LikeResponse> for LikeToggle {
    fn from(resp: LikeResponse) -> Self {
        Self::from_message(&resp.message)
    }
}
