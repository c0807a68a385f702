//! Remote API surface.
//!
//! DESIGN
//! ======
//! Authorization travels with each call as a `RequestContext` instead of a
//! header mutated on a shared client. Whoever owns the credential (the
//! session) decides which context to hand out; the transport just applies it.
//! `FeedApi` is a trait so managers can be driven by a scripted mock in tests.

pub mod http;
pub mod types;

pub use http::HttpApi;
pub use types::{Credential, Credentials, LikeToggle, Post, User};

use crate::error::ApiError;

/// Per-request authorization. Anonymous when no credential is held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    bearer: Option<Credential>,
}

impl RequestContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bearer(credential: Credential) -> Self {
        Self { bearer: Some(credential) }
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.bearer.as_ref()
    }

    /// Value for the `Authorization` header, e.g. `Bearer tok123`.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|c| format!("Bearer {}", c.as_str()))
    }
}

/// Endpoints consumed by the client.
#[async_trait::async_trait]
pub trait FeedApi: Send + Sync {
    /// `POST token/`: exchange credentials for an access token.
    async fn obtain_token(&self, credentials: &Credentials) -> Result<Credential, ApiError>;

    /// `GET users/me/`: profile of the credential's owner.
    async fn current_user(&self, ctx: &RequestContext) -> Result<User, ApiError>;

    /// `GET posts/feed/`: the feed in server order.
    async fn feed(&self, ctx: &RequestContext) -> Result<Vec<Post>, ApiError>;

    /// `POST posts/`: create a post and return the server's representation.
    async fn create_post(&self, ctx: &RequestContext, content: &str) -> Result<Post, ApiError>;

    /// `POST posts/:id/like/`: toggle the caller's like on a post.
    async fn toggle_like(&self, ctx: &RequestContext, post_id: u64) -> Result<LikeToggle, ApiError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
