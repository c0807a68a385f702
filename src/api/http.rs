//! reqwest-backed implementation of [`FeedApi`].
//!
//! Thin HTTP wrapper: build the request, attach the context's bearer token,
//! map status and body into `ApiError`. Body parsing lives in free functions
//! for testability.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::types::{Credential, Credentials, LikeResponse, LikeToggle, NewPost, Post, TokenResponse, User};
use super::{FeedApi, RequestContext};
use crate::config::{ClientConfig, Timeouts};
use crate::error::ApiError;

const TOKEN_PATH: &str = "token/";
const CURRENT_USER_PATH: &str = "users/me/";
const FEED_PATH: &str = "posts/feed/";
const POSTS_PATH: &str = "posts/";

fn like_path(post_id: u64) -> String {
    format!("posts/{post_id}/like/")
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the reqwest client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url })
    }

    /// # Errors
    ///
    /// See [`HttpApi::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base.clone(), config.timeouts)
    }

    fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, ctx: &RequestContext) -> RequestBuilder {
        let req = self.http.request(method, self.endpoint(path));
        match ctx.credential() {
            Some(credential) => req.bearer_auth(credential.as_str()),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = req.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), payload: parse_error_payload(&text) });
        }

        parse_body(&text)
    }
}

#[async_trait::async_trait]
impl FeedApi for HttpApi {
    async fn obtain_token(&self, credentials: &Credentials) -> Result<Credential, ApiError> {
        let req = self.request(Method::POST, TOKEN_PATH, &RequestContext::anonymous()).json(credentials);
        let body: TokenResponse = self.send(req).await?;
        Ok(body.access)
    }

    async fn current_user(&self, ctx: &RequestContext) -> Result<User, ApiError> {
        self.send(self.request(Method::GET, CURRENT_USER_PATH, ctx)).await
    }

    async fn feed(&self, ctx: &RequestContext) -> Result<Vec<Post>, ApiError> {
        self.send(self.request(Method::GET, FEED_PATH, ctx)).await
    }

    async fn create_post(&self, ctx: &RequestContext, content: &str) -> Result<Post, ApiError> {
        let req = self.request(Method::POST, POSTS_PATH, ctx).json(&NewPost { content });
        self.send(req).await
    }

    async fn toggle_like(&self, ctx: &RequestContext, post_id: u64) -> Result<LikeToggle, ApiError> {
        let body: LikeResponse = self.send(self.request(Method::POST, &like_path(post_id), ctx)).await?;
        Ok(body.into())
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn join_endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Error bodies are kept only when they are JSON; HTML error pages and empty
/// bodies yield no payload.
fn parse_error_payload(text: &str) -> Option<serde_json::Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
