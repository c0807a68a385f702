//! Feed state: the post list plus loading/error flags.
//!
//! DESIGN
//! ======
//! The server is authoritative on order: a fetch replaces the whole list.
//! Creates and likes patch the local list from the server's answer instead of
//! refetching. Every operation returns its `Result` and also records a
//! human-readable message in `error`, so views and callers see the same
//! failures.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::api::{FeedApi, LikeToggle, Post, RequestContext};
use crate::error::ApiError;

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;

pub const FEED_ERROR_FALLBACK: &str = "Erro ao carregar feed. Tenta de novo?";
pub const CREATE_ERROR_FALLBACK: &str = "Erro ao criar post.";
pub const LIKE_ERROR_FALLBACK: &str = "Erro ao curtir.";

/// Holds `loading` true for as long as it lives, including when the owning
/// future is dropped mid-request.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn engage(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct FeedManager {
    api: Arc<dyn FeedApi>,
    posts: Vec<Post>,
    loading: bool,
    error: Option<String>,
}

impl FeedManager {
    #[must_use]
    pub fn new(api: Arc<dyn FeedApi>) -> Self {
        Self { api, posts: Vec::new(), loading: false, error: None }
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn post(&self, post_id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the list with the server's feed.
    ///
    /// # Errors
    ///
    /// Returns the API error; `error` then holds the server's `detail` or
    /// [`FEED_ERROR_FALLBACK`]. The post list is left as it was.
    pub async fn fetch_feed(&mut self, ctx: &RequestContext) -> Result<(), ApiError> {
        let _loading = LoadingGuard::engage(&mut self.loading);
        self.error = None;

        match self.api.feed(ctx).await {
            Ok(posts) => {
                debug!(count = posts.len(), "feed loaded");
                self.posts = posts;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "feed load failed");
                self.error = Some(failure_message(&e, FEED_ERROR_FALLBACK));
                Err(e)
            }
        }
    }

    /// Publish a post and put the server's copy at the top of the feed.
    ///
    /// # Errors
    ///
    /// Returns the API error; the post list is not touched.
    pub async fn create_post(&mut self, ctx: &RequestContext, content: &str) -> Result<&Post, ApiError> {
        self.error = None;

        match self.api.create_post(ctx, content).await {
            Ok(post) => {
                debug!(post_id = post.id, "post created");
                self.posts.insert(0, post);
                Ok(&self.posts[0])
            }
            Err(e) => {
                error!(error = %e, "post create failed");
                self.error = Some(failure_message(&e, CREATE_ERROR_FALLBACK));
                Err(e)
            }
        }
    }

    /// Toggle the like on `post_id` and adjust its local counter.
    ///
    /// Only the first post with a matching id changes, by exactly one, and
    /// never below zero. Unrecognized toggle messages change nothing.
    ///
    /// # Errors
    ///
    /// Returns the API error; no counter changes.
    pub async fn like_post(&mut self, ctx: &RequestContext, post_id: u64) -> Result<LikeToggle, ApiError> {
        self.error = None;

        let toggle = match self.api.toggle_like(ctx, post_id).await {
            Ok(toggle) => toggle,
            Err(e) => {
                error!(error = %e, post_id, "like toggle failed");
                self.error = Some(failure_message(&e, LIKE_ERROR_FALLBACK));
                return Err(e);
            }
        };
        debug!(post_id, ?toggle, "like toggled");

        if let Some(post) = self.posts.iter_mut().find(|p| p.id == post_id) {
            match &toggle {
                LikeToggle::Liked => post.likes_count = post.likes_count.saturating_add(1),
                LikeToggle::Unliked => post.likes_count = post.likes_count.saturating_sub(1),
                LikeToggle::Unrecognized(message) => {
                    warn!(post_id, %message, "unrecognized like toggle message");
                }
            }
        }

        Ok(toggle)
    }
}

fn failure_message(err: &ApiError, fallback: &str) -> String {
    err.detail().map_or_else(|| fallback.to_owned(), str::to_owned)
}
