//! Scripted `FeedApi` mock and fixtures shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::api::{Credential, Credentials, FeedApi, LikeToggle, Post, RequestContext, User};
use crate::error::ApiError;

/// One recorded call against the mock, with the context it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ObtainToken(Credentials),
    CurrentUser(RequestContext),
    Feed(RequestContext),
    CreatePost(RequestContext, String),
    ToggleLike(RequestContext, u64),
}

type Script<T> = Mutex<VecDeque<Result<T, ApiError>>>;

/// Each endpoint pops its next scripted result; an empty script answers with
/// a transport error.
#[derive(Default)]
pub struct MockApi {
    tokens: Script<Credential>,
    users: Script<User>,
    feeds: Script<Vec<Post>>,
    created: Script<Post>,
    likes: Script<LikeToggle>,
    calls: Mutex<Vec<Call>>,
}

fn next<T>(script: &Script<T>) -> Result<T, ApiError> {
    script.lock().unwrap().pop_front().unwrap_or_else(|| Err(ApiError::Transport("no scripted response".into())))
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_token(&self, result: Result<Credential, ApiError>) -> &Self {
        self.tokens.lock().unwrap().push_back(result);
        self
    }

    pub fn push_user(&self, result: Result<User, ApiError>) -> &Self {
        self.users.lock().unwrap().push_back(result);
        self
    }

    pub fn push_feed(&self, result: Result<Vec<Post>, ApiError>) -> &Self {
        self.feeds.lock().unwrap().push_back(result);
        self
    }

    pub fn push_created(&self, result: Result<Post, ApiError>) -> &Self {
        self.created.lock().unwrap().push_back(result);
        self
    }

    pub fn push_like(&self, result: Result<LikeToggle, ApiError>) -> &Self {
        self.likes.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl FeedApi for MockApi {
    async fn obtain_token(&self, credentials: &Credentials) -> Result<Credential, ApiError> {
        self.record(Call::ObtainToken(credentials.clone()));
        next(&self.tokens)
    }

    async fn current_user(&self, ctx: &RequestContext) -> Result<User, ApiError> {
        self.record(Call::CurrentUser(ctx.clone()));
        next(&self.users)
    }

    async fn feed(&self, ctx: &RequestContext) -> Result<Vec<Post>, ApiError> {
        self.record(Call::Feed(ctx.clone()));
        next(&self.feeds)
    }

    async fn create_post(&self, ctx: &RequestContext, content: &str) -> Result<Post, ApiError> {
        self.record(Call::CreatePost(ctx.clone(), content.to_owned()));
        next(&self.created)
    }

    async fn toggle_like(&self, ctx: &RequestContext, post_id: u64) -> Result<LikeToggle, ApiError> {
        self.record(Call::ToggleLike(ctx.clone(), post_id));
        next(&self.likes)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn user(id: u64, username: &str) -> User {
    User { id: Some(id.into()), username: Some(username.to_owned()), extra: serde_json::Map::new() }
}

pub fn post(id: u64, content: &str, likes_count: u64) -> Post {
    Post { id, content: content.to_owned(), likes_count, extra: serde_json::Map::new() }
}

pub fn status_error(status: u16, payload: Option<serde_json::Value>) -> ApiError {
    ApiError::Status { status, payload }
}

pub fn credentials(username: &str, password: &str) -> Credentials {
    Credentials { username: username.to_owned(), password: password.to_owned() }
}
