use super::*;
use crate::api::Credential;
use crate::test_helpers::{Call, MockApi, post, status_error};

fn authed() -> RequestContext {
    RequestContext::bearer(Credential::new("tok123"))
}

async fn seeded(api: &Arc<MockApi>, posts: Vec<Post>) -> FeedManager {
    api.push_feed(Ok(posts));
    let mut feed = FeedManager::new(api.clone());
    feed.fetch_feed(&authed()).await.unwrap();
    feed
}

fn counts(feed: &FeedManager) -> Vec<(u64, u64)> {
    feed.posts().iter().map(|p| (p.id, p.likes_count)).collect()
}

// =============================================================================
// fetch_feed
// =============================================================================

#[tokio::test]
async fn fetch_replaces_posts_in_server_order() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(1, "old", 0)]).await;

    api.push_feed(Ok(vec![post(3, "c", 0), post(2, "b", 1)]));
    feed.fetch_feed(&authed()).await.unwrap();

    assert_eq!(counts(&feed), vec![(3, 0), (2, 1)]);
    assert!(!feed.loading());
    assert_eq!(feed.error(), None);
}

#[tokio::test]
async fn fetch_passes_request_context_through() {
    let api = MockApi::new();
    let _feed = seeded(&api, vec![]).await;
    assert_eq!(api.calls(), vec![Call::Feed(authed())]);
}

#[tokio::test]
async fn fetch_failure_uses_server_detail() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(1, "kept", 2)]).await;

    api.push_feed(Err(status_error(401, Some(serde_json::json!({ "detail": "Credenciais não fornecidas." })))));
    assert!(feed.fetch_feed(&RequestContext::anonymous()).await.is_err());

    assert_eq!(feed.error(), Some("Credenciais não fornecidas."));
    assert!(!feed.loading());
    assert_eq!(counts(&feed), vec![(1, 2)]);
}

#[tokio::test]
async fn fetch_failure_without_detail_uses_fallback() {
    let api = MockApi::new();
    api.push_feed(Err(crate::error::ApiError::Transport("timeout".into())));
    let mut feed = FeedManager::new(api.clone());

    assert!(feed.fetch_feed(&authed()).await.is_err());
    assert_eq!(feed.error(), Some(FEED_ERROR_FALLBACK));
    assert!(!feed.loading());
}

#[tokio::test]
async fn fetch_success_clears_previous_error() {
    let api = MockApi::new();
    api.push_feed(Err(status_error(500, None))).push_feed(Ok(vec![post(1, "a", 0)]));
    let mut feed = FeedManager::new(api.clone());

    let _ = feed.fetch_feed(&authed()).await;
    assert!(feed.error().is_some());
    feed.fetch_feed(&authed()).await.unwrap();
    assert_eq!(feed.error(), None);
    assert!(!feed.loading());
}

#[test]
fn loading_guard_resets_on_drop() {
    let mut flag = false;
    {
        let _guard = LoadingGuard::engage(&mut flag);
    }
    assert!(!flag);
}

#[test]
fn fetch_dropped_mid_flight_clears_loading() {
    use std::future::Future;
    use std::pin::pin;
    use std::task::{Context, Waker};

    struct PendingApi;

    #[async_trait::async_trait]
    impl FeedApi for PendingApi {
        async fn obtain_token(&self, _c: &crate::api::Credentials) -> Result<Credential, ApiError> {
            std::future::pending().await
        }
        async fn current_user(&self, _ctx: &RequestContext) -> Result<crate::api::User, ApiError> {
            std::future::pending().await
        }
        async fn feed(&self, _ctx: &RequestContext) -> Result<Vec<Post>, ApiError> {
            std::future::pending().await
        }
        async fn create_post(&self, _ctx: &RequestContext, _content: &str) -> Result<Post, ApiError> {
            std::future::pending().await
        }
        async fn toggle_like(&self, _ctx: &RequestContext, _id: u64) -> Result<LikeToggle, ApiError> {
            std::future::pending().await
        }
    }

    let mut feed = FeedManager::new(Arc::new(PendingApi));
    let ctx = authed();
    {
        let mut fut = pin!(feed.fetch_feed(&ctx));
        let mut cx = Context::from_waker(Waker::noop());
        assert!(fut.as_mut().poll(&mut cx).is_pending());
    }
    assert!(!feed.loading());
}

// =============================================================================
// create_post
// =============================================================================

#[tokio::test]
async fn create_prepends_server_post() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(2, "b", 1), post(1, "a", 0)]).await;

    api.push_created(Ok(post(99, "hello", 0)));
    let created = feed.create_post(&authed(), "hello").await.unwrap();
    assert_eq!(created.id, 99);

    assert_eq!(counts(&feed), vec![(99, 0), (2, 1), (1, 0)]);
    assert_eq!(feed.posts()[0].content, "hello");
    assert_eq!(feed.posts()[1], post(2, "b", 1));
    assert_eq!(feed.posts()[2], post(1, "a", 0));
}

#[tokio::test]
async fn create_does_not_refetch() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![]).await;
    api.push_created(Ok(post(99, "hello", 0)));
    feed.create_post(&authed(), "hello").await.unwrap();

    assert_eq!(api.calls(), vec![Call::Feed(authed()), Call::CreatePost(authed(), "hello".into())]);
}

#[tokio::test]
async fn create_failure_leaves_posts_and_reports_error() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(1, "a", 0)]).await;

    api.push_created(Err(status_error(400, Some(serde_json::json!({ "content": ["Este campo é obrigatório."] })))));
    assert!(feed.create_post(&authed(), "").await.is_err());

    assert_eq!(counts(&feed), vec![(1, 0)]);
    assert_eq!(feed.error(), Some(CREATE_ERROR_FALLBACK));
}

// =============================================================================
// like_post
// =============================================================================

#[tokio::test]
async fn like_then_unlike_adjusts_matching_post() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(4, "x", 7), post(5, "y", 2)]).await;

    api.push_like(Ok(LikeToggle::Liked));
    assert_eq!(feed.like_post(&authed(), 5).await.unwrap(), LikeToggle::Liked);
    assert_eq!(counts(&feed), vec![(4, 7), (5, 3)]);
    assert_eq!(feed.post(5).map(|p| p.likes_count), Some(3));

    api.push_like(Ok(LikeToggle::Unliked));
    assert_eq!(feed.like_post(&authed(), 5).await.unwrap(), LikeToggle::Unliked);
    assert_eq!(counts(&feed), vec![(4, 7), (5, 2)]);
}

#[tokio::test]
async fn unlike_floors_at_zero() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(5, "y", 0)]).await;

    api.push_like(Ok(LikeToggle::Unliked));
    feed.like_post(&authed(), 5).await.unwrap();
    assert_eq!(counts(&feed), vec![(5, 0)]);
}

#[tokio::test]
async fn unrecognized_message_changes_nothing() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(5, "y", 2)]).await;

    api.push_like(Ok(LikeToggle::Unrecognized("Você já curtiu".into())));
    let toggle = feed.like_post(&authed(), 5).await.unwrap();
    assert!(matches!(toggle, LikeToggle::Unrecognized(_)));
    assert_eq!(counts(&feed), vec![(5, 2)]);
}

#[tokio::test]
async fn like_for_post_not_in_feed_is_harmless() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(1, "a", 1)]).await;

    api.push_like(Ok(LikeToggle::Liked));
    feed.like_post(&authed(), 42).await.unwrap();
    assert_eq!(counts(&feed), vec![(1, 1)]);
}

#[tokio::test]
async fn post_lookup_returns_first_match_or_none() {
    let api = MockApi::new();
    let feed = seeded(&api, vec![post(5, "first", 1), post(5, "dup", 4), post(6, "z", 0)]).await;

    assert_eq!(feed.post(5).map(|p| p.content.as_str()), Some("first"));
    assert_eq!(feed.post(6).map(|p| p.likes_count), Some(0));
    assert!(feed.post(7).is_none());
}

#[tokio::test]
async fn like_touches_only_first_duplicate() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(5, "first", 1), post(5, "dup", 1)]).await;

    api.push_like(Ok(LikeToggle::Liked));
    feed.like_post(&authed(), 5).await.unwrap();
    assert_eq!(counts(&feed), vec![(5, 2), (5, 1)]);
}

#[tokio::test]
async fn like_failure_reports_error_without_mutation() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(5, "y", 2)]).await;

    api.push_like(Err(status_error(404, Some(serde_json::json!({ "detail": "Não encontrado." })))));
    assert!(feed.like_post(&authed(), 5).await.is_err());
    assert_eq!(counts(&feed), vec![(5, 2)]);
    assert_eq!(feed.error(), Some("Não encontrado."));
}

#[tokio::test]
async fn like_sequences_never_go_negative_or_leak() {
    let api = MockApi::new();
    let mut feed = seeded(&api, vec![post(1, "a", 0), post(2, "b", 1), post(3, "c", 5)]).await;

    let script = [
        LikeToggle::Unliked,
        LikeToggle::Unliked,
        LikeToggle::Liked,
        LikeToggle::Unliked,
        LikeToggle::Unliked,
        LikeToggle::Liked,
        LikeToggle::Liked,
    ];
    let mut expected: u64 = 1;
    for toggle in script {
        expected = match &toggle {
            LikeToggle::Liked => expected + 1,
            LikeToggle::Unliked => expected.saturating_sub(1),
            LikeToggle::Unrecognized(_) => expected,
        };
        api.push_like(Ok(toggle));
        feed.like_post(&authed(), 2).await.unwrap();
        assert_eq!(counts(&feed), vec![(1, 0), (2, expected), (3, 5)]);
    }
}
