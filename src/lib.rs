//! Feedline: native client for the social-feed REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `token_store` persists the bearer credential, `session` owns identity and
//! hands out request contexts, `feed` keeps the in-memory post list, and
//! `router` decides whether a navigation may proceed. `api` is the only
//! module that talks to the network.

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod router;
pub mod session;
pub mod token_store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use api::{FeedApi, RequestContext};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, SessionError, StoreError};
pub use feed::FeedManager;
pub use router::{CredentialCheck, GuardDecision, Navigation, Router};
pub use session::SessionManager;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
