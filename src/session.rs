//! Session manager: owns the credential and the authenticated user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The credential is mirrored into the token store on every change so the
//! next process start resumes it. The request context handed to other
//! components only becomes authenticated once `restore_session` has run;
//! `logout` turns it anonymous again.
//!
//! ERROR HANDLING
//! ==============
//! `login` reports API failures to the caller with the server payload.
//! `restore_session` treats any failure fetching the profile as an invalid
//! session and logs out; it cannot tell a dead network from a rejected
//! token. Storage faults always propagate.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{Credential, Credentials, FeedApi, RequestContext, User};
use crate::error::{SessionError, StoreError};
use crate::router::CredentialCheck;
use crate::token_store::TokenStore;

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

pub struct SessionManager {
    api: Arc<dyn FeedApi>,
    store: Arc<dyn TokenStore>,
    user: Option<User>,
    credential: Option<Credential>,
    context: RequestContext,
}

impl SessionManager {
    /// Build a session seeded from whatever credential the store holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn new(api: Arc<dyn FeedApi>, store: Arc<dyn TokenStore>) -> Result<Self, StoreError> {
        let credential = store.get()?;
        Ok(Self { api, store, user: None, credential, context: RequestContext::anonymous() })
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Authorization to attach to outbound calls.
    #[must_use]
    pub fn request_context(&self) -> &RequestContext {
        &self.context
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Exchange credentials for a token, persist it, then load the profile.
    ///
    /// Success is reported once the token is stored, even if the follow-up
    /// profile fetch fails and ends the session again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] with the server payload when the token
    /// request fails (existing state is left untouched), or
    /// [`SessionError::Store`] when the token cannot be persisted.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        let credential = match self.api.obtain_token(credentials).await {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, payload = ?e.payload(), username = %credentials.username, "login failed");
                return Err(e.into());
            }
        };

        self.store.set(&credential)?;
        self.credential = Some(credential);
        self.restore_session().await?;
        Ok(())
    }

    /// Authenticate the request context and load the current user.
    ///
    /// No-op without a credential. A failed profile fetch logs out.
    ///
    /// # Errors
    ///
    /// Returns an error only if logging out fails to clear the store.
    pub async fn restore_session(&mut self) -> Result<(), StoreError> {
        let Some(credential) = self.credential.clone() else {
            return Ok(());
        };
        self.context = RequestContext::bearer(credential);

        match self.api.current_user(&self.context).await {
            Ok(user) => {
                info!(user_id = ?user.id, username = ?user.username, "session restored");
                self.user = Some(user);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "session restore failed; logging out");
                self.logout()
            }
        }
    }

    /// Drop user, credential and authorization. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared; in-memory state is
    /// cleared regardless.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.user = None;
        self.credential = None;
        self.context = RequestContext::anonymous();
        self.store.clear()
    }
}

impl CredentialCheck for SessionManager {
    fn has_credential(&self) -> bool {
        self.is_authenticated()
    }
}
