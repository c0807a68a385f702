//! Route table and navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation resolves redirect records first, then asks the guard
//! whether the target may be entered. The guard only knows two things: does
//! the route require a credential, and is one held. Credential validity is
//! not its concern; an expired token still passes until `restore_session`
//! clears it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::token_store::TokenStore;

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;

pub const LOGIN_PATH: &str = "/login";

/// Redirect chains longer than this are treated as unresolvable.
const MAX_REDIRECTS: usize = 8;

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Pattern with `:name` placeholders, e.g. `/post/:id/edit`.
    pub path: &'static str,
    pub requires_auth: bool,
    pub redirect: Option<&'static str>,
}

impl Route {
    #[must_use]
    pub const fn public(path: &'static str) -> Self {
        Self { path, requires_auth: false, redirect: None }
    }

    #[must_use]
    pub const fn protected(path: &'static str) -> Self {
        Self { path, requires_auth: true, redirect: None }
    }

    #[must_use]
    pub const fn redirect(path: &'static str, to: &'static str) -> Self {
        Self { path, requires_auth: false, redirect: Some(to) }
    }
}

/// The application's routes, in match priority order.
pub const APP_ROUTES: &[Route] = &[
    Route::redirect("/", "/feed"),
    Route::public(LOGIN_PATH),
    Route::public("/register"),
    Route::protected("/edit-profile"),
    Route::protected("/users"),
    Route::protected("/feed"),
    Route::protected("/profile/:id"),
    Route::protected("/post/:id"),
    Route::protected("/post/:id/edit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: Route,
    pub params: BTreeMap<String, String>,
}

// =============================================================================
// GUARD
// =============================================================================

/// Answers whether a credential is currently held.
pub trait CredentialCheck {
    fn has_credential(&self) -> bool;
}

impl CredentialCheck for bool {
    fn has_credential(&self) -> bool {
        *self
    }
}

/// Check that re-reads the token store on every call. Storage faults count
/// as "no credential".
pub struct StoredCredential<'a>(pub &'a dyn TokenStore);

impl CredentialCheck for StoredCredential<'_> {
    fn has_credential(&self) -> bool {
        match self.0.get() {
            Ok(credential) => credential.is_some(),
            Err(e) => {
                warn!(error = %e, "token store unreadable during navigation");
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Redirect to login when the target requires a credential and none is held.
#[must_use]
pub fn guard(requires_auth: bool, check: &dyn CredentialCheck) -> GuardDecision {
    if requires_auth && !check.has_credential() {
        GuardDecision::Redirect(LOGIN_PATH)
    } else {
        GuardDecision::Proceed
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Entered `path`, which matched `route`.
    Proceed { path: String, route: Route, params: BTreeMap<String, String> },
    /// The guard sent the user elsewhere.
    Redirect { from: String, to: &'static str },
    /// Nothing matched; no requirement applies, so nothing blocks it.
    NotFound { path: String },
}

#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(APP_ROUTES.to_vec())
    }
}

impl Router {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// First route whose pattern matches `path`.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .find_map(|route| match_pattern(route.path, &path).map(|params| RouteMatch { route: *route, params }))
    }

    /// Follow redirect records, then run the guard on the final target.
    #[must_use]
    pub fn navigate(&self, path: &str, check: &dyn CredentialCheck) -> Navigation {
        let mut current = normalize_path(path);

        for _ in 0..=MAX_REDIRECTS {
            let Some(matched) = self.resolve(&current) else {
                debug!(path = %current, "no route matched");
                return Navigation::NotFound { path: current };
            };

            if let Some(target) = matched.route.redirect {
                current = normalize_path(target);
                continue;
            }

            return match guard(matched.route.requires_auth, check) {
                GuardDecision::Proceed => {
                    Navigation::Proceed { path: current, route: matched.route, params: matched.params }
                }
                GuardDecision::Redirect(to) => {
                    debug!(from = %current, to, "navigation requires credential");
                    Navigation::Redirect { from: current, to }
                }
            };
        }

        warn!(path = %path, "redirect chain too long");
        Navigation::NotFound { path: normalize_path(path) }
    }
}

/// Drop query/fragment and trailing slashes; the root stays `/`.
fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    // Segments are compared positionally; an empty segment (`//`) never
    // satisfies a parameter.
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        if let Some(name) = expected.strip_prefix(':') {
            if actual.is_empty() {
                return None;
            }
            params.insert(name.to_owned(), (*actual).to_owned());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}
