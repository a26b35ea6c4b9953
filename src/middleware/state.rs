use std::sync::Arc;

use axum::extract::FromRef;

use crate::facade::Sessions;
use crate::oidc::OidcClient;
use crate::session::SessionStore;

/// Shared state for auth route handlers.
pub(super) struct RouterState<S> {
    pub(super) sessions: Sessions<S>,
    pub(super) oidc: Option<Arc<OidcClient>>,
    pub(super) dev_mode: bool,
    pub(super) login_redirect: String,
}

// Manual Clone: avoid derive adding an `S: Clone` bound.
impl<S> Clone for RouterState<S> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            oidc: self.oidc.clone(),
            dev_mode: self.dev_mode,
            login_redirect: self.login_redirect.clone(),
        }
    }
}

// Lets `CurrentUser` extract from the auth router's own state.
impl<S: crate::facade::CredentialStore> FromRef<RouterState<S>> for SessionStore {
    fn from_ref(state: &RouterState<S>) -> Self {
        state.sessions.store().clone()
    }
}
