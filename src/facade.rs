//! The one surface the rest of the application talks to.
//!
//! Every sign-in path (local credentials, OIDC, legacy mock token) ends in
//! the same `session` cookie and reads back as the same [`SessionUser`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use subtle::ConstantTimeEq;
use time::OffsetDateTime;

use crate::error::{CookieError, Error, VerifyError};
#[cfg(feature = "oidc")]
use crate::oidc::ProviderIdentity;
use crate::pseudonym::normalize_identity;
use crate::session::{SessionCookies, SessionStore};
use crate::token::{IssuedToken, MockToken};
use crate::types::{NewSession, SessionUser};

/// Consumer-provided credential check for local sign-in.
///
/// Receives the normalized (trimmed, lowercased) email. Returns the subject
/// id on a match and `None` when the email or password is wrong.
///
/// # Example
///
/// ```rust,ignore
/// impl CredentialStore for MyUsers {
///     async fn verify(
///         &self,
///         email: &str,
///         password: &str,
///     ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
///         let Some(user) = self.repo.find_by_email(email).await? else {
///             return Ok(None);
///         };
///         Ok(user.check_password(password).then(|| user.id.to_string()))
///     }
/// }
/// ```
pub trait CredentialStore: Send + Sync + 'static {
    fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>> + Send;
}

/// In-memory credential table for development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, StaticUser>,
}

#[derive(Debug, Clone)]
struct StaticUser {
    subject_id: String,
    password: String,
}

impl StaticCredentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed local accounts: `admin@example.com` / `Pa55w.rd` (subject `1`)
    /// and `user@example.com` / `user123` (subject `2`).
    #[must_use]
    pub fn development() -> Self {
        Self::new()
            .with_user("1", "admin@example.com", "Pa55w.rd")
            .with_user("2", "user@example.com", "user123")
    }

    #[must_use]
    pub fn with_user(
        mut self,
        subject_id: impl Into<String>,
        email: &str,
        password: impl Into<String>,
    ) -> Self {
        self.users.insert(
            normalize_identity(email),
            StaticUser {
                subject_id: subject_id.into(),
                password: password.into(),
            },
        );
        self
    }
}

impl CredentialStore for StaticCredentials {
    async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .users
            .get(email)
            .filter(|u| bool::from(u.password.as_bytes().ct_eq(password.as_bytes())))
            .map(|u| u.subject_id.clone()))
    }
}

/// Sign in, sign out, and "who is this?".
pub struct Sessions<S> {
    store: SessionStore,
    credentials: Arc<S>,
}

// Manual Clone: avoid derive adding an `S: Clone` bound.
impl<S> Clone for Sessions<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            credentials: self.credentials.clone(),
        }
    }
}

impl<S: CredentialStore> Sessions<S> {
    #[must_use]
    pub fn new(store: SessionStore, credentials: S) -> Self {
        Self {
            store,
            credentials: Arc::new(credentials),
        }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Check an email/password pair and start a session.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCredentials`] for an unknown email or wrong password,
    /// - [`Error::Credentials`] if the store itself fails,
    /// - [`Error::Cookie`] if the cookie cannot be written.
    pub async fn sign_in<C: SessionCookies>(
        &self,
        cookies: &mut C,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, Error> {
        let email = normalize_identity(email);
        let subject_id = self
            .credentials
            .verify(&email, password)
            .await
            .map_err(|e| Error::Credentials(e.to_string()))?
            .ok_or_else(|| {
                tracing::warn!("Local sign-in rejected");
                Error::InvalidCredentials
            })?;

        self.start(cookies, &NewSession::new(subject_id, email))
    }

    /// Start a session for an identity resolved by the OIDC provider.
    ///
    /// The subject is the provider's `sub`; the identity is its email (or
    /// principal name).
    ///
    /// # Errors
    ///
    /// [`Error::IncompleteIdentity`] if the provider gave no email, or
    /// [`Error::Cookie`] if the cookie cannot be written.
    #[cfg(feature = "oidc")]
    pub fn sign_in_with_identity<C: SessionCookies>(
        &self,
        cookies: &mut C,
        identity: &ProviderIdentity,
    ) -> Result<SessionUser, Error> {
        let email = identity
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(Error::IncompleteIdentity)?;
        self.start(cookies, &NewSession::new(identity.sub.clone(), email))
    }

    /// Start a legacy mock-token session for `identity`. Development only.
    ///
    /// # Errors
    ///
    /// [`VerifyError::MockTokensDisabled`] unless mock tokens are accepted,
    /// or [`Error::Cookie`] if the cookie cannot be written.
    pub fn sign_in_mock<C: SessionCookies>(
        &self,
        cookies: &mut C,
        identity: &str,
    ) -> Result<SessionUser, Error> {
        let tokens = self.store.tokens();
        if !tokens.accepts_mock_tokens() {
            return Err(VerifyError::MockTokensDisabled.into());
        }
        let now = OffsetDateTime::now_utc();
        let token = MockToken::mint(identity, now);
        self.store.store_raw(cookies, &token.to_string(), now)?;
        tracing::info!(subject = %token.hash, "Mock session created");
        Ok(token.into_session_user())
    }

    /// End the session. Idempotent.
    ///
    /// # Errors
    ///
    /// Propagates cookie transport errors.
    pub fn sign_out<C: SessionCookies>(&self, cookies: &mut C) -> Result<(), CookieError> {
        self.store.destroy_session(cookies)?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// The authenticated user of this request, if any.
    ///
    /// # Errors
    ///
    /// Only [`CookieError::Deferred`], which must reach the host unchanged.
    pub fn current_user<C: SessionCookies>(
        &self,
        cookies: &mut C,
    ) -> Result<Option<SessionUser>, CookieError> {
        self.store.get_session(cookies, OffsetDateTime::now_utc())
    }

    fn start<C: SessionCookies>(
        &self,
        cookies: &mut C,
        session: &NewSession,
    ) -> Result<SessionUser, Error> {
        let now = OffsetDateTime::now_utc();
        let IssuedToken { value, .. } = self.store.create_session(cookies, session, now)?;
        Ok(self.store.tokens().verify(&value, now)?)
    }
}
