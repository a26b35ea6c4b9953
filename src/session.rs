//! Cookie-backed session persistence.
//!
//! The `session` cookie is the only record of authentication: there is no
//! server-side session table. Reads re-verify the token every time, and any
//! verification failure deletes the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;

use crate::error::CookieError;
use crate::token::{IssuedToken, TokenService};
use crate::types::{NewSession, SessionUser};

pub const SESSION_COOKIE_NAME: &str = "session";

/// Cookie transport the session store reads from and writes to.
///
/// Implemented for axum's [`CookieJar`]. Hosts whose cookie access can be
/// interrupted (for example to defer rendering) return
/// [`CookieError::Deferred`], which the store always passes through.
pub trait SessionCookies {
    /// Current value of cookie `name`, if present.
    fn read(&self, name: &str) -> Result<Option<String>, CookieError>;

    /// Set (or replace) a cookie.
    fn write(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError>;

    /// Remove cookie `name` (path `/`).
    fn remove(&mut self, name: &str) -> Result<(), CookieError>;
}

impl SessionCookies for CookieJar {
    fn read(&self, name: &str) -> Result<Option<String>, CookieError> {
        Ok(self.get(name).map(|c| c.value().to_string()))
    }

    fn write(&mut self, cookie: Cookie<'static>) -> Result<(), CookieError> {
        *self = self.clone().add(cookie);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), CookieError> {
        *self = self.clone().remove(removal_cookie(name));
        Ok(())
    }
}

fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .build()
}

/// Binds [`TokenService`] to the session cookie.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tokens: TokenService,
    cookie_name: String,
    secure: bool,
}

impl SessionStore {
    /// Cookie `session`, `Secure` on.
    #[must_use]
    pub fn new(tokens: TokenService) -> Self {
        Self {
            tokens,
            cookie_name: SESSION_COOKIE_NAME.into(),
            secure: true,
        }
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// `Secure` attribute; turn off only for plaintext local development.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Issue a token for `session` and store it in the cookie.
    ///
    /// Returns the token for immediate in-process use.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from `cookies`.
    pub fn create_session<C: SessionCookies>(
        &self,
        cookies: &mut C,
        session: &NewSession,
        now: OffsetDateTime,
    ) -> Result<IssuedToken, CookieError> {
        let issued = self.tokens.issue(session, now);
        cookies.write(self.session_cookie(&issued.value, issued.expires_at))?;
        tracing::info!(subject = %session.subject_id, "Session created");
        Ok(issued)
    }

    /// Store an already-formed token value (legacy mock tokens) with the
    /// standard attributes and lifetime.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from `cookies`.
    pub fn store_raw<C: SessionCookies>(
        &self,
        cookies: &mut C,
        value: &str,
        now: OffsetDateTime,
    ) -> Result<(), CookieError> {
        cookies.write(self.session_cookie(value, now + self.tokens.ttl()))
    }

    /// The verified user behind the session cookie, if any.
    ///
    /// An absent cookie is `Ok(None)`. A cookie that fails verification is
    /// deleted and also yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Only [`CookieError::Deferred`] is returned; every other transport
    /// failure is logged and treated as "no session".
    pub fn get_session<C: SessionCookies>(
        &self,
        cookies: &mut C,
        now: OffsetDateTime,
    ) -> Result<Option<SessionUser>, CookieError> {
        let raw = match cookies.read(&self.cookie_name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(CookieError::Deferred) => return Err(CookieError::Deferred),
            Err(e) => {
                tracing::warn!(error = %e, "Session cookie unreadable");
                return Ok(None);
            }
        };

        match self.tokens.verify(&raw, now) {
            Ok(user) => Ok(Some(user)),
            Err(reason) => {
                tracing::warn!(reason = %reason, "Discarding invalid session cookie");
                match cookies.remove(&self.cookie_name) {
                    Ok(()) => {}
                    Err(CookieError::Deferred) => return Err(CookieError::Deferred),
                    Err(e) => tracing::warn!(error = %e, "Failed to delete session cookie"),
                }
                Ok(None)
            }
        }
    }

    /// Delete the session cookie. Idempotent.
    ///
    /// # Errors
    ///
    /// Propagates transport errors from `cookies`.
    pub fn destroy_session<C: SessionCookies>(&self, cookies: &mut C) -> Result<(), CookieError> {
        cookies.remove(&self.cookie_name)
    }

    fn session_cookie(&self, value: &str, expires_at: OffsetDateTime) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), value.to_string()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/".to_string())
            .expires(expires_at)
            .build()
    }
}
