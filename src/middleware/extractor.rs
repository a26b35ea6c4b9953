use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use time::OffsetDateTime;

use super::error::AuthError;
use crate::session::SessionStore;
use crate::types::SessionUser;

/// Authenticated user extracted from the session cookie.
///
/// Use as an Axum extractor in route handlers. Returns `401 Unauthorized`
/// if no valid session exists, deleting the session cookie when one was sent
/// but failed verification. Works with any state that a
/// [`SessionStore`] can be taken from.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}", user.pseudonym)
/// }
///
/// // Optional: accessible to both authenticated and anonymous users
/// async fn public(user: Option<CurrentUser>) -> impl IntoResponse {
///     match user {
///         Some(CurrentUser(u)) => format!("Hello, {}", u.pseudonym),
///         None => "Hello, guest".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionUser);

impl<St> FromRequestParts<St> for CurrentUser
where
    SessionStore: FromRef<St>,
    St: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_ref(state);
        match lookup(&store, parts)? {
            (Some(user), _) => Ok(CurrentUser(user)),
            (None, true) => Err(AuthError::InvalidSession {
                cookie_name: store.cookie_name().to_owned(),
            }),
            (None, false) => Err(AuthError::Unauthenticated),
        }
    }
}

impl<St> OptionalFromRequestParts<St> for CurrentUser
where
    SessionStore: FromRef<St>,
    St: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &St,
    ) -> Result<Option<Self>, Self::Rejection> {
        let store = SessionStore::from_ref(state);
        // Anonymous access is allowed here, so a bad cookie is left in place.
        Ok(lookup(&store, parts)?.0.map(CurrentUser))
    }
}

/// The session user, and whether a session cookie was sent at all.
fn lookup(store: &SessionStore, parts: &Parts) -> Result<(Option<SessionUser>, bool), AuthError> {
    let mut jar = CookieJar::from_headers(&parts.headers);
    let had_cookie = jar.get(store.cookie_name()).is_some();
    let user = store.get_session(&mut jar, OffsetDateTime::now_utc())?;
    Ok((user, had_cookie))
}
