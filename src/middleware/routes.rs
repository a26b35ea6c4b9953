use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;

use super::config::AuthRouterConfig;
use super::error::AuthError;
use super::state::RouterState;
use crate::facade::{CredentialStore, Sessions};
use crate::oidc::{AuthState, AuthorizationRequest, CallbackParams, OidcClient};

const DEV_LOGIN_DEFAULT_EMAIL: &str = "dev@example.com";

/// Create the authentication router.
///
/// Routes, relative to the configured auth path (default `/api/auth`):
/// `POST /login`, `GET /verify`, `POST /logout`, `GET /oidc-auth-url`,
/// `POST /oidc-callback`, `GET /env-check`, and in dev mode `GET /dev-login`.
pub fn auth_routes<S>(config: AuthRouterConfig, credentials: S) -> Router
where
    S: CredentialStore,
{
    let auth_path = config.auth_path.clone();
    let dev_mode = config.auth.dev_mode();

    let state = RouterState {
        sessions: Sessions::new(config.auth.session_store(), credentials),
        oidc: config.oidc.map(Arc::new),
        dev_mode,
        login_redirect: config.login_redirect,
    };

    let mut router = Router::new()
        .route(&format!("{auth_path}/login"), post(login::<S>))
        .route(&format!("{auth_path}/verify"), get(verify::<S>))
        .route(&format!("{auth_path}/logout"), post(logout::<S>))
        .route(&format!("{auth_path}/oidc-auth-url"), get(oidc_auth_url::<S>))
        .route(&format!("{auth_path}/oidc-callback"), post(oidc_callback::<S>))
        .route(&format!("{auth_path}/env-check"), get(env_check::<S>));

    if dev_mode {
        router = router.route(&format!("{auth_path}/dev-login"), get(dev_login::<S>));
    }

    router.with_state(state)
}

// ── Local sign-in ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login<S: CredentialStore>(
    State(state): State<RouterState<S>>,
    mut jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<serde_json::Value>), AuthError> {
    let user = state
        .sessions
        .sign_in(&mut jar, &body.email, &body.password)
        .await?;
    Ok((jar, Json(json!({ "ok": true, "user": user }))))
}

// ── Session check ──────────────────────────────────────────────────

async fn verify<S: CredentialStore>(
    State(state): State<RouterState<S>>,
    mut jar: CookieJar,
) -> Result<Response, AuthError> {
    // The jar goes back either way so an invalid cookie is cleared.
    Ok(match state.sessions.current_user(&mut jar)? {
        Some(user) => (jar, Json(json!({ "ok": true, "user": user }))).into_response(),
        None => (StatusCode::UNAUTHORIZED, jar, Json(json!({ "ok": false }))).into_response(),
    })
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<S: CredentialStore>(
    State(state): State<RouterState<S>>,
    mut jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AuthError> {
    state.sessions.sign_out(&mut jar)?;
    Ok((jar, Json(json!({ "ok": true }))))
}

// ── OIDC ───────────────────────────────────────────────────────────

fn oidc_client<S>(state: &RouterState<S>) -> Result<&OidcClient, AuthError> {
    state.oidc.as_deref().ok_or(AuthError::OidcDisabled)
}

async fn oidc_auth_url<S: CredentialStore>(
    State(state): State<RouterState<S>>,
) -> Result<Json<AuthorizationRequest>, AuthError> {
    Ok(Json(oidc_client(&state)?.authorization_url()))
}

#[derive(Deserialize)]
struct OidcCallbackRequest {
    #[serde(flatten)]
    params: CallbackParams,
    /// Auth state the browser kept from `/oidc-auth-url`, if it survived.
    #[serde(default)]
    stored_state: Option<AuthState>,
}

async fn oidc_callback<S: CredentialStore>(
    State(state): State<RouterState<S>>,
    mut jar: CookieJar,
    Json(body): Json<OidcCallbackRequest>,
) -> Result<(CookieJar, Json<serde_json::Value>), AuthError> {
    let client = oidc_client(&state)?;
    let login = client
        .complete_login(&body.params, body.stored_state)
        .await?;
    let user = state
        .sessions
        .sign_in_with_identity(&mut jar, &login.identity)?;

    Ok((
        jar,
        Json(json!({ "ok": true, "user": user, "identity": login.identity })),
    ))
}

async fn env_check<S: CredentialStore>(
    State(state): State<RouterState<S>>,
) -> Json<serde_json::Value> {
    let oidc = state.oidc.as_deref().map(|c| c.config().presence());
    Json(json!({ "dev_mode": state.dev_mode, "oidc": oidc }))
}

// ── Dev Login ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DevLoginParams {
    email: Option<String>,
}

async fn dev_login<S: CredentialStore>(
    State(state): State<RouterState<S>>,
    mut jar: CookieJar,
    Query(params): Query<DevLoginParams>,
) -> Result<(CookieJar, Redirect), AuthError> {
    // No runtime guard needed: route is only registered in dev mode
    let email = params
        .email
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEV_LOGIN_DEFAULT_EMAIL.to_string());

    state.sessions.sign_in_mock(&mut jar, &email)?;
    Ok((jar, Redirect::to(&state.login_redirect)))
}
