#![cfg(feature = "middleware")]

use askme_auth::middleware::{AuthRouterConfig, CurrentUser, auth_routes};
use askme_auth::{
    AuthConfig, OidcClient, OidcConfig, SessionStore, SigningSecret, StaticCredentials,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn auth_config(dev_mode: bool) -> AuthConfig {
    AuthConfig::new(SigningSecret::new("integration-test-secret").unwrap()).with_dev_mode(dev_mode)
}

fn app(dev_mode: bool) -> Router {
    let config = AuthRouterConfig::new(auth_config(dev_mode)).unwrap();
    auth_routes(config, StaticCredentials::development())
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` part of the response's `Set-Cookie` for the session.
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .map(ToString::to_string)
}

fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

async fn login(app: &Router, email: &str, password: &str) -> Response {
    app.clone()
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "email": email, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response {
    app.clone()
        .oneshot(
            Request::get(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn login_then_verify() {
    let app = app(false);

    let response = login(&app, "admin@example.com", "Pa55w.rd").await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = session_cookie(&response).expect("session cookie set");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Secure"));

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["identity"], "admin@example.com");

    let response = get_with_cookie(&app, "/api/auth/verify", &cookie_pair(&set_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["subject_id"], "1");

    // Pseudonym format: xxxx-xxxxx-xxxx-xxxx
    let pseudonym = body["user"]["pseudonym"].as_str().unwrap();
    let parts: Vec<&str> = pseudonym.split('-').collect();
    assert_eq!(
        parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
        vec![4, 5, 4, 4]
    );
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let response = login(&app(false), "admin@example.com", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn verify_without_cookie_is_unauthorized() {
    let response = app(false)
        .oneshot(Request::get("/api/auth/verify").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "ok": false }));
}

#[tokio::test]
async fn corrupted_cookie_is_cleared() {
    let app = app(false);
    let set_cookie = session_cookie(&login(&app, "user@example.com", "user123").await).unwrap();
    let corrupted = format!("{}tampered", cookie_pair(&set_cookie));

    let response = get_with_cookie(&app, "/api/auth/verify", &corrupted).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cleared = session_cookie(&response).expect("removal cookie");
    assert!(cleared.starts_with("session=;"));
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = app(false);
    let set_cookie = session_cookie(&login(&app, "user@example.com", "user123").await).unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/auth/logout")
                .header(header::COOKIE, cookie_pair(&set_cookie))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).unwrap().starts_with("session=;"));
    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn current_user_extractor_guards_routes() {
    async fn me(CurrentUser(user): CurrentUser) -> String {
        user.identity
    }

    let auth = auth_config(false);
    let store: SessionStore = auth.session_store();
    let app = Router::new()
        .route("/me", get(me))
        .with_state(store)
        .merge(auth_routes(
            AuthRouterConfig::new(auth).unwrap(),
            StaticCredentials::development(),
        ));

    let anonymous = app
        .clone()
        .oneshot(Request::get("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&anonymous).is_none());

    let set_cookie = session_cookie(&login(&app, "admin@example.com", "Pa55w.rd").await).unwrap();
    let response = get_with_cookie(&app, "/me", &cookie_pair(&set_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"admin@example.com");
}

#[tokio::test]
async fn guarded_route_clears_invalid_cookie() {
    async fn me(CurrentUser(user): CurrentUser) -> String {
        user.identity
    }

    let store: SessionStore = auth_config(false).session_store();
    let app = Router::new().route("/me", get(me)).with_state(store);

    let response = get_with_cookie(&app, "/me", "session=a.b.c").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cleared = session_cookie(&response).expect("removal cookie");
    assert!(cleared.starts_with("session=;"));
    assert_eq!(
        body_json(response).await,
        json!({ "ok": false, "error": "Not authenticated" })
    );
}

#[tokio::test]
async fn dev_login_only_in_dev_mode() {
    let response = app(false)
        .oneshot(Request::get("/api/auth/dev-login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = app(true);
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/auth/dev-login?email=tester@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = session_cookie(&response).unwrap();
    assert!(set_cookie.starts_with("session=mock_token_"));
    assert!(!set_cookie.contains("Secure"));

    let response = get_with_cookie(&app, "/api/auth/verify", &cookie_pair(&set_cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["user"]["identity"], "tester@example.com");
    assert_eq!(body["user"]["source"], "mock");
}

#[tokio::test]
async fn mock_cookie_rejected_outside_dev_mode() {
    let app = app(false);
    let cookie = "session=mock_token_0123abcd_1750000000000_dev@example.com";
    let response = get_with_cookie(&app, "/api/auth/verify", cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oidc_routes_disabled_without_config() {
    let response = app(false)
        .oneshot(Request::get("/api/auth/oidc-auth-url").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn oidc_app(base: &str) -> Router {
    let authority: url::Url = format!("{base}/tenant").parse().unwrap();
    let oidc = OidcConfig::new(
        "test-client",
        "https://chat.example.com/oidc/callback".parse().unwrap(),
        &authority,
    )
    .unwrap()
    .with_client_secret("s3cret")
    .with_userinfo_url(format!("{base}/me").parse().unwrap());

    let config = AuthRouterConfig::new(auth_config(false).with_oidc(oidc.clone()))
        .unwrap()
        .with_oidc_client(OidcClient::new(oidc).unwrap());
    auth_routes(config, StaticCredentials::new())
}

#[tokio::test]
async fn oidc_callback_creates_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-123",
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "entra-42",
            "displayName": "Grace Hopper",
            "mail": null,
            "userPrincipalName": "grace@contoso.com"
        })))
        .mount(&server)
        .await;
    let app = oidc_app(&server.uri());

    let response = app
        .clone()
        .oneshot(Request::get("/api/auth/oidc-auth-url").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let auth = body_json(response).await;
    assert!(auth["url"].as_str().unwrap().contains("prompt=select_account"));
    let stored_state = auth["state"].clone();

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/auth/oidc-callback")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "code": "code-1",
                        "state": stored_state["state"],
                        "stored_state": stored_state
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = session_cookie(&response).expect("session cookie set");
    let body = body_json(response).await;
    assert_eq!(body["user"]["subject_id"], "entra-42");
    assert_eq!(body["user"]["identity"], "grace@contoso.com");

    let response = get_with_cookie(&app, "/api/auth/verify", &cookie_pair(&set_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn oidc_provider_error_gets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = oidc_app(&server.uri());

    let response = app
        .oneshot(
            Request::post("/api/auth/oidc-callback")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "error": "access_denied",
                        "error_description": "AADSTS65004: User declined to consent"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(session_cookie(&response).is_none());
    let body = body_json(response).await;
    assert_eq!(body["error"], "authentication failed, please try again");
}

#[tokio::test]
async fn env_check_masks_secret() {
    let app = oidc_app("https://idp.example.com");
    let response = app
        .oneshot(Request::get("/api/auth/env-check").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["oidc"]["client_secret"], "***");
    assert_eq!(body["oidc"]["client_id"], "test-client");
    assert!(!body.to_string().contains("s3cret"));
}
