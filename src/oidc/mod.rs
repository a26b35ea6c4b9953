//! OpenID Connect authorization-code sign-in.
//!
//! The browser-side correlation record ([`AuthState`]) is handed to the
//! caller when the authorization URL is built and must come back with the
//! callback; the server keeps nothing between the two requests.

mod config;
mod flow;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use config::{ConfigPresence, DEFAULT_REDIRECT_URI, DEFAULT_USERINFO_URL, OidcConfig};
pub use flow::{CallbackParams, CompletedLogin, FlowStage, LoginFlow};

use crate::codec;
use crate::error::{Error, VerifyError};
use crate::random;

/// Ceiling for every call to the identity provider.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Nonce used when the stored auth state was lost and had to be rebuilt.
pub const FALLBACK_NONCE: &str = "fallback-nonce";

/// Per-attempt correlation record, persisted client-side for the round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub state: String,
    pub nonce: String,
    pub redirect_uri: String,
}

impl AuthState {
    /// Deterministic stand-in when client storage lost the real record.
    ///
    /// Echoes the returned `state`, so the CSRF check passes trivially: the
    /// resulting login has no CSRF protection.
    #[must_use]
    pub fn fallback(returned_state: &str, redirect_uri: &url::Url) -> Self {
        tracing::warn!(
            "No stored OIDC auth state; using fallback state (CSRF correlation unavailable)"
        );
        Self {
            state: returned_state.to_string(),
            nonce: FALLBACK_NONCE.into(),
            redirect_uri: redirect_uri.to_string(),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.nonce == FALLBACK_NONCE
    }
}

/// Authorization URL plus the state record the caller must persist.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: AuthState,
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Profile as returned by Microsoft Graph `/me` or a standard userinfo
/// endpoint; both claim spellings are accepted.
#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(alias = "sub")]
    id: String,
    #[serde(default, rename = "displayName", alias = "name")]
    display_name: Option<String>,
    #[serde(default, alias = "email")]
    mail: Option<String>,
    #[serde(default, rename = "userPrincipalName", alias = "preferred_username")]
    user_principal_name: Option<String>,
    #[serde(default, rename = "givenName", alias = "given_name")]
    given_name: Option<String>,
    #[serde(default, alias = "family_name")]
    surname: Option<String>,
    #[serde(default, rename = "preferredLanguage", alias = "locale")]
    preferred_language: Option<String>,
}

/// Normalized identity of the provider account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ProviderIdentity {
    pub sub: String,
    pub name: Option<String>,
    /// Mail address, or the principal name when the account has no mailbox.
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub preferred_username: Option<String>,
    pub locale: Option<String>,
}

impl ProviderIdentity {
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            name: None,
            email: None,
            given_name: None,
            family_name: None,
            preferred_username: None,
            locale: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl From<ProfileResponse> for ProviderIdentity {
    fn from(p: ProfileResponse) -> Self {
        Self {
            sub: p.id,
            name: p.display_name,
            email: p
                .mail
                .filter(|m| !m.is_empty())
                .or_else(|| p.user_principal_name.clone()),
            given_name: p.given_name,
            family_name: p.surname,
            preferred_username: p.user_principal_name,
            locale: p.preferred_language,
        }
    }
}

/// Error reported by the provider on the redirect callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub error: String,
    pub error_description: Option<String>,
    pub error_uri: Option<String>,
}

impl ProviderError {
    /// Extract `error` / `error_description` / `error_uri` from callback
    /// parameters. `None` when there is no (non-empty) `error`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut error = None;
        let mut error_description = None;
        let mut error_uri = None;
        for (key, value) in pairs {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "error" => error = Some(value),
                "error_description" => error_description = Some(value),
                "error_uri" => error_uri = Some(value),
                _ => {}
            }
        }
        Some(Self {
            error: error?,
            error_description,
            error_uri,
        })
    }

    /// Parse a raw query string (`a=b&c=d`).
    #[must_use]
    pub fn from_query(query: &str) -> Option<Self> {
        Self::from_pairs(url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()))
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {desc}", self.error),
            None => f.write_str(&self.error),
        }
    }
}

/// Unverified view of an ID token's payload. Diagnostics only: the
/// signature is not checked.
#[derive(Debug, Clone, Default, Deserialize)]
#[non_exhaustive]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

impl IdTokenClaims {
    /// Decode the middle segment of a JWT without verifying it.
    ///
    /// # Errors
    ///
    /// [`VerifyError::MalformedToken`] if the token is not three segments,
    /// [`VerifyError::MalformedPayload`] if the payload is not JSON.
    pub fn decode_unverified(id_token: &str) -> Result<Self, VerifyError> {
        let parts: Vec<&str> = id_token.split('.').collect();
        if parts.len() != 3 {
            return Err(VerifyError::MalformedToken);
        }
        let json =
            codec::decode(parts[1]).map_err(|e| VerifyError::MalformedPayload(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| VerifyError::MalformedPayload(e.to_string()))
    }
}

/// OIDC client for one provider registration.
#[derive(Debug)]
pub struct OidcClient {
    config: OidcConfig,
    http: reqwest::Client,
}

impl OidcClient {
    /// Client with a [`PROVIDER_TIMEOUT`] ceiling on every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: OidcConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &OidcConfig {
        &self.config
    }

    /// Start a login flow from scratch.
    #[must_use]
    pub fn login_flow(&self) -> LoginFlow<'_> {
        LoginFlow::new(self)
    }

    /// Resume a login flow on the callback request, with whatever auth
    /// state the client managed to keep.
    #[must_use]
    pub fn resume_login(&self, stored: Option<AuthState>) -> LoginFlow<'_> {
        LoginFlow::resume(self, stored)
    }

    /// Drive a callback to completion in one call.
    ///
    /// # Errors
    ///
    /// See [`LoginFlow::complete`].
    pub async fn complete_login(
        &self,
        params: &CallbackParams,
        stored: Option<AuthState>,
    ) -> Result<CompletedLogin, Error> {
        self.resume_login(stored).complete(params).await
    }

    /// Build the provider authorization URL with fresh `state` and `nonce`.
    #[must_use]
    pub fn authorization_url(&self) -> AuthorizationRequest {
        let state = AuthState {
            state: random::generate_state(),
            nonce: random::generate_nonce(),
            redirect_uri: self.config.redirect_uri.to_string(),
        };

        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope())
            .append_pair("redirect_uri", &state.redirect_uri)
            .append_pair("response_mode", &self.config.response_mode)
            .append_pair("state", &state.state)
            .append_pair("nonce", &state.nonce)
            .append_pair("prompt", "select_account");

        tracing::debug!(endpoint = %self.config.auth_url, "Built OIDC authorization URL");

        AuthorizationRequest {
            url: url.into(),
            state,
        }
    }

    /// Exchange an authorization code for provider tokens.
    ///
    /// A `returned_state` that differs from `stored.state` is logged and
    /// tolerated. The `redirect_uri` sent is the one stored for this attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingClientSecret`] before any request is made,
    /// - [`Error::ProviderTimeout`] when the provider exceeds the timeout,
    /// - [`Error::ProviderHttp`] on a non-success status,
    /// - [`Error::Http`] on other transport or decode failures.
    pub async fn exchange_code(
        &self,
        code: &str,
        returned_state: &str,
        stored: &AuthState,
    ) -> Result<TokenResponse, Error> {
        const OPERATION: &str = "token exchange";

        if returned_state != stored.state {
            tracing::warn!(
                expected = %stored.state,
                received = %returned_state,
                "OIDC state mismatch; proceeding with token exchange"
            );
        }

        let Some(client_secret) = self.config.client_secret.as_deref() else {
            tracing::error!("OIDC client secret is not configured; cannot exchange code");
            return Err(Error::MissingClientSecret);
        };

        let scope = self.config.scope();
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", client_secret),
            ("scope", scope.as_str()),
            ("code", code),
            ("redirect_uri", stored.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| transport_error(e, OPERATION))?;

        let response = Self::ensure_success(response, OPERATION).await?;
        let tokens = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| transport_error(e, OPERATION))?;

        tracing::debug!(
            access_token_len = tokens.access_token.len(),
            has_id_token = tokens.id_token.is_some(),
            "OIDC token exchange succeeded"
        );
        Ok(tokens)
    }

    /// Fetch the signed-in account's profile.
    ///
    /// # Errors
    ///
    /// [`Error::ProviderTimeout`], [`Error::ProviderHttp`] or [`Error::Http`].
    pub async fn user_info(&self, access_token: &str) -> Result<ProviderIdentity, Error> {
        const OPERATION: &str = "userinfo request";
        let response = self
            .http
            .get(self.config.userinfo_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport_error(e, OPERATION))?;

        let response = Self::ensure_success(response, OPERATION).await?;
        let profile = response
            .json::<ProfileResponse>()
            .await
            .map_err(|e| transport_error(e, OPERATION))?;
        Ok(profile.into())
    }

    /// Provider end-session URL. Defaults the post-logout target to the
    /// configured redirect URI.
    #[must_use]
    pub fn logout_url(&self, post_logout_redirect_uri: Option<&str>) -> String {
        let target = post_logout_redirect_uri.unwrap_or(self.config.redirect_uri.as_str());
        let mut url = self.config.logout_url.clone();
        url.query_pairs_mut()
            .append_pair("post_logout_redirect_uri", target);
        url.into()
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(operation, status, body = %body, "Identity provider request failed");
        Err(Error::ProviderHttp {
            operation,
            status,
            detail: body,
        })
    }
}

fn transport_error(e: reqwest::Error, operation: &'static str) -> Error {
    if e.is_timeout() {
        tracing::error!(operation, "Identity provider request timed out");
        Error::ProviderTimeout { operation }
    } else {
        tracing::error!(operation, error = %e, "Identity provider request failed");
        Error::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base: &str) -> OidcConfig {
        let authority: url::Url = format!("{base}/tenant").parse().unwrap();
        OidcConfig::new(
            "test-client",
            "https://chat.example.com/oidc/callback".parse().unwrap(),
            &authority,
        )
        .unwrap()
        .with_userinfo_url(format!("{base}/me").parse().unwrap())
    }

    fn client(base: &str) -> OidcClient {
        OidcClient::new(test_config(base).with_client_secret("s3cret")).unwrap()
    }

    fn stored(state: &str) -> AuthState {
        AuthState {
            state: state.into(),
            nonce: "n-1".into(),
            redirect_uri: "https://chat.example.com/oidc/callback".into(),
        }
    }

    fn query_map(url: &str) -> HashMap<String, String> {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .into_owned()
            .collect()
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/tenant/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-123",
                "id_token": "h.p.s",
                "token_type": "Bearer",
                "expires_in": 3600,
                "scope": "openid profile email User.Read"
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let client = client("https://idp.example.com");
        let req = client.authorization_url();
        let params = query_map(&req.url);

        assert!(req.url.starts_with("https://idp.example.com/tenant/oauth2/v2.0/authorize?"));
        assert_eq!(params["client_id"], "test-client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid profile email User.Read");
        assert_eq!(params["redirect_uri"], "https://chat.example.com/oidc/callback");
        assert_eq!(params["response_mode"], "query");
        assert_eq!(params["prompt"], "select_account");
        assert_eq!(params["state"], req.state.state);
        assert_eq!(params["nonce"], req.state.nonce);
        assert_eq!(req.state.redirect_uri, "https://chat.example.com/oidc/callback");
    }

    #[test]
    fn authorization_url_unique_per_call() {
        let client = client("https://idp.example.com");
        let req1 = client.authorization_url();
        let req2 = client.authorization_url();

        assert_ne!(req1.state.state, req2.state.state);
        assert_ne!(req1.state.nonce, req2.state.nonce);
        assert_ne!(req1.state.state, req1.state.nonce);
    }

    #[test]
    fn fallback_state_echoes_returned_state() {
        let redirect: url::Url = "https://chat.example.com/oidc/callback".parse().unwrap();
        let state = AuthState::fallback("abc", &redirect);
        assert_eq!(state.state, "abc");
        assert_eq!(state.nonce, FALLBACK_NONCE);
        assert!(state.is_fallback());
        assert_eq!(state.redirect_uri, "https://chat.example.com/oidc/callback");
    }

    #[test]
    fn provider_error_parsed_from_query() {
        let err = ProviderError::from_query(
            "?error=access_denied&error_description=User%20cancelled&error_uri=https%3A%2F%2Fidp%2Fe&state=x",
        )
        .unwrap();
        assert_eq!(err.error, "access_denied");
        assert_eq!(err.error_description.as_deref(), Some("User cancelled"));
        assert_eq!(err.error_uri.as_deref(), Some("https://idp/e"));
        assert_eq!(err.to_string(), "access_denied: User cancelled");
    }

    #[test]
    fn no_provider_error_without_error_param() {
        assert_eq!(ProviderError::from_query("code=abc&state=xyz"), None);
        assert_eq!(ProviderError::from_query("error=&code=abc"), None);
        assert_eq!(ProviderError::from_pairs([("error_description", "x")]), None);
    }

    #[test]
    fn profile_maps_graph_fields() {
        let profile: ProfileResponse = serde_json::from_value(json!({
            "id": "graph-id",
            "displayName": "Ada Lovelace",
            "mail": null,
            "userPrincipalName": "ada@contoso.onmicrosoft.com",
            "givenName": "Ada",
            "surname": "Lovelace",
            "preferredLanguage": "en-GB"
        }))
        .unwrap();
        let identity = ProviderIdentity::from(profile);
        assert_eq!(identity.sub, "graph-id");
        assert_eq!(identity.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(identity.email.as_deref(), Some("ada@contoso.onmicrosoft.com"));
        assert_eq!(identity.given_name.as_deref(), Some("Ada"));
        assert_eq!(identity.family_name.as_deref(), Some("Lovelace"));
        assert_eq!(identity.locale.as_deref(), Some("en-GB"));
    }

    #[test]
    fn profile_maps_standard_claims() {
        let profile: ProfileResponse = serde_json::from_value(json!({
            "sub": "oidc-sub",
            "name": "Grace",
            "email": "grace@example.com",
            "locale": "th"
        }))
        .unwrap();
        let identity = ProviderIdentity::from(profile);
        assert_eq!(identity.sub, "oidc-sub");
        assert_eq!(identity.email.as_deref(), Some("grace@example.com"));
        assert_eq!(identity.locale.as_deref(), Some("th"));
    }

    #[test]
    fn id_token_claims_decoded_without_verification() {
        let payload = codec::encode(r#"{"sub":"s","nonce":"n-1"}"#);
        let claims = IdTokenClaims::decode_unverified(&format!("e30.{payload}.sig")).unwrap();
        assert_eq!(claims.nonce.as_deref(), Some("n-1"));
        assert!(IdTokenClaims::decode_unverified("only.two").is_err());
    }

    #[test]
    fn logout_url_defaults_to_redirect_uri() {
        let client = client("https://idp.example.com");
        let params = query_map(&client.logout_url(None));
        assert_eq!(
            params["post_logout_redirect_uri"],
            "https://chat.example.com/oidc/callback"
        );
        let params = query_map(&client.logout_url(Some("https://chat.example.com/login")));
        assert_eq!(params["post_logout_redirect_uri"], "https://chat.example.com/login");
    }

    #[tokio::test]
    async fn exchange_posts_form_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant/oauth2/v2.0/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("client_id=test-client"))
            .and(body_string_contains("client_secret=s3cret"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains(
                "redirect_uri=https%3A%2F%2Fchat.example.com%2Foidc%2Fcallback",
            ))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-123",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = client(&server.uri())
            .exchange_code("the-code", "st", &stored("st"))
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "at-123");
    }

    #[tokio::test]
    async fn exchange_proceeds_on_state_mismatch() {
        let server = MockServer::start().await;
        mount_token(&server).await;

        let tokens = client(&server.uri())
            .exchange_code("the-code", "returned", &stored("different"))
            .await
            .unwrap();
        assert_eq!(tokens.access_token, "at-123");
        assert_eq!(tokens.id_token.as_deref(), Some("h.p.s"));
    }

    #[tokio::test]
    async fn exchange_without_secret_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OidcClient::new(test_config(&server.uri())).unwrap();
        let result = client.exchange_code("c", "s", &stored("s")).await;
        assert!(matches!(result, Err(Error::MissingClientSecret)));
    }

    #[tokio::test]
    async fn exchange_error_status_carries_provider_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant/oauth2/v2.0/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":"invalid_grant","error_description":"AADSTS70008"}"#),
            )
            .mount(&server)
            .await;

        let result = client(&server.uri())
            .exchange_code("c", "s", &stored("s"))
            .await;
        match result {
            Err(Error::ProviderHttp {
                operation,
                status,
                detail,
            }) => {
                assert_eq!(operation, "token exchange");
                assert_eq!(status, 400);
                assert!(detail.contains("invalid_grant"));
            }
            other => panic!("expected ProviderHttp, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let client = client(&server.uri()).with_http_client(http);
        let result = client.exchange_code("c", "s", &stored("s")).await;
        assert!(matches!(
            result,
            Err(Error::ProviderTimeout {
                operation: "token exchange"
            })
        ));
    }

    #[tokio::test]
    async fn user_info_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer at-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "displayName": "Admin",
                "mail": "admin@example.com",
                "userPrincipalName": "admin@example.onmicrosoft.com"
            })))
            .mount(&server)
            .await;

        let identity = client(&server.uri()).user_info("at-123").await.unwrap();
        assert_eq!(identity.sub, "u-1");
        assert_eq!(identity.email.as_deref(), Some("admin@example.com"));
        assert_eq!(
            identity.preferred_username.as_deref(),
            Some("admin@example.onmicrosoft.com")
        );
    }

    #[tokio::test]
    async fn user_info_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("InvalidAuthenticationToken"))
            .mount(&server)
            .await;

        let result = client(&server.uri()).user_info("bad").await;
        assert!(matches!(
            result,
            Err(Error::ProviderHttp { status: 401, .. })
        ));
    }
}
