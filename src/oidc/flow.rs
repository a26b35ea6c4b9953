use serde::Deserialize;

use super::{
    AuthState, AuthorizationRequest, IdTokenClaims, OidcClient, ProviderError, ProviderIdentity,
    TokenResponse,
};
use crate::error::Error;

/// Where a login attempt is in the authorization-code round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Idle,
    AuthorizationRequested,
    CodeReceived,
    TokenExchanged,
    IdentityResolved,
    Failed,
}

/// Query (or JSON) parameters delivered to the redirect callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
    #[serde(default)]
    pub session_state: Option<String>,
}

impl CallbackParams {
    #[must_use]
    pub fn with_code(code: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            state: Some(state.into()),
            ..Self::default()
        }
    }

    /// The provider's error report, if the callback carries one.
    #[must_use]
    pub fn provider_error(&self) -> Option<ProviderError> {
        let pairs = [
            ("error", &self.error),
            ("error_description", &self.error_description),
            ("error_uri", &self.error_uri),
        ];
        ProviderError::from_pairs(
            pairs
                .into_iter()
                .filter_map(|(k, v)| v.clone().map(|v| (k, v))),
        )
    }
}

/// Result of a successful callback.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CompletedLogin {
    pub identity: ProviderIdentity,
    pub tokens: TokenResponse,
}

/// One login attempt, driven through [`FlowStage`]s.
///
/// A flow completes at most once; any error moves it to
/// [`FlowStage::Failed`] and records the stage it failed in.
#[derive(Debug)]
pub struct LoginFlow<'a> {
    client: &'a OidcClient,
    stored: Option<AuthState>,
    stage: FlowStage,
    failed_at: Option<FlowStage>,
}

impl<'a> LoginFlow<'a> {
    pub(super) fn new(client: &'a OidcClient) -> Self {
        Self {
            client,
            stored: None,
            stage: FlowStage::Idle,
            failed_at: None,
        }
    }

    pub(super) fn resume(client: &'a OidcClient, stored: Option<AuthState>) -> Self {
        Self {
            client,
            stored,
            stage: FlowStage::AuthorizationRequested,
            failed_at: None,
        }
    }

    #[must_use]
    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    /// Stage the flow was in when it failed.
    #[must_use]
    pub fn failed_at(&self) -> Option<FlowStage> {
        self.failed_at
    }

    /// Build the authorization URL and remember its state for this flow.
    pub fn authorize(&mut self) -> AuthorizationRequest {
        let request = self.client.authorization_url();
        self.stored = Some(request.state.clone());
        self.stage = FlowStage::AuthorizationRequested;
        request
    }

    /// Process the redirect callback: provider error check, code exchange,
    /// then profile lookup.
    ///
    /// Without a stored auth state, [`AuthState::fallback`] stands in.
    ///
    /// # Errors
    ///
    /// - [`Error::Provider`] when the callback reports an error, lacks
    ///   `code` or `state`, arrives before [`authorize`](Self::authorize) on a
    ///   fresh flow, or the flow has already finished,
    /// - any error from [`OidcClient::exchange_code`] or
    ///   [`OidcClient::user_info`].
    pub async fn complete(&mut self, params: &CallbackParams) -> Result<CompletedLogin, Error> {
        match self.stage {
            FlowStage::Idle => {
                return Err(self.fail(Error::Provider(invalid_request(
                    "callback received before authorization was requested",
                ))));
            }
            FlowStage::IdentityResolved | FlowStage::Failed => {
                return Err(Error::Provider(invalid_request("login flow already finished")));
            }
            _ => {}
        }

        if let Some(err) = params.provider_error() {
            tracing::warn!(
                error = %err.error,
                description = ?err.error_description,
                "Identity provider returned an error on callback"
            );
            return Err(self.fail(Error::Provider(err)));
        }

        let (Some(code), Some(returned_state)) = (
            params.code.as_deref().filter(|c| !c.is_empty()),
            params.state.as_deref().filter(|s| !s.is_empty()),
        ) else {
            return Err(self.fail(Error::Provider(invalid_request(
                "callback is missing code or state",
            ))));
        };
        self.stage = FlowStage::CodeReceived;

        let stored = match self.stored.take() {
            Some(stored) => stored,
            None => AuthState::fallback(returned_state, self.client.config().redirect_uri()),
        };

        let tokens = match self.client.exchange_code(code, returned_state, &stored).await {
            Ok(tokens) => tokens,
            Err(e) => return Err(self.fail(e)),
        };
        self.stage = FlowStage::TokenExchanged;

        if let Some(id_token) = &tokens.id_token {
            check_nonce(id_token, &stored);
        }

        let identity = match self.client.user_info(&tokens.access_token).await {
            Ok(identity) => identity,
            Err(e) => return Err(self.fail(e)),
        };
        self.stage = FlowStage::IdentityResolved;

        tracing::info!(sub = %identity.sub, "OIDC login completed");
        Ok(CompletedLogin { identity, tokens })
    }

    fn fail(&mut self, error: Error) -> Error {
        tracing::warn!(stage = ?self.stage, error = %error, "OIDC login failed");
        self.failed_at = Some(self.stage);
        self.stage = FlowStage::Failed;
        error
    }
}

fn invalid_request(description: &str) -> ProviderError {
    ProviderError {
        error: "invalid_request".into(),
        error_description: Some(description.into()),
        error_uri: None,
    }
}

// Advisory only: the identity comes from the userinfo endpoint.
fn check_nonce(id_token: &str, stored: &AuthState) {
    if stored.is_fallback() {
        return;
    }
    match IdTokenClaims::decode_unverified(id_token) {
        Ok(claims) if claims.nonce.as_deref() == Some(stored.nonce.as_str()) => {}
        Ok(claims) => tracing::warn!(
            expected = %stored.nonce,
            received = ?claims.nonce,
            "ID token nonce does not match auth state"
        ),
        Err(e) => tracing::debug!(error = %e, "ID token payload unreadable"),
    }
}
