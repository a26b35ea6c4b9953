use crate::config::AuthConfig;
use crate::error::Error;
use crate::oidc::OidcClient;

/// Settings for [`auth_routes`](super::auth_routes).
///
/// Use [`from_env()`](AuthRouterConfig::from_env) for convention-based setup,
/// or [`new()`](AuthRouterConfig::new) with `with_*` methods for full control.
pub struct AuthRouterConfig {
    pub(super) auth: AuthConfig,
    pub(super) oidc: Option<OidcClient>,
    pub(super) auth_path: String,
    pub(super) login_redirect: String,
}

impl AuthRouterConfig {
    /// Router config over `auth`, building an OIDC client if OIDC is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the OIDC HTTP client cannot be built.
    pub fn new(auth: AuthConfig) -> Result<Self, Error> {
        let oidc = auth.oidc().cloned().map(OidcClient::new).transpose()?;
        Ok(Self {
            auth,
            oidc,
            auth_path: "/api/auth".into(),
            login_redirect: "/".into(),
        })
    }

    /// Create config from environment variables.
    ///
    /// See [`AuthConfig::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(AuthConfig::from_env()?)
    }

    /// Replace the OIDC client (custom HTTP client, test provider).
    #[must_use]
    pub fn with_oidc_client(mut self, client: OidcClient) -> Self {
        self.oidc = Some(client);
        self
    }

    /// Mount point of the auth routes (default `/api/auth`).
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    /// Where dev-login redirects after signing in (default `/`).
    #[must_use]
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.login_redirect = path.into();
        self
    }
}
