use serde::Serialize;
use url::Url;

use crate::error::Error;

/// Microsoft identity platform authority host.
pub const MICROSOFT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Microsoft Graph profile endpoint, used as the userinfo endpoint.
pub const DEFAULT_USERINFO_URL: &str = "https://graph.microsoft.com/v1.0/me";

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/oidc/callback";

const DEFAULT_SCOPES: [&str; 4] = ["openid", "profile", "email", "User.Read"];

/// OpenID Connect client configuration.
///
/// Endpoints are derived from the authority (`{authority}/oauth2/v2.0/...`)
/// and can be overridden one by one.
///
/// ```rust,ignore
/// use askme_auth::oidc::OidcConfig;
///
/// let config = OidcConfig::for_tenant("my-tenant", "client-id", "https://chat.example.com/oidc/callback".parse()?)?
///     .with_client_secret(std::env::var("OIDC_CLIENT_SECRET")?);
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub struct OidcConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: Option<String>,
    pub(crate) redirect_uri: Url,
    pub(crate) auth_url: Url,
    pub(crate) token_url: Url,
    pub(crate) userinfo_url: Url,
    pub(crate) logout_url: Url,
    pub(crate) scopes: Vec<String>,
    pub(crate) response_mode: String,
}

impl OidcConfig {
    /// Configuration for an arbitrary authority URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the derived endpoint URLs do not parse.
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: Url,
        authority: &Url,
    ) -> Result<Self, Error> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri,
            auth_url: endpoint(authority, "oauth2/v2.0/authorize")?,
            token_url: endpoint(authority, "oauth2/v2.0/token")?,
            logout_url: endpoint(authority, "oauth2/v2.0/logout")?,
            userinfo_url: DEFAULT_USERINFO_URL
                .parse()
                .map_err(|e| Error::Config(format!("userinfo URL: {e}")))?,
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            response_mode: "query".into(),
        })
    }

    /// Configuration for a Microsoft Entra ID tenant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `tenant_id` does not form a valid URL.
    pub fn for_tenant(
        tenant_id: &str,
        client_id: impl Into<String>,
        redirect_uri: Url,
    ) -> Result<Self, Error> {
        let authority: Url = format!("{MICROSOFT_AUTHORITY_HOST}/{tenant_id}")
            .parse()
            .map_err(|e| Error::Config(format!("OIDC authority: {e}")))?;
        Self::new(client_id, redirect_uri, &authority)
    }

    /// Build from environment variables.
    ///
    /// # Required env vars
    /// - `OIDC_CLIENT_ID`
    /// - `OIDC_TENANT_ID`
    ///
    /// # Optional env vars
    /// - `OIDC_CLIENT_SECRET`: without it, code exchange fails with
    ///   [`Error::MissingClientSecret`]
    /// - `OIDC_CALLBACK_URL`: redirect URI (default `http://localhost:3000/oidc/callback`)
    /// - `OIDC_SCOPES`: space- or comma-separated scopes
    /// - `OIDC_AUTH_URL`, `OIDC_TOKEN_URL`, `OIDC_USERINFO_URL`, `OIDC_LOGOUT_URL`:
    ///   endpoint overrides
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required vars are missing or URLs are invalid.
    pub fn from_env() -> Result<Self, Error> {
        let client_id = std::env::var("OIDC_CLIENT_ID")
            .map_err(|_| Error::Config("OIDC_CLIENT_ID is required".into()))?;
        let tenant_id = std::env::var("OIDC_TENANT_ID")
            .map_err(|_| Error::Config("OIDC_TENANT_ID is required".into()))?;
        let redirect_uri = std::env::var("OIDC_CALLBACK_URL")
            .unwrap_or_else(|_| DEFAULT_REDIRECT_URI.to_string());
        let redirect_uri: Url = redirect_uri
            .parse()
            .map_err(|e| Error::Config(format!("OIDC_CALLBACK_URL: {e}")))?;

        let mut config = Self::for_tenant(&tenant_id, client_id, redirect_uri)?;

        if let Ok(secret) = std::env::var("OIDC_CLIENT_SECRET") {
            config = config.with_client_secret(secret);
        }
        if let Some(url) = env_url("OIDC_AUTH_URL")? {
            config = config.with_auth_url(url);
        }
        if let Some(url) = env_url("OIDC_TOKEN_URL")? {
            config = config.with_token_url(url);
        }
        if let Some(url) = env_url("OIDC_USERINFO_URL")? {
            config = config.with_userinfo_url(url);
        }
        if let Some(url) = env_url("OIDC_LOGOUT_URL")? {
            config = config.with_logout_url(url);
        }
        if let Ok(scopes) = std::env::var("OIDC_SCOPES") {
            config = config.with_scopes(
                scopes
                    .split([',', ' '])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect(),
            );
        }

        Ok(config)
    }

    /// Client secret for the code exchange. An empty string counts as unset.
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.client_secret = (!secret.is_empty()).then_some(secret);
        self
    }

    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    #[must_use]
    pub fn with_userinfo_url(mut self, url: Url) -> Self {
        self.userinfo_url = url;
        self
    }

    #[must_use]
    pub fn with_logout_url(mut self, url: Url) -> Self {
        self.logout_url = url;
        self
    }

    /// Override the scopes (default: `openid profile email User.Read`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_response_mode(mut self, mode: impl Into<String>) -> Self {
        self.response_mode = mode.into();
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn has_client_secret(&self) -> bool {
        self.client_secret.is_some()
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn userinfo_url(&self) -> &Url {
        &self.userinfo_url
    }

    #[must_use]
    pub fn logout_url(&self) -> &Url {
        &self.logout_url
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Space-joined scope string as sent on the wire.
    #[must_use]
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    /// Which settings are present, with the secret masked.
    #[must_use]
    pub fn presence(&self) -> ConfigPresence {
        ConfigPresence {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.as_ref().map(|_| "***"),
            redirect_uri: self.redirect_uri.to_string(),
            authorization_endpoint: self.auth_url.to_string(),
        }
    }
}

impl std::fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("userinfo_url", &self.userinfo_url.as_str())
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

/// Configuration report safe to expose on a diagnostics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigPresence {
    pub client_id: String,
    pub client_secret: Option<&'static str>,
    pub redirect_uri: String,
    pub authorization_endpoint: String,
}

fn endpoint(authority: &Url, suffix: &str) -> Result<Url, Error> {
    format!("{}/{suffix}", authority.as_str().trim_end_matches('/'))
        .parse()
        .map_err(|e| Error::Config(format!("OIDC endpoint {suffix}: {e}")))
}

fn env_url(name: &str) -> Result<Option<Url>, Error> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}
