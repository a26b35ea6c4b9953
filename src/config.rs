use time::Duration;

use crate::error::Error;
#[cfg(feature = "oidc")]
use crate::oidc::OidcConfig;
use crate::session::{SESSION_COOKIE_NAME, SessionStore};
use crate::signer::SigningSecret;
use crate::token::{SESSION_TTL, TokenService};

/// Cookie and token settings for a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub(crate) cookie_name: String,
    pub(crate) ttl: Duration,
    pub(crate) secure_cookies: bool,
    pub(crate) accept_mock_tokens: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.into(),
            ttl: SESSION_TTL,
            secure_cookies: true,
            accept_mock_tokens: false,
        }
    }
}

impl SessionSettings {
    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_mock_tokens(mut self, accept: bool) -> Self {
        self.accept_mock_tokens = accept;
        self
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    #[must_use]
    pub fn accepts_mock_tokens(&self) -> bool {
        self.accept_mock_tokens
    }

    /// Session store signing with `secret`.
    #[must_use]
    pub fn build(&self, secret: &SigningSecret) -> SessionStore {
        let tokens = TokenService::new(secret)
            .with_ttl(self.ttl)
            .with_mock_tokens(self.accept_mock_tokens);
        SessionStore::new(tokens)
            .with_cookie_name(self.cookie_name.clone())
            .with_secure_cookies(self.secure_cookies)
    }
}

/// Top-level authentication configuration.
///
/// Use [`from_env()`](AuthConfig::from_env) for convention-based setup,
/// or [`new()`](AuthConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub(crate) secret: SigningSecret,
    pub(crate) session: SessionSettings,
    pub(crate) dev_mode: bool,
    #[cfg(feature = "oidc")]
    pub(crate) oidc: Option<OidcConfig>,
}

impl AuthConfig {
    /// Production defaults: secure cookies, signed tokens only, no OIDC.
    #[must_use]
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            session: SessionSettings::default(),
            dev_mode: false,
            #[cfg(feature = "oidc")]
            oidc: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Env vars
    /// - `DEV_AUTH`: `"1"` or `"true"` enables dev mode: plaintext cookies,
    ///   the built-in signing secret when `JWT_SECRET` is unset, legacy mock
    ///   tokens, and the dev-login route
    /// - `JWT_SECRET`: signing secret, required outside dev mode
    /// - `OIDC_*`: see [`OidcConfig::from_env`]; OIDC is enabled when
    ///   `OIDC_CLIENT_ID` is set
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        let dev_mode = matches!(
            std::env::var("DEV_AUTH").as_deref(),
            Ok("1") | Ok("true"),
        );

        #[allow(unused_mut)]
        let mut config = Self::new(SigningSecret::from_env(dev_mode)?).with_dev_mode(dev_mode);

        #[cfg(feature = "oidc")]
        {
            if std::env::var("OIDC_CLIENT_ID").is_ok() {
                config = config.with_oidc(OidcConfig::from_env()?);
            } else {
                tracing::info!("OIDC_CLIENT_ID not set; OIDC sign-in disabled");
            }
        }

        Ok(config)
    }

    /// Dev mode switches cookie security and mock-token acceptance together.
    #[must_use]
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self.session = self
            .session
            .with_secure_cookies(!dev_mode)
            .with_mock_tokens(dev_mode);
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: SessionSettings) -> Self {
        self.session = session;
        self
    }

    #[cfg(feature = "oidc")]
    #[must_use]
    pub fn with_oidc(mut self, oidc: OidcConfig) -> Self {
        self.oidc = Some(oidc);
        self
    }

    #[must_use]
    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    #[must_use]
    pub fn session(&self) -> &SessionSettings {
        &self.session
    }

    #[cfg(feature = "oidc")]
    #[must_use]
    pub fn oidc(&self) -> Option<&OidcConfig> {
        self.oidc.as_ref()
    }

    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        self.session.build(&self.secret)
    }
}
