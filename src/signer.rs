use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

/// Built-in secret for local development only.
///
/// Reachable solely through [`SigningSecret::development`], which
/// [`SigningSecret::from_env`] calls only when dev mode is on.
const DEVELOPMENT_SECRET: &str =
    "askme-super-secret-jwt-key-2025-development-only-change-in-production-8f4a2e1b9c6d3f7a";

/// Shared secret the session signing key is derived from.
#[derive(Clone)]
pub struct SigningSecret {
    bytes: Vec<u8>,
    development: bool,
}

impl SigningSecret {
    /// Wrap a deployment-supplied secret.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, Error> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::Config("signing secret must not be empty".into()));
        }
        if secret == DEVELOPMENT_SECRET {
            tracing::warn!("Configured signing secret equals the built-in development secret");
        }
        Ok(Self {
            development: secret == DEVELOPMENT_SECRET,
            bytes: secret.into_bytes(),
        })
    }

    /// The hard-coded development secret. Never use outside local development.
    #[must_use]
    pub fn development() -> Self {
        tracing::warn!("Using the built-in development signing secret; sessions are forgeable");
        Self {
            bytes: DEVELOPMENT_SECRET.as_bytes().to_vec(),
            development: true,
        }
    }

    /// Read the secret from `JWT_SECRET`.
    ///
    /// When the variable is missing or empty the development secret is used
    /// only if `dev_mode` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `JWT_SECRET` is unset outside dev mode.
    pub fn from_env(dev_mode: bool) -> Result<Self, Error> {
        match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => Self::new(secret),
            _ if dev_mode => Ok(Self::development()),
            _ => Err(Error::Config(
                "JWT_SECRET is required unless DEV_AUTH is enabled".into(),
            )),
        }
    }

    /// Whether this is the built-in development secret.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.development
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("len", &self.bytes.len())
            .field("development", &self.development)
            .finish()
    }
}

/// HMAC-SHA256 signer over the canonical `header.payload` string.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    /// # Panics
    ///
    /// Never: HMAC accepts keys of any length.
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        let mac =
            HmacSha256::new_from_slice(&secret.bytes).expect("HMAC accepts keys of any length");
        Self { mac }
    }

    /// Raw 32-byte signature of `data`.
    #[must_use]
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    /// Constant-time check of `signature` against `data`.
    #[must_use]
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.verify_slice(signature).is_ok()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}
