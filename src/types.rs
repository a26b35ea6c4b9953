use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Opaque subject identifier (`sub` claim).
///
/// For local sign-in this is the credential store's user id; for OIDC it is
/// the provider's `sub`; for legacy mock tokens it is the embedded hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct SubjectId(pub String);

/// Display-safe, one-way pseudonym of an identity string.
///
/// Only produced by [`pseudonym::derive`](crate::pseudonym::derive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct Pseudonym(pub(crate) String);

impl Pseudonym {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Session kind tag carried in the token payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SessionKind {
    #[default]
    #[display("regular")]
    Regular,
}

/// Where a verified session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionSource {
    /// HMAC-signed token.
    Signed,
    /// Legacy unsigned `mock_token_…` value.
    Mock,
}

/// What the caller asks the issuer to put into a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub subject_id: SubjectId,
    /// Plain identity string (email or principal name).
    pub identity: String,
    pub kind: SessionKind,
}

impl NewSession {
    #[must_use]
    pub fn new(subject_id: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            subject_id: SubjectId(subject_id.into()),
            identity: identity.into(),
            kind: SessionKind::Regular,
        }
    }
}

/// Normalized identity of the current request, whatever token produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub subject_id: SubjectId,
    /// Re-derived from `identity` on every verification.
    pub pseudonym: Pseudonym,
    pub identity: String,
    pub kind: SessionKind,
    /// Issue time, unix seconds.
    pub issued_at: i64,
    /// Expiry, unix seconds. `None` for legacy mock tokens.
    pub expires_at: Option<i64>,
    pub source: SessionSource,
}
