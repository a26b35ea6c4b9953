/// Failure to decode a base64url token segment.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("segment is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Why a presented session token was rejected.
///
/// Every variant collapses to "no session" at the session-store boundary;
/// the distinction only exists for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed token")]
    MalformedToken,
    #[error("bad signature")]
    BadSignature,
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("token expired")]
    Expired,
    #[error("legacy mock tokens are disabled")]
    MockTokensDisabled,
}

/// Errors raised by the cookie transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    /// The host asked to defer rendering while cookies were read.
    /// Never swallowed: it must reach the host unchanged.
    #[error("rendering deferred by host")]
    Deferred,
    #[error("cookie storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("token verification error: {0}")]
    Verify(#[from] VerifyError),
    #[error("cookie error: {0}")]
    Cookie(#[from] CookieError),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("credential store error: {0}")]
    Credentials(String),
    #[error("provider identity has no email or principal name")]
    IncompleteIdentity,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("OIDC client secret is not configured")]
    MissingClientSecret,
    #[error("{operation} failed with HTTP {status}: {detail}")]
    ProviderHttp {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    #[error("{operation} timed out")]
    ProviderTimeout { operation: &'static str },
    #[cfg(feature = "oidc")]
    #[error("identity provider returned an error: {0}")]
    Provider(crate::oidc::ProviderError),
    #[cfg(feature = "oidc")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
