//! Self-issued session tokens.
//!
//! Signed tokens have the JWT-like shape
//! `base64url(header) "." base64url(payload) "." base64url(hmac)`, where the
//! HMAC covers the first two segments exactly as transmitted.
//!
//! Legacy development tokens have the shape
//! `mock_token_<hex-hash>_<unix-ms>_<identity>` and carry no signature. They
//! are recognized once at parse time ([`PresentedToken`]) and only honoured
//! when the verifier has them enabled.

use serde::{Deserialize, Serialize};
use md5::{Digest, Md5};
use time::{Duration, OffsetDateTime};

use crate::codec;
use crate::error::VerifyError;
use crate::pseudonym::{self, normalize_identity};
use crate::signer::{Signer, SigningSecret};
use crate::types::{NewSession, SessionKind, SessionSource, SessionUser, SubjectId};

/// Lifetime of a signed session token and its cookie.
pub const SESSION_TTL: Duration = Duration::days(7);

const ALG: &str = "HS256";
const TYP: &str = "JWT";

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Payload of a signed token.
///
/// `pid` is informational: verification always re-derives the pseudonym
/// from `identity`.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    sub: SubjectId,
    pid: String,
    identity: String,
    kind: SessionKind,
    iat: i64,
    exp: i64,
}

/// A freshly issued token and its absolute expiry.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct IssuedToken {
    pub value: String,
    pub expires_at: OffsetDateTime,
}

/// A token as presented by a client, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentedToken<'a> {
    Signed(SignedToken<'a>),
    Mock(MockToken),
}

impl<'a> PresentedToken<'a> {
    /// Classify a raw cookie value.
    ///
    /// Anything starting with the mock prefix is parsed as a mock token and
    /// nothing else, so a malformed mock token never reaches the signed path
    /// and a signed token can never be reinterpreted as a mock one.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::MalformedToken`] if the value has neither shape.
    pub fn parse(raw: &'a str) -> Result<Self, VerifyError> {
        if let Some(rest) = raw.strip_prefix(MockToken::PREFIX) {
            return MockToken::parse_fields(rest).map(Self::Mock);
        }
        SignedToken::parse(raw).map(Self::Signed)
    }
}

/// The three segments of a signed token, still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> SignedToken<'a> {
    fn parse(raw: &'a str) -> Result<Self, VerifyError> {
        let mut parts = raw.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VerifyError::MalformedToken);
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(VerifyError::MalformedToken);
        }
        Ok(Self {
            header,
            payload,
            signature,
        })
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

/// Legacy unsigned development token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockToken {
    pub hash: String,
    pub issued_at_ms: i64,
    pub identity: String,
}

impl MockToken {
    pub const PREFIX: &'static str = "mock_token_";

    /// Mint a mock token for `identity` at `now`.
    ///
    /// The hash field is the hex MD5 of `identity` exactly as given; the
    /// identity field is its normalized form.
    #[must_use]
    pub fn mint(identity: &str, now: OffsetDateTime) -> Self {
        let issued_at_ms =
            i64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX);
        Self {
            hash: hex::encode(Md5::digest(identity.as_bytes())),
            issued_at_ms,
            identity: normalize_identity(identity),
        }
    }

    /// Parse `<hash>_<ms>_<identity>`. The identity may itself contain `_`.
    fn parse_fields(rest: &str) -> Result<Self, VerifyError> {
        let mut fields = rest.splitn(3, '_');
        let (Some(hash), Some(timestamp), Some(identity)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(VerifyError::MalformedToken);
        };
        if hash.is_empty() || !hash.bytes().all(|b| b.is_ascii_hexdigit()) || identity.is_empty()
        {
            return Err(VerifyError::MalformedToken);
        }
        let issued_at_ms = timestamp
            .parse::<i64>()
            .map_err(|_| VerifyError::MalformedToken)?;
        Ok(Self {
            hash: hash.to_string(),
            issued_at_ms,
            identity: identity.to_string(),
        })
    }

    pub(crate) fn into_session_user(self) -> SessionUser {
        SessionUser {
            subject_id: SubjectId(self.hash),
            pseudonym: pseudonym::derive(&self.identity),
            identity: self.identity,
            kind: SessionKind::Regular,
            issued_at: self.issued_at_ms.div_euclid(1000),
            expires_at: None,
            source: SessionSource::Mock,
        }
    }
}

impl std::fmt::Display for MockToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}_{}_{}",
            Self::PREFIX,
            self.hash,
            self.issued_at_ms,
            self.identity
        )
    }
}

/// Issues and verifies session tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    signer: Signer,
    ttl: Duration,
    accept_mock_tokens: bool,
}

impl TokenService {
    /// Signed tokens only, 7-day lifetime.
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            signer: Signer::new(secret),
            ttl: SESSION_TTL,
            accept_mock_tokens: false,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Honour legacy `mock_token_…` values. Development only.
    #[must_use]
    pub fn with_mock_tokens(mut self, accept: bool) -> Self {
        self.accept_mock_tokens = accept;
        self
    }

    #[must_use]
    pub fn accepts_mock_tokens(&self) -> bool {
        self.accept_mock_tokens
    }

    /// Token lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token valid from `now` for the configured lifetime.
    ///
    /// # Panics
    ///
    /// Never in practice: header and payload are plain structs that always
    /// serialize.
    #[must_use]
    pub fn issue(&self, session: &NewSession, now: OffsetDateTime) -> IssuedToken {
        let expires_at = now + self.ttl;
        let header = TokenHeader {
            alg: ALG.into(),
            typ: TYP.into(),
        };
        let payload = TokenPayload {
            sub: session.subject_id.clone(),
            pid: pseudonym::derive(&session.identity).to_string(),
            identity: session.identity.clone(),
            kind: session.kind,
            iat: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let header_json = serde_json::to_vec(&header).expect("token header must serialize");
        let payload_json = serde_json::to_vec(&payload).expect("token payload must serialize");
        let signing_input = format!(
            "{}.{}",
            codec::encode(header_json),
            codec::encode(payload_json)
        );
        let signature = self.signer.sign(signing_input.as_bytes());

        IssuedToken {
            value: format!("{signing_input}.{}", codec::encode(signature)),
            expires_at,
        }
    }

    /// Verify a presented token at `now`.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::MalformedToken`]: not three non-empty segments, or a
    ///   mock-prefixed value with missing fields.
    /// - [`VerifyError::BadSignature`]: signature does not match the first
    ///   two segments.
    /// - [`VerifyError::MalformedPayload`]: payload is not base64url JSON of
    ///   the expected shape.
    /// - [`VerifyError::Expired`]: `exp` is before `now`.
    /// - [`VerifyError::MockTokensDisabled`]: a well-formed mock token was
    ///   presented but mock tokens are off.
    pub fn verify(&self, raw: &str, now: OffsetDateTime) -> Result<SessionUser, VerifyError> {
        match PresentedToken::parse(raw)? {
            PresentedToken::Signed(token) => self.verify_signed(&token, now),
            PresentedToken::Mock(token) => {
                if !self.accept_mock_tokens {
                    return Err(VerifyError::MockTokensDisabled);
                }
                Ok(token.into_session_user())
            }
        }
    }

    fn verify_signed(
        &self,
        token: &SignedToken<'_>,
        now: OffsetDateTime,
    ) -> Result<SessionUser, VerifyError> {
        let signature =
            codec::decode_bytes(token.signature).map_err(|_| VerifyError::BadSignature)?;
        if !self
            .signer
            .verify(token.signing_input().as_bytes(), &signature)
        {
            return Err(VerifyError::BadSignature);
        }

        let payload_json = codec::decode(token.payload)
            .map_err(|e| VerifyError::MalformedPayload(e.to_string()))?;
        let payload: TokenPayload = serde_json::from_str(&payload_json)
            .map_err(|e| VerifyError::MalformedPayload(e.to_string()))?;

        if payload.exp < now.unix_timestamp() {
            return Err(VerifyError::Expired);
        }

        Ok(SessionUser {
            subject_id: payload.sub,
            pseudonym: pseudonym::derive(&payload.identity),
            identity: payload.identity,
            kind: payload.kind,
            issued_at: payload.iat,
            expires_at: Some(payload.exp),
            source: SessionSource::Signed,
        })
    }
}
