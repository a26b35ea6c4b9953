#![doc = include_str!("../README.md")]

pub mod codec;
pub mod config;
pub mod error;
pub mod facade;
#[cfg(feature = "middleware")]
pub mod middleware;
#[cfg(feature = "oidc")]
pub mod oidc;
pub mod pseudonym;
pub mod random;
pub mod session;
pub mod signer;
pub mod token;
pub mod types;

// Re-exports for convenient access
pub use config::{AuthConfig, SessionSettings};
pub use error::{CookieError, DecodeError, Error, VerifyError};
pub use facade::{CredentialStore, Sessions, StaticCredentials};
#[cfg(feature = "oidc")]
pub use oidc::{
    AuthState, AuthorizationRequest, CallbackParams, CompletedLogin, FlowStage, LoginFlow,
    OidcClient, OidcConfig, ProviderError, ProviderIdentity, TokenResponse,
};
pub use session::{SESSION_COOKIE_NAME, SessionCookies, SessionStore};
pub use signer::{Signer, SigningSecret};
pub use token::{IssuedToken, MockToken, PresentedToken, SESSION_TTL, TokenService};
pub use types::{NewSession, Pseudonym, SessionKind, SessionSource, SessionUser, SubjectId};
