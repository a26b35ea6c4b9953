use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;

use crate::error::Error;

/// Message shown to users for every OIDC failure; details stay in the logs.
pub const GENERIC_LOGIN_FAILURE: &str = "authentication failed, please try again";

/// Authentication errors for the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session found.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The named session cookie was present but failed verification; the
    /// response deletes it.
    #[error("Not authenticated")]
    InvalidSession { cookie_name: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// OIDC flow error (provider error, token exchange failure, etc.)
    #[error("OIDC error: {0}")]
    Oidc(String),

    /// OIDC is not configured for this deployment.
    #[error("OIDC sign-in is not configured")]
    OidcDisabled,

    /// Session store or cookie operation failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::InvalidSession { cookie_name } = &self {
            let mut removal = Cookie::build((cookie_name.clone(), "")).path("/").build();
            removal.make_removal();
            let body = Json(json!({ "ok": false, "error": self.to_string() }));
            return (StatusCode::UNAUTHORIZED, CookieJar::new().add(removal), body).into_response();
        }
        let (status, message) = match &self {
            Self::Unauthenticated | Self::InvalidSession { .. } | Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Self::Oidc(detail) => {
                tracing::warn!(detail = %detail, "OIDC sign-in failed");
                (StatusCode::BAD_REQUEST, GENERIC_LOGIN_FAILURE.to_string())
            }
            Self::OidcDisabled => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Internal(_) => {
                tracing::error!(error = %self, "Auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };
        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}

impl From<Error> for AuthError {
    fn from(e: Error) -> Self {
        match e {
            Error::InvalidCredentials => Self::InvalidCredentials,
            Error::Verify(_) => Self::Unauthenticated,
            Error::Provider(_)
            | Error::ProviderHttp { .. }
            | Error::ProviderTimeout { .. }
            | Error::MissingClientSecret
            | Error::IncompleteIdentity
            | Error::Http(_) => Self::Oidc(e.to_string()),
            Error::Cookie(_) | Error::Credentials(_) | Error::Config(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<crate::error::CookieError> for AuthError {
    fn from(e: crate::error::CookieError) -> Self {
        Self::Internal(e.to_string())
    }
}
