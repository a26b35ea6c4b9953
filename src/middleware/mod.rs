//! Plug-and-play session authentication for Axum.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use askme_auth::StaticCredentials;
//! use askme_auth::middleware::{AuthRouterConfig, CurrentUser, auth_routes};
//!
//! // 1. Configure from environment (JWT_SECRET, DEV_AUTH, OIDC_*)
//! let config = AuthRouterConfig::from_env()?;
//!
//! // 2. Mount auth routes with your CredentialStore
//! let app = axum::Router::new()
//!     .merge(auth_routes(config, StaticCredentials::development()));
//!
//! // 3. Take `CurrentUser` (or `Option<CurrentUser>`) in protected handlers
//! ```

mod config;
mod error;
mod extractor;
mod routes;
mod state;

pub use config::AuthRouterConfig;
pub use error::{AuthError, GENERIC_LOGIN_FAILURE};
pub use extractor::CurrentUser;
pub use routes::auth_routes;
