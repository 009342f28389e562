//! # oidc-auth
//!
//! Relying-party side of the OAuth 2.0 Authorization Code flow with PKCE,
//! targeting a Keycloak realm:
//! - PKCE verifier/challenge generation (RFC 7636, `S256` only)
//! - Authorization URL construction and code-for-token exchange
//! - Userinfo retrieval producing an [`oauth::AuthenticatedIdentity`]
//! - A [`session::SessionStore`] seam so the flow never holds per-request state
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oidc_auth::{
//!     oauth::{AuthorizationFlow, ClientSettings, KeycloakEndpoints},
//!     session::MemorySession,
//! };
//!
//! let session = MemorySession::new();
//! let url = flow.begin_authorization(&session).await?;
//! // ... browser round-trip ...
//! let identity = flow.complete_authorization(&session, &code).await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;
pub mod session;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
