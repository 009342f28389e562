//! OAuth 2.0 / OpenID Connect authorization code flow.
//!
//! Provides the PKCE-protected flow against a Keycloak realm.

mod flow;
mod identity;
mod pkce;
mod provider;

pub use flow::{AuthorizationFlow, PKCE_SESSION_KEY};
pub use identity::AuthenticatedIdentity;
pub use pkce::{ChallengeMethod, PkceChallenge, PkceParameters, PkceVerifier};
pub use provider::{ClientSettings, KeycloakEndpoints, DEFAULT_SCOPES};
