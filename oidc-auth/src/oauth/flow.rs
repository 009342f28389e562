//! Authorization Code flow with PKCE.
//!
//! One attempt moves through three states, tracked solely by the session's
//! `pkce` slot:
//!
//! ```text
//! NO_PKCE --begin_authorization--> PKCE_PENDING
//! PKCE_PENDING --complete_authorization(ok)--> CONSUMED (slot cleared)
//! PKCE_PENDING --complete_authorization(token error)--> PKCE_PENDING
//! ```

use std::error::Error as StdError;

use log::*;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AuthenticatedIdentity, ClientSettings, KeycloakEndpoints, PkceParameters, PkceVerifier};
use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind, ProviderError};
use crate::session::SessionStore;

/// Session key holding the pending [`PkceParameters`].
pub const PKCE_SESSION_KEY: &str = "pkce";

/// Form body of the token request.
#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    grant_type: &'static str,
    code: &'a str,
    redirect_uri: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    code_verifier: &'a str,
}

/// Successful token endpoint response. Only the access token is used.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: SecretString,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Relying-party side of the authorization code flow.
///
/// Holds only immutable configuration and a connection-pooling HTTP client;
/// all per-attempt state lives in the session passed to each call, so one
/// instance can serve every request concurrently.
#[derive(Debug, Clone)]
pub struct AuthorizationFlow {
    client: ClientSettings,
    endpoints: KeycloakEndpoints,
    http_client: reqwest::Client,
}

impl AuthorizationFlow {
    pub fn new(
        client: ClientSettings,
        endpoints: KeycloakEndpoints,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            endpoints,
            http_client,
        }
    }

    pub fn client(&self) -> &ClientSettings {
        &self.client
    }

    pub fn endpoints(&self) -> &KeycloakEndpoints {
        &self.endpoints
    }

    /// Generate a fresh verifier/challenge pair.
    pub fn generate_pkce_parameters() -> PkceParameters {
        PkceParameters::generate()
    }

    /// Start (or resume) an authorization attempt and return the URL to redirect to.
    ///
    /// A pair already pending in the session is reused, so a double-submitted
    /// login does not orphan the attempt that is in flight.
    pub async fn begin_authorization<S: SessionStore>(&self, session: &S) -> Result<Url, Error> {
        let pkce = match session.get::<PkceParameters>(PKCE_SESSION_KEY).await? {
            Some(pkce) => {
                debug!(
                    "Reusing pending PKCE parameters: challenge={}...",
                    pkce.code_challenge.preview()
                );
                pkce
            }
            None => {
                let pkce = Self::generate_pkce_parameters();
                session.insert(PKCE_SESSION_KEY, pkce.clone()).await?;
                info!(
                    "PKCE generated: challenge={}..., method={}",
                    pkce.code_challenge.preview(),
                    pkce.challenge_method.as_str()
                );
                pkce
            }
        };

        Ok(self.authorization_url(&pkce))
    }

    /// Authorization endpoint URL carrying the client registration and the challenge.
    pub fn authorization_url(&self, pkce: &PkceParameters) -> Url {
        let mut url = self.endpoints.authorization.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client.client_id)
            .append_pair("redirect_uri", self.client.redirect_uri.as_str())
            .append_pair("scope", &self.client.scope())
            .append_pair("code_challenge", pkce.code_challenge.as_str())
            .append_pair("code_challenge_method", pkce.challenge_method.as_str());
        url
    }

    /// Finish the attempt: exchange the code using the pending verifier, then
    /// fetch the user's identity.
    ///
    /// The pending pair is taken from the session in one step. It is put back
    /// only when the token exchange fails; once the provider has accepted the
    /// verifier it is never available again. The identity is returned, not
    /// stored; persisting it is the caller's decision.
    pub async fn complete_authorization<S: SessionStore>(
        &self,
        session: &S,
        authorization_code: &str,
    ) -> Result<AuthenticatedIdentity, Error> {
        if authorization_code.is_empty() {
            return Err(oauth_error(
                OAuthErrorKind::MissingAuthorizationCode,
                "Callback did not include an authorization code",
            ));
        }

        let pkce = session
            .remove::<PkceParameters>(PKCE_SESSION_KEY)
            .await?
            .ok_or_else(|| {
                warn!("Callback received with no pending PKCE parameters in session");
                oauth_error(
                    OAuthErrorKind::FlowState,
                    "No pending authorization attempt for this session",
                )
            })?;

        let tokens = match self.exchange_code(authorization_code, &pkce.code_verifier).await {
            Ok(tokens) => tokens,
            Err(e) => {
                if let Err(restore_err) = session.insert(PKCE_SESSION_KEY, pkce).await {
                    warn!("Failed to restore pending PKCE parameters: {:?}", restore_err);
                }
                return Err(e);
            }
        };
        info!("PKCE parameters consumed by token exchange");

        let identity = self.fetch_user_info(&tokens.access_token).await?;
        info!(
            "User authenticated successfully with PKCE: sub={}",
            identity.subject
        );

        Ok(identity)
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &PkceVerifier,
    ) -> Result<TokenResponse, Error> {
        let request = TokenExchangeRequest {
            grant_type: "authorization_code",
            code,
            redirect_uri: self.client.redirect_uri.as_str(),
            client_id: &self.client.client_id,
            client_secret: self.client.client_secret.expose_secret(),
            code_verifier: code_verifier.as_str(),
        };

        debug!("Exchanging authorization code using PKCE code_verifier");

        let response = self
            .http_client
            .post(self.endpoints.token.clone())
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach token endpoint: {:?}", e);
                flow_error(OAuthErrorKind::TokenExchange, Box::new(e))
            })?;

        let status = response.status();
        if status.is_success() {
            let tokens: TokenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse token response: {:?}", e);
                flow_error(OAuthErrorKind::TokenExchange, Box::new(e))
            })?;
            debug!(
                "Received {} token expiring in {:?}s",
                tokens.token_type.as_deref().unwrap_or("unknown"),
                tokens.expires_in
            );
            Ok(tokens)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!("Token endpoint returned {}: {}", status, body);
            Err(flow_error(
                OAuthErrorKind::TokenExchange,
                provider_failure(status, &body),
            ))
        }
    }

    async fn fetch_user_info(
        &self,
        access_token: &SecretString,
    ) -> Result<AuthenticatedIdentity, Error> {
        let response = self
            .http_client
            .get(self.endpoints.userinfo.clone())
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach userinfo endpoint: {:?}", e);
                flow_error(OAuthErrorKind::UserInfo, Box::new(e))
            })?;

        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                warn!("Failed to parse userinfo response: {:?}", e);
                flow_error(OAuthErrorKind::UserInfo, Box::new(e))
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!("Userinfo endpoint returned {}: {}", status, body);
            Err(flow_error(
                OAuthErrorKind::UserInfo,
                provider_failure(status, &body),
            ))
        }
    }
}

fn flow_error(kind: OAuthErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
    Error {
        source: Some(source),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Prefer the provider's structured error body; fall back to the status line.
fn provider_failure(status: StatusCode, body: &str) -> Box<dyn StdError + Send + Sync> {
    match serde_json::from_str::<ProviderError>(body) {
        Ok(provider_error) => Box::new(provider_error),
        Err(_) => format!("Identity provider responded with {status}").into(),
    }
}
