use config::Config;
use log::info;
use oidc_auth::{
    http::HttpClientBuilder,
    oauth::{AuthorizationFlow, ClientSettings, KeycloakEndpoints},
    Error,
};
use std::sync::Arc;
use tokio::time::Duration;

pub mod config;
pub mod logging;

pub fn init_authorization_flow(config: &Config) -> Result<AuthorizationFlow, Error> {
    info!(
        "Keycloak flow config: url={}, internal_url={}, realm={}, client_id={}, redirect_uri={}",
        config.keycloak_url(),
        config.keycloak_internal_url().unwrap_or("<same as url>"),
        config.keycloak_realm(),
        config.keycloak_client_id(),
        config.redirect_uri(),
    );

    let endpoints = KeycloakEndpoints::new(
        config.keycloak_url(),
        config.keycloak_internal_url(),
        config.keycloak_realm(),
    )?;

    let client = ClientSettings::new(
        config.keycloak_client_id().to_string(),
        config.keycloak_client_secret().clone(),
        config.redirect_uri(),
    )?
    .with_scopes(config.scopes());

    let http_client = HttpClientBuilder::new()
        .with_timeout(Duration::from_secs(config.http_timeout_seconds))
        .with_user_agent(format!("keycloak_pkce_rs/{}", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(AuthorizationFlow::new(client, endpoints, http_client))
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub authorization_flow: Arc<AuthorizationFlow>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, flow: &Arc<AuthorizationFlow>) -> Self {
        Self {
            authorization_flow: Arc::clone(flow),
            config: app_config,
        }
    }

    pub fn flow(&self) -> &AuthorizationFlow {
        self.authorization_flow.as_ref()
    }
}
