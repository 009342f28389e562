//! Keycloak endpoint layout and relying-party client settings.

use secrecy::SecretString;
use url::Url;

use crate::error::{config_error, ConfigErrorKind, Error};

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// OpenID Connect endpoints of one Keycloak realm.
///
/// The authorization and logout endpoints are reached by the browser, so they
/// use the public base URL. Token and userinfo calls are made by this server
/// and may go through a separate back-channel base URL (for example the
/// container hostname inside a compose network).
#[derive(Debug, Clone, PartialEq)]
pub struct KeycloakEndpoints {
    pub authorization: Url,
    pub token: Url,
    pub userinfo: Url,
    pub logout: Url,
}

impl KeycloakEndpoints {
    /// Derive the realm endpoints from the Keycloak base URL(s).
    ///
    /// # Arguments
    ///
    /// * `public_base` - Browser-facing Keycloak URL, e.g. `http://localhost:8080`
    /// * `backchannel_base` - Optional server-to-server Keycloak URL
    /// * `realm` - Realm name
    pub fn new(public_base: &str, backchannel_base: Option<&str>, realm: &str) -> Result<Self, Error> {
        let public_base = Url::parse(public_base)?;
        let backchannel_base = match backchannel_base {
            Some(base) => Url::parse(base)?,
            None => public_base.clone(),
        };

        Ok(Self {
            authorization: realm_endpoint(&public_base, realm, "auth")?,
            token: realm_endpoint(&backchannel_base, realm, "token")?,
            userinfo: realm_endpoint(&backchannel_base, realm, "userinfo")?,
            logout: realm_endpoint(&public_base, realm, "logout")?,
        })
    }

    /// RP-initiated logout URL that returns the browser to `post_logout_redirect_uri`.
    pub fn logout_url(&self, client_id: &str, post_logout_redirect_uri: &str) -> Url {
        let mut url = self.logout.clone();
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("post_logout_redirect_uri", post_logout_redirect_uri);
        url
    }
}

fn realm_endpoint(base: &Url, realm: &str, endpoint: &str) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            config_error(
                ConfigErrorKind::InvalidUrl,
                &format!("{base} cannot be used as a base URL"),
            )
        })?
        .pop_if_empty()
        .extend(["realms", realm, "protocol", "openid-connect", endpoint]);
    Ok(url)
}

/// Credentials and registration data of this relying party.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: Url,
    pub scopes: Vec<String>,
}

impl ClientSettings {
    /// Create client settings requesting the default `openid email profile` scopes.
    pub fn new(
        client_id: String,
        client_secret: SecretString,
        redirect_uri: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            client_id,
            client_secret,
            redirect_uri: Url::parse(redirect_uri)?,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the requested scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Space-delimited scope parameter value.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}
