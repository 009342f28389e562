//! Error types for the `oidc-auth` crate.
//!
//! Follows the workspace pattern of a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

use serde::Deserialize;

/// Top-level error type for oidc-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oidc-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    Session(SessionErrorKind),
    Config(ConfigErrorKind),
    Http(HttpErrorKind),
}

/// Errors from the authorization code flow.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// Callback arrived with no pending PKCE parameters in the session
    /// (expired session, forged or replayed callback).
    FlowState,
    /// Callback arrived without an authorization code.
    MissingAuthorizationCode,
    /// The token endpoint rejected the code or could not be reached.
    TokenExchange,
    /// The userinfo endpoint failed after a successful token exchange.
    UserInfo,
}

/// Errors from the session store collaborator.
#[derive(Debug, PartialEq)]
pub enum SessionErrorKind {
    Load,
    Store,
}

/// Errors from flow configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    InvalidUrl,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

/// Error body returned by the identity provider (RFC 6749 section 5.2).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderError {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

impl StdError for ProviderError {}

impl Error {
    /// The provider-supplied error body, when the failure carried one.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<ProviderError>())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind)?,
            ErrorKind::Session(kind) => write!(f, "Session error: {:?}", kind)?,
            ErrorKind::Config(kind) => write!(f, "Config error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        if let Some(provider_error) = self.provider_error() {
            write!(f, " ({})", provider_error)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Config(ConfigErrorKind::InvalidUrl),
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create session store errors.
pub fn session_error<E>(kind: SessionErrorKind, err: E) -> Error
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    Error {
        source: Some(err.into()),
        error_kind: ErrorKind::Session(kind),
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}
