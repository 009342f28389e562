use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use oidc_auth::error::{Error as AuthError, ErrorKind, OAuthErrorKind};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(AuthError);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.0.error_kind
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Request failed: {}", self.0);
        match self.0.error_kind {
            ErrorKind::OAuth(oauth_error_kind) => match oauth_error_kind {
                OAuthErrorKind::FlowState | OAuthErrorKind::MissingAuthorizationCode => {
                    (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
                }
                OAuthErrorKind::TokenExchange | OAuthErrorKind::UserInfo => {
                    (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
                }
            },
            ErrorKind::Http(_) => (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response(),
            ErrorKind::Session(_) | ErrorKind::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<AuthError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oidc_auth::error::{oauth_error, session_error, SessionErrorKind};

    #[test]
    fn test_flow_state_maps_to_bad_request() {
        let error = Error::from(oauth_error(OAuthErrorKind::FlowState, "no pending attempt"));
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_failures_map_to_bad_gateway() {
        for kind in [OAuthErrorKind::TokenExchange, OAuthErrorKind::UserInfo] {
            let error = Error::from(oauth_error(kind, "provider failure"));
            assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
        }
    }

    #[test]
    fn test_session_failure_maps_to_internal_error() {
        let error = Error::from(session_error(SessionErrorKind::Store, "store offline"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
