use crate::error::Error;
use crate::session::FlowSession;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::*;
use oidc_auth::oauth::AuthenticatedIdentity;
use serde_json::json;
use tower_sessions::Session;

pub(crate) struct AuthenticatedUser(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    // Reads the identity a completed sign-in stored in the session. Requests without
    // one are rejected with 401 and a JSON error body.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match FlowSession::new(session).identity().await {
            Ok(Some(identity)) => Ok(AuthenticatedUser(identity)),
            Ok(None) => {
                trace!("No authenticated identity in session");
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Unauthorized" })),
                )
                    .into_response())
            }
            Err(e) => Err(Error::from(e).into_response()),
        }
    }
}
