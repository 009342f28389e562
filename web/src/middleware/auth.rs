use crate::controller::found;
use crate::error::Error;
use crate::session::FlowSession;
use axum::{extract::Request, middleware::Next, response::IntoResponse, response::Response};
use tower_sessions::Session;

/// Page guard that sends signed-out browsers to `/login`.
///
/// API routes use the `AuthenticatedUser` extractor instead, which answers 401.
pub async fn require_login(session: Session, request: Request, next: Next) -> Response {
    match FlowSession::new(session).identity().await {
        Ok(Some(_identity)) => next.run(request).await,
        Ok(None) => found("/login"),
        Err(e) => Error::from(e).into_response(),
    }
}
