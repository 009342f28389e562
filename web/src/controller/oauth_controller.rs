//! Controller for the Keycloak sign-in flow.
//!
//! Login, callback and logout are browser redirects, so every success and
//! failure path here answers with `302 Found`.

use crate::controller::found;
use crate::session::{FlowSession, SessionLocks, IDENTITY_SESSION_KEY};
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::response::Response;
use axum::Extension;
use log::*;
use oidc_auth::error::{session_error, ErrorKind, OAuthErrorKind, SessionErrorKind};
use oidc_auth::oauth::AuthenticatedIdentity;
use oidc_auth::session::SessionStore;
use serde::Deserialize;
use tower_sessions::Session;

/// Query parameters Keycloak appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct AuthCallback {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /login
///
/// Starts (or resumes) the PKCE-protected authorization attempt for this session
/// and redirects the browser to Keycloak.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 302, description = "Redirect to the Keycloak authorization endpoint"),
        (status = 500, description = "Session store unavailable"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    session: Session,
) -> Result<Response, Error> {
    let url = app_state
        .flow()
        .begin_authorization(&FlowSession::new(session))
        .await?;

    debug!("Redirecting to Keycloak authorization endpoint");
    Ok(found(url.as_str()))
}

/// GET /auth/callback
///
/// Completes the authorization attempt and signs the user in. Failures are
/// logged and the browser is sent to `/error`.
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code issued by Keycloak"),
        ("error" = Option<String>, Query, description = "Error code when the user or Keycloak aborted"),
    ),
    responses(
        (status = 302, description = "Redirect to /dashboard on success, /error?reason=... otherwise"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Extension(locks): Extension<SessionLocks>,
    session: Session,
    Query(params): Query<AuthCallback>,
) -> Response {
    if let Some(error) = params.error {
        warn!(
            "Keycloak returned an authorization error: {} ({})",
            error,
            params.error_description.as_deref().unwrap_or("no description")
        );
        return found("/error?reason=authorization_denied");
    }
    let code = params.code.unwrap_or_default();

    let outcome = match session.id() {
        Some(id) => {
            let guard = locks.lock(id).await;
            let outcome = sign_in(&app_state, &session, &code).await;
            // The slot change must reach the store before another callback
            // for this session can load it.
            let outcome = persist(&session, outcome).await;
            drop(guard);
            locks.release(&id);
            outcome
        }
        // No stored session, so nothing can be pending; the flow reports it.
        None => sign_in(&app_state, &session, &code).await,
    };

    match outcome {
        Ok(identity) => {
            info!(
                "Authentication successful for {}, redirecting to dashboard",
                identity.display_name()
            );
            found("/dashboard")
        }
        Err(e) => {
            warn!("Authentication failed: {}", e);
            found(&format!("/error?reason={}", failure_reason(&e)))
        }
    }
}

/// Short machine-readable cause shown on the error page.
fn failure_reason(error: &Error) -> &'static str {
    match error.kind() {
        ErrorKind::OAuth(OAuthErrorKind::FlowState) => "flow_state",
        ErrorKind::OAuth(OAuthErrorKind::MissingAuthorizationCode) => "missing_code",
        ErrorKind::OAuth(OAuthErrorKind::TokenExchange) => "token_exchange",
        ErrorKind::OAuth(OAuthErrorKind::UserInfo) => "user_info",
        ErrorKind::Session(_) => "session",
        ErrorKind::Config(_) | ErrorKind::Http(_) => "internal",
    }
}

/// Save the session whatever the sign-in outcome was.
async fn persist(
    session: &Session,
    outcome: Result<AuthenticatedIdentity, Error>,
) -> Result<AuthenticatedIdentity, Error> {
    let saved = match (&outcome, session.id()) {
        // The cookie named no stored record, so there is nothing to write back.
        (Err(_), None) => Ok(()),
        _ => session.save().await,
    };
    match (outcome, saved) {
        (Ok(identity), Ok(())) => Ok(identity),
        (Ok(_), Err(e)) => Err(session_error(SessionErrorKind::Store, e).into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(save_err)) => {
            error!("Failed to save session after sign-in failure: {:?}", save_err);
            Err(e)
        }
    }
}

async fn sign_in(
    app_state: &AppState,
    session: &Session,
    code: &str,
) -> Result<AuthenticatedIdentity, Error> {
    let flow_session = FlowSession::new(session.clone());
    let identity = app_state
        .flow()
        .complete_authorization(&flow_session, code)
        .await?;

    // New identity, new session id.
    session
        .cycle_id()
        .await
        .map_err(|e| session_error(SessionErrorKind::Store, e))?;
    flow_session
        .insert(IDENTITY_SESSION_KEY, identity.clone())
        .await?;

    Ok(identity)
}

/// GET /logout
///
/// Destroys the local session, then sends the browser to Keycloak's logout
/// endpoint so the single sign-on session ends too.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 302, description = "Redirect to the Keycloak logout endpoint"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn logout(State(app_state): State<AppState>, session: Session) -> Response {
    if let Err(e) = session.flush().await {
        error!("Session destroy error: {:?}", e);
    }
    info!("User logged out from local session");

    let logout_url = app_state.flow().endpoints().logout_url(
        app_state.config.keycloak_client_id(),
        app_state.config.post_logout_redirect_uri(),
    );

    debug!("Redirecting to Keycloak logout to clear the server session");
    found(logout_url.as_str())
}
