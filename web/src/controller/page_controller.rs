//! JSON stand-ins for the browser pages of the demo application.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::session::FlowSession;
use crate::Error;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::*;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    pub logout: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorParams {
    pub reason: Option<String>,
}

/// GET /
///
/// Landing page. Reports whether the browser has a signed-in session.
#[utoipa::path(
    get,
    path = "/",
    params(
        ("logout" = Option<String>, Query, description = "Set when Keycloak returns the browser after logout"),
    ),
    responses(
        (status = 200, description = "Sign-in status of the current session"),
    )
)]
pub async fn index(
    session: Session,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    let identity = FlowSession::new(session).identity().await?;

    Ok(Json(json!({
        "authenticated": identity.is_some(),
        "user": identity,
        "logout": params.logout,
    })))
}

/// GET /dashboard
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard for the signed-in user"),
        (status = 302, description = "Not signed in, redirect to /login"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn dashboard(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    debug!("Rendering dashboard for {}", user.subject);

    Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({
            "welcome": format!("Welcome, {}", user.display_name()),
            "user": user,
        }),
    ))
}

/// GET /profile
///
/// Every claim Keycloak's userinfo endpoint returned for the signed-in user.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile of the signed-in user"),
        (status = 302, description = "Not signed in, redirect to /login"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn profile(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    Json(ApiResponse::new(StatusCode::OK.into(), user))
}

/// GET /error
#[utoipa::path(
    get,
    path = "/error",
    params(
        ("reason" = Option<String>, Query, description = "Cause of the failed sign-in"),
    ),
    responses(
        (status = 200, description = "Authentication failure page"),
    )
)]
pub async fn error(Query(params): Query<ErrorParams>) -> impl IntoResponse {
    Json(json!({
        "message": "Authentication failed",
        "reason": params.reason,
    }))
}
