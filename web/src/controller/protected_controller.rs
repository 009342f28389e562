use crate::extractors::authenticated_user::AuthenticatedUser;

use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

/// GET /api/protected
///
/// Sample API resource. Signed-out callers get `401` with a JSON error body
/// rather than a redirect.
#[utoipa::path(
    get,
    path = "/api/protected",
    responses(
        (status = 200, description = "The protected resource and the caller's identity"),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn protected(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    Json(json!({
        "message": "This is a protected resource",
        "user": user,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
