use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

/// GET service liveness
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up and responding to requests"),
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "OK", "timestamp": Utc::now().to_rfc3339() }))
}
