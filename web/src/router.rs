use crate::controller::{
    health_check_controller, oauth_controller, page_controller, protected_controller,
};
use crate::middleware::auth::require_login;
use crate::session::{session_layer, SessionLocks, SESSION_COOKIE_NAME};
use crate::AppState;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Extension, Router,
};
use log::*;
use service::config::Config;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_sessions::MemoryStore;

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Keycloak PKCE Relying Party"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::login,
            oauth_controller::callback,
            oauth_controller::logout,
            page_controller::index,
            page_controller::dashboard,
            page_controller::profile,
            page_controller::error,
            protected_controller::protected,
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "keycloak_pkce_rs", description = "Keycloak sign-in with the PKCE authorization code flow")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the cookie session that a completed sign-in establishes.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Session id value returned from a successful sign-in via Set-Cookie header",
                ))),
            )
        }
    }
}

/// The full application: routes plus the session and CORS layers.
pub fn build_app(app_state: AppState) -> Router {
    let sessions = session_layer(&app_state.config, MemoryStore::default());
    let cors = cors_layer(&app_state.config);

    define_routes(app_state).layer(sessions).layer(cors)
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state.clone()))
        .merge(page_routes())
        .merge(protected_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(Extension(SessionLocks::default()))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Routes for the Keycloak sign-in flow. None of them require a session.
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/login", get(oauth_controller::login))
        .route("/auth/callback", get(oauth_controller::callback))
        .route("/logout", get(oauth_controller::logout))
        .with_state(app_state)
}

fn page_routes() -> Router {
    Router::new()
        .route("/dashboard", get(page_controller::dashboard))
        .route("/profile", get(page_controller::profile))
        .route_layer(from_fn(require_login))
        .merge(
            Router::new()
                .route("/", get(page_controller::index))
                .route("/error", get(page_controller::error)),
        )
}

fn protected_routes() -> Router {
    Router::new().route("/api/protected", get(protected_controller::protected))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}
