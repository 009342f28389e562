//! HTTP surface of the Keycloak PKCE relying party.

use log::*;
use tokio::net::TcpListener;

mod controller;
mod error;
mod extractors;
mod middleware;
pub mod router;
pub mod session;

pub use error::{Error, Result};
pub use service::AppState;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", interface, app_state.config.port);

    info!("Server starting... listening for connections on http://{server_url}");

    let listener = TcpListener::bind(&server_url).await?;
    let app = router::build_app(app_state);

    axum::serve(listener, app).await
}
