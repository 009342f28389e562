use log::*;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting up Keycloak PKCE relying party in {} mode",
        config.runtime_env()
    );

    let flow = match service::init_authorization_flow(&config) {
        Ok(flow) => Arc::new(flow),
        Err(e) => {
            error!("Failed to configure the Keycloak authorization flow: {e}");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(config, &flow);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
