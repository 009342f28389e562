use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;

/// Default callback registered with the Keycloak client.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/auth/callback";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Browser-facing base URL of the Keycloak server, e.g. http://localhost:8080
    #[arg(long, env)]
    keycloak_url: String,

    /// Base URL this server uses to reach Keycloak for token and userinfo calls.
    /// Defaults to KEYCLOAK_URL. Set it when Keycloak is reachable under a different
    /// hostname from inside the deployment (e.g. http://keycloak:8080 in docker compose).
    #[arg(long, env)]
    keycloak_internal_url: Option<String>,

    /// The Keycloak realm users authenticate against.
    #[arg(long, env)]
    keycloak_realm: String,

    /// The OAuth client identifier registered in the realm.
    #[arg(long, env)]
    keycloak_client_id: String,

    /// The OAuth client secret registered in the realm.
    #[arg(long, env, hide_env_values = true)]
    keycloak_client_secret: SecretString,

    /// The callback URL Keycloak redirects to after the user signs in.
    #[arg(long, env, default_value = DEFAULT_REDIRECT_URI)]
    redirect_uri: String,

    /// Where Keycloak sends the browser after logout.
    #[arg(long, env, default_value = "http://localhost:3000")]
    post_logout_redirect_uri: String,

    /// Space separated OAuth scopes to request.
    #[arg(long, env, default_value = "openid email profile")]
    scopes: String,

    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Timeout in seconds for calls to the Keycloak token and userinfo endpoints
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_seconds: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 3000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Session expiry duration in seconds (default: 24 hours = 86400 seconds)
    #[arg(long, env, default_value_t = 86400)]
    pub session_expiry_seconds: u64,
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn keycloak_url(&self) -> &str {
        &self.keycloak_url
    }

    pub fn keycloak_internal_url(&self) -> Option<&str> {
        self.keycloak_internal_url.as_deref()
    }

    pub fn keycloak_realm(&self) -> &str {
        &self.keycloak_realm
    }

    pub fn keycloak_client_id(&self) -> &str {
        &self.keycloak_client_id
    }

    pub fn keycloak_client_secret(&self) -> &SecretString {
        &self.keycloak_client_secret
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn post_logout_redirect_uri(&self) -> &str {
        &self.post_logout_redirect_uri
    }

    /// Requested scopes, split on whitespace.
    pub fn scopes(&self) -> Vec<String> {
        self.scopes.split_whitespace().map(str::to_string).collect()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
