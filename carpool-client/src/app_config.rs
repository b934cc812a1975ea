use carpool_shared::Masked;
use serde::Deserialize;
use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_IDENTITY_HEADER: &str = "user-email";
pub const DEFAULT_PASSENGER_IDENTITY_HEADER: &str = "passenger-email";
pub const DEFAULT_LOG_FILTER: &str = "carpool=info";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub maps: MapsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Header that carries the signed-in email
    pub identity_header: String,
    /// Passenger-rides list reads the email from its own header
    #[serde(default = "default_passenger_identity_header")]
    pub passenger_identity_header: String,
    /// Unset means no client-side timeout
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_passenger_identity_header() -> String {
    DEFAULT_PASSENGER_IDENTITY_HEADER.to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MapsConfig {
    /// Only ever handed to third-party map services
    #[serde(default)]
    pub api_key: Option<Masked<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::builder("config", &run_mode)?
            // Eg.. `CARPOOL__API__BASE_URL=https://rides.example.com`
            .add_source(config::Environment::with_prefix("CARPOOL").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults plus the optional files under `dir`, without the environment layer
    pub fn builder(
        dir: &str,
        run_mode: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        Ok(config::Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.identity_header", DEFAULT_IDENTITY_HEADER)?
            .set_default("api.passenger_identity_header", DEFAULT_PASSENGER_IDENTITY_HEADER)?
            .set_default("logging.filter", DEFAULT_LOG_FILTER)?
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{run_mode}")).required(false))
            // Not checked in
            .add_source(config::File::with_name(&format!("{dir}/local")).required(false)))
    }
}
