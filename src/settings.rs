//! Application settings.
//!
//! Values come from an optional `settings.toml` next to the binary, then from
//! `OPENSPLIT__*` environment variables (`OPENSPLIT__SERVER__PORT=9000`), and
//! finally from `MONGODB_URI` if it is set.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::exchange::{SettlementConfig, SETTLEMENT_EPSILON};
use crate::store::DataSource;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec![],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Database {
    pub source: DataSource,
    pub uri: Option<String>,
    pub name: String,
    /// Only read by the memory source.
    pub seed_sample_data: bool,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            source: DataSource::Mongo,
            uri: None,
            name: "OpenSplit".to_string(),
            seed_sample_data: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub settlement: SettlementConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("OPENSPLIT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("database.uri", std::env::var("MONGODB_URI").ok())?
            .build()?;

        Self::from_config(settings)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        if settings.settlement.epsilon < SETTLEMENT_EPSILON {
            return Err(ConfigError::Message(format!(
                "settlement.epsilon must be at least {} cent, got {}",
                SETTLEMENT_EPSILON.cents(),
                settings.settlement.epsilon.cents()
            )));
        }
        Ok(settings)
    }
}
