use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub listen_addr: String,
    pub max_connections: u32,
}

impl Settings {
    /// Defaults, then an optional `trivia.toml` in the working directory, then
    /// `TRIVIA_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("trivia").required(false))
            .add_source(Environment::with_prefix("TRIVIA").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database_url", "sqlite:trivia.db")?
            .set_default("listen_addr", "0.0.0.0:8080")?
            .set_default("max_connections", 5)
    }
}
