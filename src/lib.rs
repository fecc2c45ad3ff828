use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError};
use serde::Deserialize;

pub mod domain;
pub mod infrastructure;

#[derive(Clone, Debug, Deserialize)]
pub struct ClientesConfig {
    pub server: Server,
    pub database: Database,
    pub logger: Logger,
}

impl ClientesConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(config::File::with_name("clientes").required(false))
            .add_source(
                config::Environment::with_prefix("CLIENTES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<ClientesConfig>()
    }

    /// Builder preloaded with the values used when no file or variable overrides them.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "mysql://root@localhost/nodemysql")?
            .set_default("database.max_connections", 10)?
            .set_default("logger.level", "INFO")
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub tls: Option<Tls>,
}

impl Server {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Tls {
    pub cert: String,
    pub key: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Logger {
    pub level: Level,
}

#[derive(Clone, Debug, Deserialize)]
pub enum Level {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}
