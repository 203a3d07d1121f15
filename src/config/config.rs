use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_session_ttl() -> i64 {
    86_400
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self> {
        // 环境变量覆盖配置文件，如 TASK_SRV__SERVER__PORT=8080
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("TASK_SRV").separator("__"))
            .build()
            .context("Failed to load config")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize config")?;

        Ok(app_config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
