use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct MenuConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub server_selection_timeout_ms: u64,
    pub operation_timeout_ms: u64,
    pub max_pool_size: u32,
}

impl MongoConfig {
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/".to_string(),
            database: "myDB".to_string(),
            collection: "pizzaMenu".to_string(),
            server_selection_timeout_ms: 5_000,
            operation_timeout_ms: 10_000,
            max_pool_size: 10,
        }
    }
}

impl MenuConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = MongoConfig::default();

        Ok(MenuConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some(&defaults.uri), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some(&defaults.database), false)?,
                collection: get_env("MONGODB_COLLECTION", Some(&defaults.collection), false)?,
                server_selection_timeout_ms: get_env_parsed(
                    "MONGODB_SERVER_SELECTION_TIMEOUT_MS",
                    defaults.server_selection_timeout_ms,
                )?,
                operation_timeout_ms: get_env_parsed(
                    "MONGODB_OPERATION_TIMEOUT_MS",
                    defaults.operation_timeout_ms,
                )?,
                max_pool_size: get_env_parsed("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn get_env_parsed<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}
