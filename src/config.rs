// Startup configuration, read once from the environment and passed explicitly.
use std::env;
use std::fmt;

const DEFAULT_DATABASE_URL: &str = "daily_tracker.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Where the data lives. Chosen once; handlers never look at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Postgres(String),
    Sqlite(String),
}

impl StoreLocation {
    pub fn parse(database_url: &str) -> Result<Self, ConfigError> {
        let url = database_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid(
                "DATABASE_URL",
                "must not be empty".to_string(),
            ));
        }

        // Some hosting providers still hand out the legacy scheme.
        if let Some(rest) = url.strip_prefix("postgres://") {
            return Ok(StoreLocation::Postgres(format!("postgresql://{}", rest)));
        }
        if url.starts_with("postgresql://") {
            return Ok(StoreLocation::Postgres(url.to_string()));
        }

        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        Ok(StoreLocation::Sqlite(path.to_string()))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreLocation::Postgres(_) => "postgres",
            StoreLocation::Sqlite(_) => "sqlite",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreLocation,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    /// Empty means any origin is accepted.
    pub frontend_urls: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let store = StoreLocation::parse(&database_url)?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid("PORT", e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::Invalid("DB_POOL_SIZE", e.to_string()))?,
            None => DEFAULT_POOL_SIZE,
        };
        if pool_size == 0 {
            return Err(ConfigError::Invalid(
                "DB_POOL_SIZE",
                "must be at least 1".to_string(),
            ));
        }

        let frontend_urls = lookup("FRONTEND_URLS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(AppConfig {
            store,
            host,
            port,
            pool_size,
            frontend_urls,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Invalid(key, msg) => write!(f, "Invalid {}: {}", key, msg),
        }
    }
}

impl std::error::Error for ConfigError {}
