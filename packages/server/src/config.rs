// ABOUTME: Server configuration loaded from environment variables
// ABOUTME: Selects database, cache and object storage backends and token settings

use std::env;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid number for {name}: {source}")]
    InvalidNumber {
        name: &'static str,
        #[source]
        source: ParseIntError,
    },
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid cache mode: {0}")]
    InvalidCacheMode(String),
    #[error("Invalid storage type: {0}")]
    InvalidStorageType(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheMode {
    Memory,
    Redis,
}

impl FromStr for CacheMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheMode::Memory),
            "redis" => Ok(CacheMode::Redis),
            _ => Err(ConfigError::InvalidCacheMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageType {
    Memory,
    Local,
    Minio,
}

impl FromStr for StorageType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageType::Memory),
            "local" => Ok(StorageType::Local),
            "minio" | "s3" => Ok(StorageType::Minio),
            _ => Err(ConfigError::InvalidStorageType(s.to_string())),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub cache_mode: CacheMode,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub storage_type: StorageType,
    pub storage_path: String,
    pub minio_endpoint: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub storage_bucket: String,
    pub storage_region: String,
    pub object_base_url: String,
    pub node_id: i64,
    /// Offset used to decide which tasks are due "today"
    pub status_utc_offset_minutes: i32,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = ParseIntError>,
{
    var_or(name, default)
        .trim()
        .parse::<T>()
        .map_err(|source| ConfigError::InvalidNumber { name, source })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port: u16 = parse_var("PORT", "8080")?;
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cache_mode = var_or("CACHE_MODE", "memory").parse::<CacheMode>()?;
        let storage_type = var_or("STORAGE_TYPE", "memory").parse::<StorageType>()?;

        let object_base_url = match env::var("OBJECT_BASE_URL") {
            Ok(url) => url,
            Err(_) => match storage_type {
                StorageType::Minio => format!(
                    "{}/{}",
                    var_or("MINIO_ENDPOINT", "http://localhost:9000").trim_end_matches('/'),
                    var_or("STORAGE_BUCKET", "todo")
                ),
                _ => format!("http://localhost:{}/objects", port),
            },
        };

        Ok(Config {
            host: var_or("HOST", "127.0.0.1"),
            port,
            cors_origin: var_or("CORS_ORIGIN", "http://localhost:5173"),
            database_url: var_or("DATABASE_URL", "sqlite://todo.db?mode=rwc"),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", "10")?,
            cache_mode,
            redis_url: var_or("REDIS_URL", "redis://127.0.0.1:6379"),
            jwt_secret,
            jwt_algorithm: var_or("JWT_ALGORITHM", "HS256"),
            storage_type,
            storage_path: var_or("STORAGE_PATH", "./data/objects"),
            minio_endpoint: var_or("MINIO_ENDPOINT", "http://localhost:9000"),
            minio_access_key: var_or("MINIO_AK", ""),
            minio_secret_key: var_or("MINIO_SK", ""),
            storage_bucket: var_or("STORAGE_BUCKET", "todo"),
            storage_region: var_or("STORAGE_REGION", "us-east-1"),
            object_base_url,
            node_id: parse_var("NODE_ID", "1")?,
            status_utc_offset_minutes: parse_var("STATUS_UTC_OFFSET_MINUTES", "0")?,
        })
    }
}
