use crate::config::{CacheMode, Config, ConfigError, StorageType};
use rstest::rstest;
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "PORT",
    "HOST",
    "JWT_SECRET",
    "CACHE_MODE",
    "STORAGE_TYPE",
    "OBJECT_BASE_URL",
    "MINIO_ENDPOINT",
    "STORAGE_BUCKET",
    "NODE_ID",
    "STATUS_UTC_OFFSET_MINUTES",
];

fn reset_env() {
    for var in VARS {
        env::remove_var(var);
    }
    env::set_var("JWT_SECRET", "config-test-secret");
}

#[test]
#[serial]
fn test_config_defaults() {
    reset_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.cache_mode, CacheMode::Memory);
    assert_eq!(config.storage_type, StorageType::Memory);
    assert_eq!(config.jwt_algorithm, "HS256");
    assert_eq!(config.node_id, 1);
    assert_eq!(config.status_utc_offset_minutes, 0);
    assert_eq!(config.object_base_url, "http://localhost:8080/objects");
}

#[test]
#[serial]
fn test_config_requires_jwt_secret() {
    reset_env();
    env::set_var("JWT_SECRET", "  ");

    let result = Config::from_env();
    assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));

    env::remove_var("JWT_SECRET");
}

#[test]
#[serial]
fn test_config_invalid_port() {
    reset_env();
    env::set_var("PORT", "not-a-number");
    assert!(matches!(
        Config::from_env(),
        Err(ConfigError::InvalidNumber { name: "PORT", .. })
    ));

    env::set_var("PORT", "0");
    assert!(matches!(
        Config::from_env(),
        Err(ConfigError::PortOutOfRange(0))
    ));

    env::remove_var("PORT");
}

#[test]
#[serial]
fn test_minio_base_url_derived_from_endpoint() {
    reset_env();
    env::set_var("STORAGE_TYPE", "minio");
    env::set_var("MINIO_ENDPOINT", "http://minio:9000/");
    env::set_var("STORAGE_BUCKET", "avatars");

    let config = Config::from_env().unwrap();
    assert_eq!(config.storage_type, StorageType::Minio);
    assert_eq!(config.object_base_url, "http://minio:9000/avatars");

    env::remove_var("STORAGE_TYPE");
    env::remove_var("MINIO_ENDPOINT");
    env::remove_var("STORAGE_BUCKET");
}

#[test]
#[serial]
fn test_negative_status_offset() {
    reset_env();
    env::set_var("STATUS_UTC_OFFSET_MINUTES", "-300");

    let config = Config::from_env().unwrap();
    assert_eq!(config.status_utc_offset_minutes, -300);

    env::remove_var("STATUS_UTC_OFFSET_MINUTES");
}

#[rstest]
#[case("memory", CacheMode::Memory)]
#[case("REDIS", CacheMode::Redis)]
fn test_cache_mode_parsing(#[case] input: &str, #[case] expected: CacheMode) {
    assert_eq!(input.parse::<CacheMode>().unwrap(), expected);
}

#[rstest]
#[case("memory", StorageType::Memory)]
#[case("local", StorageType::Local)]
#[case("minio", StorageType::Minio)]
#[case("S3", StorageType::Minio)]
fn test_storage_type_parsing(#[case] input: &str, #[case] expected: StorageType) {
    assert_eq!(input.parse::<StorageType>().unwrap(), expected);
}

#[test]
fn test_unknown_backends_rejected() {
    assert!(matches!(
        "memcached".parse::<CacheMode>(),
        Err(ConfigError::InvalidCacheMode(_))
    ));
    assert!(matches!(
        "ftp".parse::<StorageType>(),
        Err(ConfigError::InvalidStorageType(_))
    ));
}
