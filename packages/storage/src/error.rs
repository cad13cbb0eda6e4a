// ABOUTME: Storage error types shared by every persistence adapter
// ABOUTME: Wraps sqlx, redis and object_store failures behind one enum

use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),
    #[error("Object storage error: {0}")]
    Object(#[from] object_store::Error),
    #[error("Invalid object key: {0}")]
    InvalidObjectKey(String),
    #[error("Record not found")]
    NotFound,
}

pub type StorageResult<T> = Result<T, StorageError>;
