// ABOUTME: Database connection management for the todo backend
// ABOUTME: Builds the SQLite pool, applies connection settings and runs migrations

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::StorageError;

/// Open a pooled connection to `database_url` and bring the schema up to date
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, StorageError> {
    debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(StorageError::Sqlx)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    info!("Database connection established");

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the schema applied.
/// The connection is never recycled so the data lives as long as the pool.
pub async fn init_memory_pool() -> Result<SqlitePool, StorageError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(StorageError::Sqlx)?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)?;

    debug!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn test_memory_pool_has_schema() {
        let pool = init_memory_pool().await.unwrap();

        let tables: Vec<String> = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'tasks') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap()
        .iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();

        assert_eq!(tables, vec!["tasks".to_string(), "users".to_string()]);
    }

    #[tokio::test]
    async fn test_memory_pool_enforces_foreign_keys() {
        let pool = init_memory_pool().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO tasks (id, user_id, content, created_at, updated_at) VALUES (1, 999, 'orphan', 0, 0)",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_file_pool_creates_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("todo.db");
        let url = format!("sqlite://{}", path.display());

        let pool = init_pool(&url, 2).await.unwrap();
        pool.close().await;

        assert!(path.exists());
    }
}
