// ABOUTME: Data layer and persistence for the todo backend
// ABOUTME: SQLite pool with migrations, key-value cache and avatar object storage

pub mod cache;
pub mod db;
pub mod error;
pub mod objects;

pub use cache::{Cache, MemoryCache, RedisCache};
pub use db::{init_memory_pool, init_pool};
pub use error::{StorageError, StorageResult};
pub use objects::{ObjectStorage, S3Config};
