// ABOUTME: Error taxonomy for task operations
// ABOUTME: Not-found, id generation and pass-through storage failures

use thiserror::Error;
use todo_core::IdGenError;
use todo_storage::StorageError;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task not found")]
    NotFound,
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for TaskError {
    fn from(err: sqlx::Error) -> Self {
        TaskError::Storage(StorageError::Sqlx(err))
    }
}
