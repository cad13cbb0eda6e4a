// ABOUTME: Error types for user account operations
// ABOUTME: Validation, conflict and credential failures plus pass-through infrastructure errors

use thiserror::Error;
use todo_core::IdGenError;
use todo_storage::StorageError;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must not be empty")]
    InvalidPassword,
    #[error("Email already registered")]
    EmailExists,
    #[error("Unique name already taken")]
    UniqueNameExists,
    #[error("Unique name must be between {min} and {max} characters", min = crate::validation::UNIQUE_NAME_MIN_LEN, max = crate::validation::UNIQUE_NAME_MAX_LEN)]
    InvalidUniqueName,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email does not belong to the signed-in account")]
    EmailMismatch,
    #[error("Session is no longer valid")]
    SessionExpired,
    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),
    #[error("Avatar exceeds {max} bytes", max = crate::validation::MAX_AVATAR_BYTES)]
    AvatarTooLarge,
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Storage(StorageError::Sqlx(err))
    }
}
