// ABOUTME: Error types for token authentication
// ABOUTME: Distinguishes missing, malformed, invalid and revoked credentials

use thiserror::Error;
use todo_storage::StorageError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No authorization token supplied")]
    MissingToken,

    #[error("Authorization header is invalid")]
    InvalidHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Wrong token type: expected {expected}")]
    WrongTokenKind { expected: &'static str },

    #[error("Refresh token invalid or revoked")]
    Revoked,

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Token cache error: {0}")]
    Cache(#[from] StorageError),
}
