// ABOUTME: Token authentication library for the todo backend
// ABOUTME: Issues, validates, rotates and revokes JWT access/refresh token pairs

pub mod error;
pub mod tokens;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use tokens::{
    bearer_token, Claims, TokenKind, TokenManager, TokenPair, ACCESS_TOKEN_TTL,
    REFRESHED_ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL,
};
