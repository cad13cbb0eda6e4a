// ABOUTME: User accounts for the todo backend
// ABOUTME: Registration, login, profile and avatar management with argon2 credentials

pub mod error;
pub mod password;
pub mod service;
pub mod storage;
pub mod types;
pub mod validation;

pub use error::UserError;
pub use service::UserService;
pub use storage::UserStorage;
pub use types::*;
