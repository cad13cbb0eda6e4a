// ABOUTME: Task management with derived status for the todo backend
// ABOUTME: Status engine, owner-scoped task storage and the task service

pub mod error;
pub mod service;
pub mod status;
pub mod storage;
pub mod types;

pub use error::TaskError;
pub use service::TaskService;
pub use status::derive_status;
pub use storage::{TaskRepository, TaskStorage};
pub use types::*;
