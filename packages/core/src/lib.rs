// ABOUTME: Core types, traits, and utilities for the todo backend
// ABOUTME: Foundational package providing identifiers, clocks and shared constants

pub mod constants;
pub mod id;
pub mod utils;

// Re-export constants
pub use constants::{AVATAR_KEY_PREFIX, DEFAULT_AVATAR_KEY, SERVICE_NAME};

// Re-export id generation
pub use id::{Clock, IdGenError, IdGenerator, SnowflakeGenerator};

// Re-export utilities
pub use utils::{format_millis, millis_to_datetime, now_millis, utc_offset_from_minutes};
