// ABOUTME: Shared constants for the todo backend
// ABOUTME: Object keys and service identifiers used across packages

/// Service name reported by health checks and logs
pub const SERVICE_NAME: &str = "todo-backend";

/// Object key prefix under which user avatars are stored
pub const AVATAR_KEY_PREFIX: &str = "user_avatar";

/// Avatar assigned to newly registered users
pub const DEFAULT_AVATAR_KEY: &str = "default_icon/user_default_icon.png";
