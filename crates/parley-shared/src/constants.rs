/// Application name
pub const APP_NAME: &str = "Parley";

/// Pattern every display name must match (login and rename).
pub const USERNAME_PATTERN: &str = "^[a-zA-Z0-9]{3,16}$";

/// Number of participants in a direct conversation.
pub const DIRECT_PARTICIPANTS: usize = 2;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default request body limit in bytes (1 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;
