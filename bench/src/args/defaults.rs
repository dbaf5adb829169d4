pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6663;
pub const DEFAULT_COMMAND: &str = crate::protocol::DEFAULT_COMMAND;
pub const DEFAULT_SSL_SKIP_VERIFY: bool = false;
