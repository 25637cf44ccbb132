//! Build metadata baked into the binary.

/// Released together with `players`, so this is the service version too.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The source revision, if `PLAYERS_REVISION` was set at build time.
pub const REVISION: Option<&str> = option_env!("PLAYERS_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
