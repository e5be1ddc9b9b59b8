//! Default configuration values
//!
//! Single source of truth for the constants shared by the registry,
//! loaders, watcher and CLI.

use std::time::Duration;

/// Name of the namespace used when none is given
pub const DEFAULT: &str = "DEFAULT";

/// Separator used when flattening nested maps into keys
pub const KEY_SEPARATOR: &str = ".";

/// Default minimum interval between file metadata checks
pub const MIN_INTERVAL: Duration = Duration::ZERO;

/// Default period of the background poller
pub const POLL_PERIOD: Duration = Duration::from_secs(2);

/// Capacity of the poller's message channel
pub const POLLER_CHANNEL_SIZE: usize = 32;

/// Log level used by the binary when none is given
pub const LOG_LEVEL_STR: &str = "info";

/// Text shown in help output for keys without a default
pub const NO_DEFAULT_STR: &str = "None";
