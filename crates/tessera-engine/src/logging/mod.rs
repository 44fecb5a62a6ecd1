//! Logging setup.
//!
//! Everything logs through the `log` facade; `init_logging` installs the
//! `env_logger` backend early in `main`.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
