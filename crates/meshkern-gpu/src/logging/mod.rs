//! Logging setup.
//!
//! Everything in this crate logs through the `log` facade; `env_logger` is
//! only installed by [`init_logging`].

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
