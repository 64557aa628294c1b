//! Logging setup for bmcprobe
//!
//! Installs a global `tracing` subscriber from [`LoggingConfig`]: console output
//! in the configured format, optionally mirrored to a file. `log` records from
//! dependencies are bridged through tracing-subscriber's log integration.

pub mod init;

pub use bmcprobe_config::domains::logging::{LogFormat, LogLevel, LoggingConfig};
pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
