//! Logging setup for the library and the `sunspec-decode` tool.
//!
//! The library only emits through the `log` facade. Binaries and tests call
//! [`init_logger`], which installs `env_logger` filtered by `RUST_LOG`
//! (`RUST_LOG=sunspec_rs=debug` shows power factor latch decisions and store
//! refreshes).

use env_logger::Env;
use log::{debug, info, log, log_enabled, warn, Level, SetLoggerError};

use crate::model::ModelId;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Initializes the logger with the `env_logger` crate.
///
/// Calling it again after a logger is installed has no effect.
pub fn init_logger() {
    if try_init_logger().is_err() {
        debug!("Logger already initialized");
    }
}

/// Installs the `env_logger` backend, failing if a logger is already set.
pub fn try_init_logger() -> Result<(), SetLoggerError> {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp_millis()
        .try_init()
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a message about the model block at `base_address`, prefixed with the
/// model number.
pub fn log_model(level: Level, model_id: ModelId, base_address: u32, message: &str) {
    if log_enabled!(level) {
        log!(level, "[{} @ {base_address}] {message}", model_id.id());
    }
}
