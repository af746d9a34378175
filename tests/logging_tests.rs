//! Unit tests for the logging functionality in the `sunspec-rs` crate.

use log::Level;
use sunspec_rs::logging::{
    init_logger, log_info, log_model, log_warn, try_init_logger, DEFAULT_LOG_FILTER,
};
use sunspec_rs::model::ModelId;

/// Tests that the logging helpers do not panic, with or without a logger.
#[test]
fn test_logging() {
    log_warn("This is a warning message");
    log_info("This is an info message");
    log_model(Level::Info, ModelId::ThreePhaseInverterInteger, 40_069, "decoding");
}

/// Tests that initializing the logger more than once is harmless.
#[test]
fn test_init_logger_twice() {
    init_logger();
    init_logger();
    assert!(try_init_logger().is_err());
}

/// Tests the filter used when `RUST_LOG` is unset.
#[test]
fn test_default_filter() {
    assert_eq!(DEFAULT_LOG_FILTER, "warn");
}
