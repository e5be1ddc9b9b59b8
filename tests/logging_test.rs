//! Logger bootstrap tests
//!
//! Kept in their own binary because they install the global logger.

use liveconf::common::init_logger;

#[test]
fn test_init_logger_twice() {
    init_logger("debug");
    init_logger("info");
    log::debug!("logger initialized");
}
