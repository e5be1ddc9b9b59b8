//! Common module
//!
//! Shared utilities used by the configuration modules and the binary.

pub mod fs;
pub mod log;
pub mod sync;

pub use log::init_logger;
