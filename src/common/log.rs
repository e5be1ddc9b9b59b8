//! Logger bootstrap
//!
//! The library only emits records through the `log` macros. Binaries call
//! [`init_logger`] once at startup.

/// Initialize `env_logger`.
///
/// `RUST_LOG` takes precedence over `level` when it is set.
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second initialization (e.g. across tests) is not an error
    let _ = env_logger::try_init_from_env(env);
}

