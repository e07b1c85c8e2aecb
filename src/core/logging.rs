//! Logger setup

/// Initialize `env_logger` with an `info` default, overridable by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    if result.is_ok() {
        log::debug!("Logger initialized");
    }
}
