//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system with a filter such as `"info"` or `"scene_engine=debug"`
///
/// `RUST_LOG` still wins when it is set. Calling this more than once is harmless;
/// only the first call installs a logger.
pub fn init(filter: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filter);

    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&env_filter);
    }

    if builder.try_init().is_err() {
        log::trace!("Logger already initialized, keeping existing configuration");
    }
}
