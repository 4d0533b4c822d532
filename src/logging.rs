//! Logging setup for the command-line tools.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging. `verbosity` counts `-v` flags: 0 warns only,
/// 1 adds info, 2 or more adds debug. `RUST_LOG` overrides the default.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},matbexp={level}")));

    fmt().with_env_filter(filter).with_target(false).init();
}
