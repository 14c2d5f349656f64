//! Logging setup for the CLI.
//!
//! Level comes from `RUST_LOG` (default `info`), e.g. `RUST_LOG=piping_core=debug`
//! to see remote catalog fallbacks. Logs go to stderr so `--json` output on
//! stdout stays machine-readable.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}
