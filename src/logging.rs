//! 日志初始化
//!
//! Progress goes to stderr so stdout stays free for `--show` output.

use tracing_subscriber::EnvFilter;

use crate::env::{EnvVar, LogLevel, NoColor};

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `TOPSHELF_LOG_LEVEL` (default
/// `info`) applies to the whole process. Colours are off when `NO_COLOR` is
/// set or stderr is not a terminal. Calling this twice is harmless.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(LogLevel::get_or_default("info".to_string()))
    });

    let ansi = !NoColor::get_or_default(false) && atty::is(atty::Stream::Stderr);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
}
