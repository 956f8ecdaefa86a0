//! Diagnostic logging.
//!
//! Library code only emits `tracing` events; the binary calls [`init`] once at startup.
//!
//! Level priority:
//! 1. `--log-level`
//! 2. `-v` count (`-v` info, `-vv` debug, `-vvv` trace)
//! 3. `RUST_LOG`
//! 4. `warn`
//!
//! Events go to stderr: compact when stderr is a terminal, JSON otherwise.

use crate::error::{Result, ServingError};
use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LEVEL: Level = Level::WARN;

/// Level picked by the flags, or `None` to defer to `RUST_LOG`.
pub fn select_level(log_level: Option<&str>, verbosity: u8) -> Result<Option<Level>> {
    if let Some(name) = log_level {
        return name
            .parse::<Level>()
            .map(Some)
            .map_err(|_| ServingError::Config(format!("unknown log level '{}'", name)));
    }
    Ok(match verbosity {
        0 => None,
        1 => Some(Level::INFO),
        2 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    })
}

pub fn init(level: Option<Level>) {
    let filter_layer = match level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::builder()
            .with_default_directive(DEFAULT_LEVEL.into())
            .from_env_lossy(),
    };

    let fmt_layer = if std::io::stderr().is_terminal() {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .boxed()
    };

    // A second init (tests driving `run` twice) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}
