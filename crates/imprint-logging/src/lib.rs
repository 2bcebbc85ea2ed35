//! # imprint-logging
//!
//! Structured logging with `tracing`.
//!
//! The resolver crates only emit events; this crate installs the subscriber.
//! `RUST_LOG` takes precedence over the configured level.

#![deny(unsafe_code)]

pub mod types;

pub use types::LogLevel;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Build the filter: `RUST_LOG` if set and valid, otherwise `level`.
#[must_use]
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()))
}

/// Install the global subscriber. Output goes to stderr so command output on
/// stdout stays machine-readable.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_subscriber(level: LogLevel, json: bool) -> bool {
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(build_filter(level))
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(build_filter(level))
            .boxed()
    };

    tracing_subscriber::registry().with(fmt_layer).try_init().is_ok()
}
