//! Console logging setup.

use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{prelude::*, util::SubscriberInitExt};

/// Initialize the global subscriber.
///
/// The level comes from `LOG_LEVEL` when set, otherwise defaults to `DEBUG`
/// in debug builds and `INFO` in release builds.
pub fn init() {
    let default = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let level = std::env::var("LOG_LEVEL").map_or(default, |level| {
        LevelFilter::from_str(level.as_str()).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_filter(level),
        )
        .init();
}
