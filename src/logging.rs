use std::io;

use tracing_subscriber::EnvFilter;

/// stdout carries the protocol, so everything goes to stderr.
/// `RUST_LOG` picks the filter (default `info`), `TS_CORE_LOG_FORMAT=json`
/// switches to JSON lines.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let json = std::env::var("TS_CORE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .with_writer(io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("logging already initialised: {e}");
    }
}
