//! Logging setup: human-readable output on a terminal, one JSON object per line
//! otherwise, so piped/CI output stays machine-parseable.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

pub fn init(log_level: Option<&str>) {
    let filter = log_level
        .map(str::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if std::io::stderr().is_terminal() {
        subscriber.init();
    } else {
        subscriber.json().init();
    }
}
