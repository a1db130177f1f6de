// Logging setup
//
// Logs go to stderr so that stdout stays clean for json/yaml output.
// Filter comes from RUST_LOG, else LOG_LEVEL applied to the leadgen crates,
// else warnings only.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging() {
    let filter = log_filter(
        std::env::var("RUST_LOG").ok(),
        std::env::var("LOG_LEVEL").ok(),
    );

    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn log_filter(rust_log: Option<String>, log_level: Option<String>) -> String {
    if let Some(filter) = rust_log.filter(|f| !f.trim().is_empty()) {
        return filter;
    }
    match log_level.filter(|l| !l.trim().is_empty()) {
        Some(level) => format!("warn,leadgen={level},leadgen_poller={level}"),
        None => "warn".to_string(),
    }
}
