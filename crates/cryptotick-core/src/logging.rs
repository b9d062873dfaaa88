//! Global `tracing` subscriber setup.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LogConfig;

static LOGGER_ONCE: OnceLock<()> = OnceLock::new();

/// Installs the stderr subscriber. Later calls are no-ops.
///
/// `RUST_LOG` wins over `config.level` when it is set and parses.
pub fn init_logging(config: &LogConfig) {
    LOGGER_ONCE.get_or_init(|| {
        let env_filter = build_filter(config);
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(config.ansi)
            .with_writer(std::io::stderr)
            .with_filter(env_filter);

        // Another subscriber may already be installed (tests, embedding apps).
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let config = LogConfig::default().with_level("debug");
        init_logging(&config);
        init_logging(&config);
    }
}
