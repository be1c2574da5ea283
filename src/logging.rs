use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `fmt` subscriber; `RUST_LOG` overrides `default_filter`.
pub fn init_logging(default_filter: &str) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // a second init (tests, embedding) keeps the first subscriber
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .try_init();
}

/// Route logs to the test harness output.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tabload=debug")),
        )
        .with_test_writer()
        .try_init();
}
