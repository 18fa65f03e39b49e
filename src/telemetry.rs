use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the JSON tracing subscriber.
/// Log level is controlled by `RUST_LOG` (default `info`).
pub fn init_telemetry() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .init();
}
