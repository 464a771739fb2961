use tracing_subscriber::{
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Install the global JSON subscriber.
///
/// `RUST_LOG` overrides `default_level`. `log` records (actix's access log)
/// are forwarded into the same output.
///
/// # Errors
/// Fails if a global subscriber or `log` logger is already installed.
pub fn init_telemetry(default_level: &str) -> Result<(), TryInitError> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_initialization_is_reported() {
        // The first call may already have run in another test of this binary
        let _ = init_telemetry("debug");

        assert!(init_telemetry("debug").is_err());
        tracing::info!("telemetry initialised");
    }
}
