use clinicflow_domain::{ClinicError, LoggingConfig, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `config.level`. Call once at startup.
///
/// # Errors
/// Returns `ClinicError::Config` for an unparsable filter directive or when
/// a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let (json, text) = if config.json {
        (Some(fmt::layer().json().with_current_span(true)), None)
    } else {
        (None, Some(fmt::layer().with_target(true)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init()
        .map_err(|e| ClinicError::Config(format!("Failed to initialise tracing: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| {
        ClinicError::Config(format!("Invalid log level '{}': {}", config.level, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_directives() {
        let config =
            LoggingConfig { level: "warn,clinicflow_core=debug".to_string(), json: false };
        assert!(build_filter(&config).is_ok());
    }
}
