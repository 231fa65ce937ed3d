//! Tracing initialization.
//!
//! Logs go to stdout through the `tracing-subscriber` fmt layer. The filter comes from
//! `RUST_LOG` when it is set and parses, otherwise from `log_filter` in the configuration:
//!
//! ```bash
//! RUST_LOG="wharf=debug,tower_http=info" wharf -f config.yaml
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Build the filter, preferring `RUST_LOG` over the configured default.
fn build_filter(default_filter: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| anyhow::anyhow!("Invalid log filter '{default_filter}': {e}")),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry(default_filter: &str) -> anyhow::Result<()> {
    let env_filter = build_filter(default_filter)?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_default_filter_is_reported() {
        // Only meaningful when RUST_LOG does not take precedence
        if std::env::var("RUST_LOG").is_err() {
            assert!(build_filter("wharf=notalevel").is_err());
        }
        assert!(build_filter("info").is_ok());
    }
}
