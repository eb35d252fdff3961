// packages/engine/src/observability/mod.rs
//! Logging and metrics
//!
//! Logs go through `tracing`. Counters go through the `metrics` facade; with
//! no recorder installed by the embedding process they are no-ops.

use crate::interception::config_loader::LoadReport;
use crate::interception::decision::Decision;
use crate::interception::routing_table::EligibleHost;
use crate::utils::config::EngineConfig;
use crate::utils::errors::{EngineError, Result};
use metrics::counter;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Intercepted calls by outcome and host
pub const REQUESTS_TOTAL: &str = "pocket_proxy_requests_total";

/// Redirect configuration loads by outcome
pub const CONFIG_LOADS_TOTAL: &str = "pocket_proxy_config_loads_total";

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this
/// again after a subscriber is set is a no-op.
pub fn init_tracing(config: &EngineConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter).map_err(|e| {
            EngineError::ConfigError(format!("Invalid log filter {:?}: {}", config.log_filter, e))
        })?,
    };

    let result = if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
    };

    if let Err(e) = result {
        debug!("Tracing subscriber already installed: {}", e);
    }

    Ok(())
}

/// Count one intercepted call
pub fn record_request(decision: Decision, host: Option<&str>) {
    let outcome = match decision {
        Decision::Redirect(_) => "redirect",
        Decision::Passthrough => "passthrough",
    };

    // Only eligible hosts become label values.
    let host = host
        .and_then(EligibleHost::from_host)
        .map(EligibleHost::as_str)
        .unwrap_or("other");

    counter!(REQUESTS_TOTAL, "outcome" => outcome, "host" => host).increment(1);
}

/// Count one configuration load
pub fn record_config_load(report: &LoadReport) {
    let outcome = match &report.error {
        None => "ok",
        Some(EngineError::ConfigUnavailable { .. }) => "unavailable",
        Some(EngineError::ConfigSyntax { .. }) => "partial",
        Some(_) => "error",
    };

    counter!(CONFIG_LOADS_TOTAL, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        let config = EngineConfig::default();
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }

    #[test]
    fn test_record_without_recorder() {
        record_request(Decision::Redirect(EligibleHost::GetSend), Some("getpocket.com"));
        record_request(Decision::Passthrough, Some("example.com"));
        record_request(Decision::Passthrough, None);
    }
}
