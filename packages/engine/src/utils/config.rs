// packages/engine/src/utils/config.rs
//! Engine settings
//!
//! Built-in defaults describe the on-device layout. Every field can be
//! overridden through `POCKET_PROXY__<FIELD>` environment variables, e.g.
//! `POCKET_PROXY__CONFIG_PATH=/tmp/pocket_proxy.conf`.
//!
//! These settings are distinct from the redirect configuration file itself,
//! which is parsed by [`crate::interception::config_loader`].

use crate::utils::errors::Result;
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Location of the redirect configuration on the device
pub const DEFAULT_CONFIG_PATH: &str = "/mnt/onboard/.adds/pocket_proxy/pocket_proxy.conf";

/// Deleting this file disables the plugin on next start
pub const DEFAULT_UNINSTALL_MARKER: &str = "/mnt/onboard/.adds/pocket_proxy/DELETE_ME_TO_UNINSTALL";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "POCKET_PROXY";

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Redirect configuration file
    pub config_path: PathBuf,

    /// Marker file whose absence means "do not install"
    pub uninstall_marker: Option<PathBuf>,

    /// Load the redirect table at installation time instead of on the
    /// first intercepted call
    pub eager_load: bool,

    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,

    /// Output logs as JSON
    pub json_logs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            uninstall_marker: Some(PathBuf::from(DEFAULT_UNINSTALL_MARKER)),
            eager_load: false,
            log_filter: "info".to_string(),
            json_logs: false,
        }
    }
}

impl EngineConfig {
    /// Load settings from defaults and the process environment
    pub fn load() -> Result<Self> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    fn from_environment(env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("config_path", DEFAULT_CONFIG_PATH)?
            .set_default("uninstall_marker", DEFAULT_UNINSTALL_MARKER)?
            .set_default("eager_load", false)?
            .set_default("log_filter", "info")?
            .set_default("json_logs", false)?
            .add_source(env.try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Override the redirect configuration path
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Override the uninstall marker
    pub fn with_uninstall_marker(mut self, marker: Option<PathBuf>) -> Self {
        self.uninstall_marker = marker;
        self
    }

    /// Switch between eager and lazy table loading
    pub fn with_eager_load(mut self, eager: bool) -> Self {
        self.eager_load = eager;
        self
    }
}
