// packages/engine/src/interception/hook.rs
//! Hook installation seam
//!
//! Resolving the host's request function inside its shared library and
//! patching in our entry point is platform work done by an external
//! installer. This module describes *what* to hook, asks the installer to
//! do it, and wires the returned original call into an
//! [`InterceptionContext`].
//!
//! Installation is optional: if anything goes wrong the host keeps running
//! unmodified and the engine is simply never called.

use crate::interception::delegate::Delegate;
use crate::interception::entry_point::InterceptionContext;
use crate::utils::config::EngineConfig;
use crate::utils::errors::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Mangled name of `WebRequester::makeRequest(QUrl const&, QString const&,
/// QMap<QString, QString> const&, QByteArray const&, WebResponseInflater*,
/// int, int, QNetworkRequest::CacheLoadControl)`
pub const MAKE_REQUEST_SYMBOL: &str = "_ZN12WebRequester11makeRequestERK4QUrlRK7QStringRK4QMapIS3_S3_ERK10QByteArrayP19WebResponseInflateriiN15QNetworkRequest16CacheLoadControlE";

/// Library that exports [`MAKE_REQUEST_SYMBOL`]
pub const MAKE_REQUEST_LIBRARY: &str = "libnickel.so.1.0.0";

/// Name of the exported replacement function
pub const REPLACEMENT_SYMBOL: &str = "_proxy_pocket_api_calls";

/// Call site to replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSpec {
    /// Fully-qualified symbol of the original call
    pub symbol: String,

    /// Library the symbol lives in
    pub library: String,

    /// Symbol of the replacement entry point
    pub replacement: String,

    /// Short description for logs
    pub description: String,

    /// Whether a failed resolution is acceptable
    pub optional: bool,
}

impl HookSpec {
    /// The host's HTTP request function
    pub fn make_request() -> Self {
        Self {
            symbol: MAKE_REQUEST_SYMBOL.to_string(),
            library: MAKE_REQUEST_LIBRARY.to_string(),
            replacement: REPLACEMENT_SYMBOL.to_string(),
            description: "Pocket API requests".to_string(),
            optional: true,
        }
    }
}

/// Plugin identity
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,

    /// Plugin stays installed only while this file exists
    pub uninstall_marker: Option<PathBuf>,
}

impl PluginInfo {
    pub fn pocket_proxy(uninstall_marker: Option<PathBuf>) -> Self {
        Self {
            name: "PocketProxy".to_string(),
            description:
                "Intercept Pocket API HTTP calls and redirect them to configured URLs instead"
                    .to_string(),
            uninstall_marker,
        }
    }

    /// Whether the operator removed the marker file
    pub fn uninstall_requested(&self) -> bool {
        self.uninstall_marker
            .as_deref()
            .is_some_and(|marker| !marker.exists())
    }
}

/// Resolves a call site and swaps in the entry point
pub trait HookInstaller {
    /// Install the hook and return the original call
    fn install(&self, spec: &HookSpec) -> Result<Box<dyn Delegate>>;
}

/// Install the Pocket API hook
///
/// Returns `None` when the plugin is uninstalled or the hook could not be
/// placed. In both cases the host runs unmodified.
pub fn install(
    installer: &dyn HookInstaller,
    config: &EngineConfig,
) -> Option<Arc<InterceptionContext>> {
    install_with(installer, &HookSpec::make_request(), config)
}

/// Install a specific hook
pub fn install_with(
    installer: &dyn HookInstaller,
    spec: &HookSpec,
    config: &EngineConfig,
) -> Option<Arc<InterceptionContext>> {
    let info = PluginInfo::pocket_proxy(config.uninstall_marker.clone());

    if info.uninstall_requested() {
        info!(
            "{}: uninstall marker {} missing, not installing",
            info.name,
            display_marker(info.uninstall_marker.as_deref())
        );
        return None;
    }

    debug!("Installing hook for {} in {}", spec.symbol, spec.library);

    let delegate = match installer.install(spec) {
        Ok(delegate) => delegate,
        Err(e) if spec.optional => {
            warn!("Optional hook for {} not installed: {}", spec.description, e);
            return None;
        }
        Err(e) => {
            error!("Hook for {} not installed: {}", spec.description, e);
            return None;
        }
    };

    let context = Arc::new(InterceptionContext::new(config.config_path.clone(), delegate));

    if config.eager_load {
        context.warm_up();
    }

    info!("{} installed, intercepting {}", info.name, spec.description);
    Some(context)
}

fn display_marker(marker: Option<&Path>) -> String {
    marker
        .map(|m| m.display().to_string())
        .unwrap_or_default()
}
