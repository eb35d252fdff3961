// packages/engine/src/interception/entry_point.rs
//! Interception entry point
//!
//! The function the host calls instead of its own request function. It owns
//! the process-scoped state: the redirect table (loaded once) and the
//! delegate for the original call.
//!
//! # States
//!
//! ```text
//! Uninitialized ──first intercept() or warm_up()──▶ Ready
//! ```
//!
//! The transition runs the table loader exactly once, even when several
//! threads make their first call at the same time. Once `Ready` the table is
//! read-only and shared without locking.

use crate::interception::config_loader::ConfigLoader;
use crate::interception::decision::{evaluate, Decision};
use crate::interception::delegate::Delegate;
use crate::interception::request::RequestDescriptor;
use crate::interception::routing_table::RedirectTable;
use crate::observability;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing::debug;

/// Produces the redirect table on the first call
pub type TableLoader = Box<dyn Fn() -> RedirectTable + Send + Sync>;

/// Entry point state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Table not loaded yet
    Uninitialized,

    /// Table loaded, requests are being decided
    Ready,
}

/// Process-scoped interception context
pub struct InterceptionContext {
    /// Loader run on the Uninitialized -> Ready transition
    loader: TableLoader,

    /// Original call
    delegate: Box<dyn Delegate>,

    /// Loaded table
    table: OnceCell<RedirectTable>,
}

impl InterceptionContext {
    /// Context that loads the redirect configuration at `config_path` on
    /// first use
    pub fn new(config_path: impl Into<PathBuf>, delegate: Box<dyn Delegate>) -> Self {
        let config_path = config_path.into();
        Self::with_loader(Box::new(move || ConfigLoader::load(&config_path)), delegate)
    }

    /// Context with a custom table loader
    pub fn with_loader(loader: TableLoader, delegate: Box<dyn Delegate>) -> Self {
        Self {
            loader,
            delegate,
            table: OnceCell::new(),
        }
    }

    /// Context that starts out `Ready` with `table`
    pub fn with_table(table: RedirectTable, delegate: Box<dyn Delegate>) -> Self {
        let context = Self::with_loader(Box::new(RedirectTable::disabled), delegate);
        let _ = context.table.set(table);
        context
    }

    pub fn state(&self) -> EntryState {
        if self.table.get().is_some() {
            EntryState::Ready
        } else {
            EntryState::Uninitialized
        }
    }

    /// Load the table now if it is not loaded yet
    pub fn warm_up(&self) -> &RedirectTable {
        self.table.get_or_init(|| {
            debug!("Loading redirect table");
            (self.loader)()
        })
    }

    /// Effective request for `request`, without dispatching it
    pub fn resolve(&self, request: RequestDescriptor) -> (RequestDescriptor, Decision) {
        evaluate(request, self.warm_up())
    }

    /// Handle one intercepted call
    ///
    /// Never fails: with no usable configuration the request goes to the
    /// delegate unchanged.
    pub fn intercept(&self, request: RequestDescriptor) {
        let original_host = request.host().map(str::to_owned);
        let (effective, decision) = self.resolve(request);

        match decision {
            Decision::Redirect(host) => {
                debug!("Redirecting {} call to {}", host, effective.url);
            }
            Decision::Passthrough => {
                debug!("Passing through call to {}", effective.url);
            }
        }
        observability::record_request(decision, original_host.as_deref());

        self.delegate.dispatch(effective);
    }
}
