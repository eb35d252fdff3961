// packages/engine/src/interception/mod.rs
//! Request interception layer
//!
//! This module turns one intercepted host call into the call that is
//! actually made:
//!
//! - **Config Loader**: INI redirect configuration to redirect table
//! - **Routing Table**: Pocket API host to target base URL
//! - **Decision**: Pure rewrite of a request against the table
//! - **Delegate**: The host's original request function
//! - **Entry Point**: Lazy, once-only table load plus dispatch
//! - **Hook**: What to patch in the host and how the pieces are wired
//!
//! # Architecture
//!
//! ```text
//! Host makeRequest() (patched)
//!     │
//!     ▼
//! InterceptionContext::intercept
//!     ├─ first call → ConfigLoader::load → RedirectTable
//!     ├─ decide(request, table)
//!     └─ Delegate::dispatch(effective request) → original makeRequest()
//! ```

pub mod config_loader;
pub mod decision;
pub mod delegate;
pub mod entry_point;
pub mod hook;
pub mod request;
pub mod routing_table;

// Re-export commonly used types
pub use config_loader::{ConfigLoader, LoadReport};
pub use decision::{decide, evaluate, Decision};
pub use delegate::Delegate;
pub use entry_point::{EntryState, InterceptionContext};
pub use hook::{install, HookInstaller, HookSpec, PluginInfo};
pub use request::{CacheLoadControl, RequestDescriptor, ResponseSink};
pub use routing_table::{EligibleHost, RedirectRule, RedirectTable};
