// packages/engine/src/lib.rs
//! Pocket Proxy Redirect Engine Library
//!
//! This library decides, for every Pocket API call the e-reader firmware
//! makes, whether the call goes to the real Pocket servers or to an
//! operator-configured replacement endpoint.
//!
//! # Architecture
//!
//! The engine is structured into a few modules:
//!
//! - **interception**: Config loading, redirect table, decision, entry point
//! - **observability**: Tracing setup and counters
//! - **utils**: Engine settings and errors
//!
//! The engine performs no network I/O. It only computes which request the
//! host's original request function should execute.

// Public module exports
pub mod interception;
pub mod observability;
pub mod utils;

// Re-export commonly used types
pub use interception::{
    decide, ConfigLoader, Delegate, InterceptionContext, RedirectTable, RequestDescriptor,
};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
