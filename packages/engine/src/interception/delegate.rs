// packages/engine/src/interception/delegate.rs
//! Original-call delegate
//!
//! The hook installer hands back the host's original request function as a
//! [`Delegate`]. The engine calls it once per intercepted request with the
//! effective descriptor and never looks at what it does.

use crate::interception::request::RequestDescriptor;

/// Performs the request the host originally asked for
pub trait Delegate: Send + Sync {
    /// Execute `request` exactly as the original call site would
    fn dispatch(&self, request: RequestDescriptor);
}

impl<F> Delegate for F
where
    F: Fn(RequestDescriptor) + Send + Sync,
{
    fn dispatch(&self, request: RequestDescriptor) {
        self(request)
    }
}
