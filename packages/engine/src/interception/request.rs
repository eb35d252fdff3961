// packages/engine/src/interception/request.rs
//! Intercepted request descriptor
//!
//! Mirrors the argument list of the host's request call. Only `url` is ever
//! read or rewritten by the engine; every other field is carried through
//! untouched.

use bytes::Bytes;
use std::collections::BTreeMap;
use url::Url;

/// Cache-load mode selected by the host for the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CacheLoadControl {
    AlwaysNetwork,
    #[default]
    PreferNetwork,
    PreferCache,
    AlwaysCache,
}

impl CacheLoadControl {
    /// Map the host's raw discriminant
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::AlwaysNetwork),
            1 => Some(Self::PreferNetwork),
            2 => Some(Self::PreferCache),
            3 => Some(Self::AlwaysCache),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::AlwaysNetwork => 0,
            Self::PreferNetwork => 1,
            Self::PreferCache => 2,
            Self::AlwaysCache => 3,
        }
    }
}

/// Opaque handle to the host object that receives the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResponseSink(usize);

impl ResponseSink {
    pub const fn from_raw(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn as_raw(self) -> usize {
        self.0
    }
}

/// Full parameter set of one outgoing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Destination URL
    pub url: Url,

    /// Host-defined string parameter
    pub param: String,

    /// Request headers
    pub headers: BTreeMap<String, String>,

    /// Request body
    pub body: Bytes,

    /// Where the host wants the response delivered
    pub sink: ResponseSink,

    /// Two host-defined integer flags
    pub flags: [i32; 2],

    /// Cache-load mode
    pub cache_control: CacheLoadControl,
}

impl RequestDescriptor {
    /// Create a descriptor for `url` with empty pass-through fields
    pub fn new(url: Url) -> Self {
        Self {
            url,
            param: String::new(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
            sink: ResponseSink::default(),
            flags: [0, 0],
            cache_control: CacheLoadControl::default(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_sink(mut self, sink: ResponseSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_flags(mut self, first: i32, second: i32) -> Self {
        self.flags = [first, second];
        self
    }

    pub fn with_cache_control(mut self, cache_control: CacheLoadControl) -> Self {
        self.cache_control = cache_control;
        self
    }

    /// Host of the destination URL, if it has one
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}
