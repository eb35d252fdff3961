// packages/engine/src/utils/errors.rs
//! Engine error types
//!
//! None of these ever reach the host application. They are produced inside
//! the engine, logged, and turned into passthrough behavior at the edges.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised inside the redirect engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine settings could not be assembled
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Redirect configuration file missing or unreadable
    #[error("Configuration unavailable at {}: {source}", .path.display())]
    ConfigUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Redirect configuration line that is neither a section, a key/value
    /// pair, a comment, nor blank
    #[error("Configuration syntax error at line {line}: {content:?}")]
    ConfigSyntax { line: usize, content: String },

    /// Redirect target that is not an absolute `scheme://host[:port]` URL
    #[error("Invalid redirect target {value:?}: {reason}")]
    InvalidTarget { value: String, reason: String },

    /// Original call site could not be resolved or replaced
    #[error("Hook installation failed: {0}")]
    InstallationFailed(String),

    #[error(transparent)]
    Settings(#[from] config::ConfigError),
}

impl EngineError {
    /// Line number for syntax errors
    pub fn line(&self) -> Option<usize> {
        match self {
            EngineError::ConfigSyntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
