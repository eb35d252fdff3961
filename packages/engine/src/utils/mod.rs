// packages/engine/src/utils/mod.rs
//! Common utilities shared by the engine
//!
//! - **config**: Engine settings (paths, load mode, logging)
//! - **errors**: Error taxonomy and `Result` alias

pub mod config;
pub mod errors;

pub use self::config::EngineConfig;
pub use self::errors::{EngineError, Result};
