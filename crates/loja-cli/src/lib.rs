//! Loja CLI - terminal front end
//!
//! Configuration loading, logging setup and the command implementations
//! behind the `loja` binary.

#![warn(unreachable_pub)]

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{StorefrontConfig, DEFAULT_CONFIG_FILE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
