//! Brandlens CLI library.
//!
//! This library provides the core functionality for the Brandlens command-line interface,
//! including configuration management, command execution, record storage, the persistent
//! compression cache and output formatting.

pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod record;

pub use cache::{FileCache, CACHE_FILE_NAME};
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
