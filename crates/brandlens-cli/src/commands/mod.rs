//! Command implementations.

pub mod analyze;
pub mod config;
pub mod stats;

pub use self::analyze::execute_analyze;
pub use self::config::execute_config;
pub use self::stats::execute_stats;
