//! Config command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(config: &Config, path: &Path, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.config_report(config, &path.display().to_string()));
    Ok(())
}
