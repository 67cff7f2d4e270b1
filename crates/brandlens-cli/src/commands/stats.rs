//! Stats command implementation.

use crate::cli::StatsArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::record::{load_records, RecordStats};
use std::io::ErrorKind;

/// Execute the stats command.
pub fn execute_stats(args: StatsArgs, formatter: &Formatter) -> Result<()> {
    let records = match load_records(&args.file) {
        Ok(records) => records,
        Err(CliError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            println!(
                "{}",
                formatter.error(&format!(
                    "File {} not found. Run some analyses first!",
                    args.file.display()
                ))
            );
            return Ok(());
        }
        Err(CliError::Serialization(_)) => {
            println!(
                "{}",
                formatter.error(&format!("Invalid JSON in {}", args.file.display()))
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let stats = RecordStats::from_records(&records);
    println!("{}", formatter.stats_report(&args.file.display().to_string(), &stats));

    Ok(())
}
