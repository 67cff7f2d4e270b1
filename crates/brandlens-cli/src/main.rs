//! Brandlens CLI - Brand visibility analysis of LLM answers.

use brandlens_cli::commands;
use brandlens_cli::{Cli, Command, Config, Formatter, CACHE_FILE_NAME};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> brandlens_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (log to stderr, RUST_LOG wins)
    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load or create config
    let path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let mut config = if path.exists() {
        Config::load_from(&path)?
    } else {
        let cfg = Config::default();
        cfg.save_to(&path).ok();
        cfg
    };
    config.apply_process_env()?;

    // Create formatter
    let formatter = Formatter::new(!cli.no_color && config.settings.color);

    // Handle commands
    match cli.command {
        Command::Analyze(args) => {
            let cache_path = path.with_file_name(CACHE_FILE_NAME);
            commands::execute_analyze(args, &config, &cache_path, &formatter).await?
        }
        Command::Stats(args) => commands::execute_stats(args, &formatter)?,
        Command::Config => commands::execute_config(&config, &path, &formatter)?,
    }

    Ok(())
}
