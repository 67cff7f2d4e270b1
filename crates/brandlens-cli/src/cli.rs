//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default file analyses are appended to
pub const DEFAULT_OUTPUT: &str = "output/output.json";

/// Brandlens - Brand visibility analysis of LLM answers.
#[derive(Debug, Parser)]
#[command(name = "brandlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask a model about a brand and analyze its answer
    Analyze(AnalyzeArgs),

    /// Show statistics from previous analyses
    Stats(StatsArgs),

    /// Show current configuration and environment setup
    Config,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Brand name to analyze
    #[arg(long)]
    pub brand: String,

    /// Brand website URL
    #[arg(long)]
    pub url: String,

    /// Question to ask about the brand
    #[arg(long)]
    pub question: String,

    /// Maximum number of web searches (unique domains)
    #[arg(long, default_value = "3")]
    pub max_searches: usize,

    /// Maximum number of sources to include
    #[arg(long, default_value = "6")]
    pub max_sources: usize,

    /// Output file for results
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Show detailed analysis metrics
    #[arg(short, long)]
    pub verbose: bool,

    /// Compress question backgrounds longer than this many tokens
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Fraction of background tokens to keep when compressing
    #[arg(long)]
    pub ratio: Option<f64>,

    /// Send the question verbatim
    #[arg(long)]
    pub no_compress: bool,

    /// How question backgrounds are summarized
    #[arg(long, value_enum)]
    pub summarizer: Option<SummarizerArg>,

    /// Prompt template
    #[arg(long, value_enum, default_value = "compact")]
    pub prompt_style: PromptStyle,

    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long, env = "MODEL_NAME")]
    pub model: Option<String>,

    /// API base URL
    #[arg(long, env = "OPENROUTER_BASE_URL")]
    pub base_url: Option<String>,

    /// Completion token limit
    #[arg(long, env = "MAX_TOKENS")]
    pub max_tokens: Option<u32>,
}

/// Arguments for the stats command.
#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// JSON file to analyze
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub file: PathBuf,
}

/// Summarizer argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SummarizerArg {
    /// Ask the configured model for a summary
    Llm,
    /// Keep leading sentences, offline
    Lead,
}

/// Prompt template argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PromptStyle {
    /// Short instructions
    Compact,
    /// Long, explicit instructions
    Verbose,
}

impl From<SummarizerArg> for crate::config::SummarizerKind {
    fn from(arg: SummarizerArg) -> Self {
        match arg {
            SummarizerArg::Llm => crate::config::SummarizerKind::Llm,
            SummarizerArg::Lead => crate::config::SummarizerKind::Lead,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_command() {
        let cli = Cli::parse_from([
            "brandlens",
            "analyze",
            "--brand",
            "Tesla",
            "--url",
            "https://tesla.com",
            "--question",
            "What are Tesla's latest innovations?",
            "--max-searches",
            "5",
            "--no-compress",
        ]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.brand, "Tesla");
                assert_eq!(args.max_searches, 5);
                assert_eq!(args.max_sources, 6);
                assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT));
                assert!(args.no_compress);
                assert_eq!(args.prompt_style, PromptStyle::Compact);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_requires_brand() {
        let result = Cli::try_parse_from(["brandlens", "analyze", "--url", "x", "--question", "y"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_command() {
        let cli = Cli::parse_from(["brandlens", "stats", "--file", "runs.json"]);
        match cli.command {
            Command::Stats(args) => assert_eq!(args.file, PathBuf::from("runs.json")),
            _ => panic!("Expected Stats command"),
        }
    }

    #[test]
    fn test_summarizer_conversion() {
        let kind: crate::config::SummarizerKind = SummarizerArg::Lead.into();
        assert_eq!(kind, crate::config::SummarizerKind::Lead);
    }
}
