//! Output formatting for the CLI.

use crate::config::Config;
use crate::record::{AnalysisRecord, RecordStats};
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Characters of a question shown in listings
const QUESTION_PREVIEW_CHARS: usize = 50;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format a section heading with an underline.
    pub fn heading(&self, title: &str, width: usize) -> String {
        format!("{}\n{}", self.colorize(title, "cyan"), "=".repeat(width))
    }

    /// Format the detailed metrics of one analysis.
    pub fn analysis_summary(&self, record: &AnalysisRecord) -> String {
        let totals = &record.metadata.totals;
        let tokens = &record.metadata.token_counts;
        let compression = &record.metadata.compression;

        let budget = if totals.budget_respected {
            self.colorize("PASSED", "green")
        } else {
            self.colorize("FAILED", "red")
        };

        let mut lines = vec![
            self.colorize("Analysis Summary:", "cyan"),
            format!("  Citations: {}", totals.citations),
            format!(
                "  Mentions: {} ({} linked, {} unlinked)",
                totals.mentions.total, totals.mentions.linked, totals.mentions.unlinked
            ),
            format!("  Sources: {}", totals.sources),
            format!("  Owned Sources: {}", totals.owned_sources),
            format!("  Searches Used: {}/{}", totals.searches_used, totals.max_searches),
            format!(
                "  Tokens: {} total ({} input, {} output)",
                tokens.total_tokens, tokens.input_tokens, tokens.output_tokens
            ),
            format!("  Budget Compliance: {}", budget),
        ];

        if compression.used_fallback {
            lines.push(self.warning("Question compression failed; original question sent"));
        } else if record.metadata.final_question != record.metadata.question {
            lines.push(format!(
                "  Question Compression: {:.0}% of original tokens",
                compression.ratio_achieved * 100.0
            ));
        }

        lines.join("\n")
    }

    /// Format aggregate statistics and the recent analyses table.
    pub fn stats_report(&self, source: &str, stats: &RecordStats) -> String {
        let mut lines = vec![
            self.heading(&format!("Analysis Statistics from {}", source), 50),
            format!("Total Analyses: {}", stats.analyses),
            format!("Total Citations: {}", stats.citations),
            format!("Total Mentions: {}", stats.mentions),
            format!("Total Tokens: {}", stats.tokens),
        ];

        if stats.analyses > 0 {
            lines.push(format!("Average Citations per Analysis: {:.1}", stats.average_citations()));
            lines.push(format!("Average Mentions per Analysis: {:.1}", stats.average_mentions()));
            lines.push(format!("Average Tokens per Analysis: {:.0}", stats.average_tokens()));
        }

        if !stats.recent.is_empty() {
            lines.push(String::new());
            lines.push(self.colorize("Recent Analyses:", "cyan"));
            lines.push(self.recent_table(stats));
        }

        lines.join("\n")
    }

    fn recent_table(&self, stats: &RecordStats) -> String {
        let mut builder = Builder::default();
        builder.push_record(["#", "Brand", "Question", "Citations"]);

        for (i, recent) in stats.recent.iter().enumerate() {
            builder.push_record([
                (i + 1).to_string(),
                recent.brand.clone(),
                preview(&recent.question),
                recent.citations.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the effective configuration.
    pub fn config_report(&self, config: &Config, path: &str) -> String {
        let api_key = if config.llm.api_key.is_some() {
            self.colorize("Set", "green")
        } else {
            self.colorize("Not set", "red")
        };

        let mut lines = vec![
            self.heading("Brandlens Configuration", 40),
            format!("Config File: {}", path),
            format!("Model: {}", config.llm.model),
            format!("API Key: {}", api_key),
            format!("Base URL: {}", config.llm.base_url),
            format!("Max Tokens: {}", config.llm.max_tokens),
            format!(
                "Compression: threshold {} tokens, ratio {}",
                config.compression.token_threshold, config.compression.ratio
            ),
        ];

        if config.llm.api_key.is_none() {
            lines.push(String::new());
            lines.push(self.warning("OPENAI_API_KEY not set. Export it or add it to the config file."));
        }

        lines.join("\n")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First characters of a question, marked as truncated when cut
fn preview(question: &str) -> String {
    if question.chars().count() <= QUESTION_PREVIEW_CHARS {
        question.to_string()
    } else {
        let cut: String = question.chars().take(QUESTION_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}
