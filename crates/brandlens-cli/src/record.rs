//! Persisted analysis records.
//!
//! Records are appended to a JSON array file. A file holding a single object
//! is upgraded to an array on the next append.

use crate::error::Result;
use brandlens_domain::{Citation, CompressionOutcome, CompressionResult, Mention};
use brandlens_extractor::AnalysisReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// One analyzed answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// The model's answer
    pub human_response_markdown: String,
    /// Unique citations
    pub citations: Vec<Citation>,
    /// Brand mentions
    pub mentions: Vec<Mention>,
    /// External source URLs
    pub sources: Vec<String>,
    /// Brand-owned source URLs
    pub owned_sources: Vec<String>,
    /// Run details
    pub metadata: RecordMetadata,
}

/// Run details of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Brand analyzed
    pub brand_name: String,
    /// Brand website
    pub website_url: String,
    /// Question as asked
    pub question: String,
    /// Question as sent, after compression
    pub final_question: String,
    /// What compression did
    pub compression: CompressionMetadata,
    /// Prompt and answer sizes
    pub token_counts: TokenCounts,
    /// Headline numbers
    pub totals: Totals,
}

/// Compression details of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionMetadata {
    /// Passthrough, compressed or fallback (with reason)
    #[serde(flatten)]
    pub outcome: CompressionOutcome,
    /// Ratio asked for
    pub ratio_requested: f64,
    /// Ratio obtained over the whole question
    pub ratio_achieved: f64,
    /// Whether the original question was sent after a failure
    pub used_fallback: bool,
}

impl From<&CompressionResult> for CompressionMetadata {
    fn from(result: &CompressionResult) -> Self {
        Self {
            outcome: result.outcome.clone(),
            ratio_requested: result.ratio_requested,
            ratio_achieved: result.ratio_achieved,
            used_fallback: result.used_fallback,
        }
    }
}

/// Token usage of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    /// Prompt tokens
    pub input_tokens: usize,
    /// Answer tokens
    pub output_tokens: usize,
    /// Sum of both
    pub total_tokens: usize,
}

impl TokenCounts {
    /// Counts with their total
    pub fn new(input_tokens: usize, output_tokens: usize) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Headline numbers of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Unique citations
    pub citations: usize,
    /// Mention counts
    pub mentions: MentionTotals,
    /// External sources
    pub sources: usize,
    /// Owned sources
    pub owned_sources: usize,
    /// Unique domains cited
    pub searches_used: usize,
    /// Search budget
    pub max_searches: usize,
    /// Source budget
    pub max_sources: usize,
    /// Both budgets respected
    pub budget_respected: bool,
}

/// Mention counts of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionTotals {
    /// All mentions
    pub total: usize,
    /// With a URL
    pub linked: usize,
    /// Without a URL
    pub unlinked: usize,
}

/// Inputs of one run besides the answer.
#[derive(Debug, Clone)]
pub struct RunContext<'a> {
    /// Brand analyzed
    pub brand_name: &'a str,
    /// Brand website
    pub website_url: &'a str,
    /// Question as asked
    pub question: &'a str,
    /// Compression of the question
    pub compression: &'a CompressionResult,
    /// Prompt and answer sizes
    pub token_counts: TokenCounts,
}

impl AnalysisRecord {
    /// Assemble a record from an answer and its analysis
    pub fn new(response: &str, report: AnalysisReport, context: RunContext<'_>) -> Self {
        let totals = Totals {
            citations: report.citations.len(),
            mentions: MentionTotals {
                total: report.mentions.len(),
                linked: report.linked_mentions(),
                unlinked: report.unlinked_mentions(),
            },
            sources: report.sources.external.len(),
            owned_sources: report.sources.owned.len(),
            searches_used: report.usage.searches_used,
            max_searches: report.usage.max_searches,
            max_sources: report.usage.max_sources,
            budget_respected: report.usage.budget_respected,
        };

        Self {
            human_response_markdown: response.to_string(),
            citations: report.citations,
            mentions: report.mentions,
            sources: report.sources.external,
            owned_sources: report.sources.owned,
            metadata: RecordMetadata {
                brand_name: context.brand_name.to_string(),
                website_url: context.website_url.to_string(),
                question: context.question.to_string(),
                final_question: context.compression.compressed.clone(),
                compression: context.compression.into(),
                token_counts: context.token_counts,
                totals,
            },
        }
    }
}

/// Read stored records as loose JSON values
///
/// A lone object is returned as a one-element list.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path)?;
    Ok(match serde_json::from_str::<Value>(&contents)? {
        Value::Array(records) => records,
        other => vec![other],
    })
}

/// Append `record` to the JSON array at `path`
///
/// Missing parent directories are created. An unreadable or invalid file is
/// replaced.
pub fn append_record(path: &Path, record: &AnalysisRecord) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut records = if path.exists() {
        load_records(path).unwrap_or_else(|e| {
            warn!("Replacing unreadable results file {}: {}", path.display(), e);
            Vec::new()
        })
    } else {
        Vec::new()
    };

    records.push(serde_json::to_value(record)?);
    fs::write(path, serde_json::to_string_pretty(&records)?)?;
    debug!("Wrote {} records to {}", records.len(), path.display());

    Ok(records.len())
}

/// Aggregates over stored records.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStats {
    /// Number of records
    pub analyses: usize,
    /// Sum of citations
    pub citations: u64,
    /// Sum of mentions
    pub mentions: u64,
    /// Sum of tokens
    pub tokens: u64,
    /// The last five records, oldest first
    pub recent: Vec<RecentAnalysis>,
}

/// Short description of one stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentAnalysis {
    /// Brand analyzed
    pub brand: String,
    /// Question as asked
    pub question: String,
    /// Citation count
    pub citations: u64,
}

impl RecordStats {
    /// Number of recent records kept
    pub const RECENT: usize = 5;

    /// Aggregate records, treating missing fields as zero
    pub fn from_records(records: &[Value]) -> Self {
        let totals = |r: &Value, field: &str| r["metadata"]["totals"][field].as_u64().unwrap_or(0);

        let citations = records.iter().map(|r| totals(r, "citations")).sum();
        let mentions = records
            .iter()
            .map(|r| r["metadata"]["totals"]["mentions"]["total"].as_u64().unwrap_or(0))
            .sum();
        let tokens = records
            .iter()
            .map(|r| r["metadata"]["token_counts"]["total_tokens"].as_u64().unwrap_or(0))
            .sum();

        let recent = records
            .iter()
            .skip(records.len().saturating_sub(Self::RECENT))
            .map(|r| RecentAnalysis {
                brand: r["metadata"]["brand_name"].as_str().unwrap_or("Unknown").to_string(),
                question: r["metadata"]["question"].as_str().unwrap_or("Unknown").to_string(),
                citations: totals(r, "citations"),
            })
            .collect();

        Self {
            analyses: records.len(),
            citations,
            mentions,
            tokens,
            recent,
        }
    }

    fn average(&self, sum: u64) -> f64 {
        if self.analyses == 0 {
            0.0
        } else {
            sum as f64 / self.analyses as f64
        }
    }

    /// Mean citations per record
    pub fn average_citations(&self) -> f64 {
        self.average(self.citations)
    }

    /// Mean mentions per record
    pub fn average_mentions(&self) -> f64 {
        self.average(self.mentions)
    }

    /// Mean tokens per record
    pub fn average_tokens(&self) -> f64 {
        self.average(self.tokens)
    }
}
