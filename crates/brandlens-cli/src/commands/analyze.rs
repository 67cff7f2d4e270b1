//! Analyze command implementation.

use crate::cache::FileCache;
use crate::cli::{AnalyzeArgs, PromptStyle};
use crate::config::{Config, LlmSettings, SummarizerKind};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::record::{append_record, AnalysisRecord, RunContext, TokenCounts};
use brandlens_compressor::{CompressorConfig, PromptBuilder, PromptCompressor};
use brandlens_domain::{CompressionCache, CompressionResult, TokenCounter};
use brandlens_extractor::{Budget, ResponseAnalyzer};
use brandlens_llm::{LeadSentenceSummarizer, LlmSummarizer, OpenRouterProvider, TiktokenCounter};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Execute the analyze command.
///
/// Compressed backgrounds are remembered in the cache file at `cache_path`.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    config: &Config,
    cache_path: &Path,
    formatter: &Formatter,
) -> Result<()> {
    let llm = llm_settings(&args, config);
    let compression = compression_config(&args, config)?;
    let summarizer = args.summarizer.map(Into::into).unwrap_or(config.settings.summarizer);
    let api_key = llm
        .api_key
        .clone()
        .ok_or_else(|| CliError::MissingApiKey(config_path_hint()))?;

    println!("{}", formatter.info(&format!("Analyzing {}...", args.brand)));

    // Step 1: Compress the question and build the prompt
    let compressed = if args.no_compress {
        CompressionResult::passthrough(args.question.clone(), compression.ratio)
    } else {
        compress_question(&args.question, compression, summarizer, cache_path, &llm, &api_key).await?
    };

    let builder = PromptBuilder::new(&args.brand, &args.url, &compressed.compressed)
        .with_budget(args.max_searches, args.max_sources);
    let prompt = match args.prompt_style {
        PromptStyle::Compact => builder.build(),
        PromptStyle::Verbose => builder.build_verbose(),
    };
    debug!("Prompt:\n{}", prompt);

    // Step 2: Generate the answer
    println!("{}", formatter.info("Generating response..."));
    let completion = provider(&llm, &api_key).chat(&prompt).await?;
    let response = completion.text;

    // Step 3: Extract and analyze
    println!("{}", formatter.info("Analyzing response..."));
    let budget = Budget {
        max_searches: args.max_searches,
        max_sources: args.max_sources,
    };
    let report = ResponseAnalyzer::new(config.extraction.clone()).analyze(&response, &args.brand, &args.url, budget);

    let counter = TiktokenCounter::new();
    let token_counts = match completion.usage.total_tokens {
        0 => TokenCounts::new(
            counter.count_tokens(&prompt, &llm.model),
            counter.count_tokens(&response, &llm.model),
        ),
        _ => TokenCounts::new(
            completion.usage.prompt_tokens as usize,
            completion.usage.completion_tokens as usize,
        ),
    };

    // Step 4: Save
    let record = AnalysisRecord::new(
        &response,
        report,
        RunContext {
            brand_name: &args.brand,
            website_url: &args.url,
            question: &args.question,
            compression: &compressed,
            token_counts,
        },
    );
    let stored = append_record(&args.output, &record)?;
    info!("Stored analysis #{} in {}", stored, args.output.display());

    println!(
        "{}",
        formatter.success(&format!("Analysis complete! Results saved to {}", args.output.display()))
    );

    if args.verbose {
        println!("\n{}", formatter.analysis_summary(&record));
    }

    println!("\n{}", formatter.heading(&format!("Response for {}:", args.brand), 50));
    println!("{}", response);

    Ok(())
}

/// Endpoint settings from the config file, overridden by arguments
fn llm_settings(args: &AnalyzeArgs, config: &Config) -> LlmSettings {
    let mut llm = config.llm.clone();
    if let Some(key) = args.api_key.clone().filter(|k| !k.trim().is_empty()) {
        llm.api_key = Some(key);
    }
    if let Some(model) = &args.model {
        llm.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        llm.base_url = base_url.clone();
    }
    if let Some(max_tokens) = args.max_tokens {
        llm.max_tokens = max_tokens;
    }
    llm
}

/// Compression settings from the config file, overridden by arguments
fn compression_config(args: &AnalyzeArgs, config: &Config) -> Result<CompressorConfig> {
    let mut compression = config.compression.clone();
    if let Some(threshold) = args.threshold {
        compression.token_threshold = threshold;
    }
    if let Some(ratio) = args.ratio {
        compression.ratio = ratio;
    }
    compression.validate()?;
    Ok(compression)
}

fn provider(llm: &LlmSettings, api_key: &str) -> OpenRouterProvider {
    OpenRouterProvider::new(api_key, &llm.model)
        .with_base_url(&llm.base_url)
        .with_max_tokens(llm.max_tokens)
        .with_temperature(llm.temperature)
}

/// Run the compressor on a blocking thread
///
/// Summarizers are synchronous; the LLM summarizer drives its HTTP call on
/// the runtime handle from that thread.
async fn compress_question(
    question: &str,
    config: CompressorConfig,
    summarizer: SummarizerKind,
    cache_path: &Path,
    llm: &LlmSettings,
    api_key: &str,
) -> Result<CompressionResult> {
    let question = question.to_string();
    let token_model = llm.model.clone();
    let min_words = config.min_summary_words;
    let cache: Arc<dyn CompressionCache> = Arc::new(FileCache::open(cache_path, &config));

    let task = match summarizer {
        SummarizerKind::Lead => tokio::task::spawn_blocking(move || {
            PromptCompressor::new(config, TiktokenCounter::new(), LeadSentenceSummarizer::new(min_words))
                .with_cache(cache)
                .with_token_model(token_model)
                .compress(&question)
        }),
        SummarizerKind::Llm => {
            let summarizer = LlmSummarizer::new(provider(llm, api_key)).with_min_words(min_words);
            tokio::task::spawn_blocking(move || {
                PromptCompressor::new(config, TiktokenCounter::new(), summarizer)
                    .with_cache(cache)
                    .with_token_model(token_model)
                    .compress(&question)
            })
        }
    };

    Ok(task.await?)
}

fn config_path_hint() -> String {
    Config::path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "~/.brandlens/config.toml".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CACHE_FILE_NAME;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn args(extra: &[&str]) -> AnalyzeArgs {
        let mut argv = vec![
            "brandlens",
            "analyze",
            "--brand",
            "Tesla",
            "--url",
            "https://tesla.com",
            "--question",
            "Which model?",
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Analyze(args) => args,
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_argument_overrides() {
        let config = Config::default();
        let llm = llm_settings(
            &args(&["--model", "gpt-4o-mini", "--max-tokens", "256", "--api-key", "sk-arg"]),
            &config,
        );

        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.max_tokens, 256);
        assert_eq!(llm.api_key.as_deref(), Some("sk-arg"));
    }

    #[test]
    fn test_compression_overrides_validated() {
        let config = Config::default();

        let compression = compression_config(&args(&["--threshold", "10", "--ratio", "0.6"]), &config).unwrap();
        assert_eq!(compression.token_threshold, 10);
        assert_eq!(compression.ratio, 0.6);

        assert!(compression_config(&args(&["--ratio", "1.5"]), &config).is_err());
    }

    fn long_question() -> String {
        format!("{}Which model should I buy?", "We drive long distances every week. ".repeat(30))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_lead_compression_off_runtime_thread() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CompressorConfig {
            token_threshold: 5,
            ..CompressorConfig::default()
        };
        let question = long_question();

        let result = compress_question(
            &question,
            config,
            SummarizerKind::Lead,
            &dir.path().join(CACHE_FILE_NAME),
            &LlmSettings::default(),
            "unused",
        )
        .await
        .unwrap();

        assert!(result.was_compressed());
        assert!(result.compressed.ends_with("Which model should I buy?"));
        assert!(result.compressed.len() < question.len());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_later_runs_reuse_stored_summary() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache_path = dir.path().join(CACHE_FILE_NAME);
        let config = CompressorConfig {
            token_threshold: 5,
            ..CompressorConfig::default()
        };
        let question = long_question();
        let llm = LlmSettings::default();
        let run = || {
            compress_question(
                &question,
                config.clone(),
                SummarizerKind::Lead,
                &cache_path,
                &llm,
                "unused",
            )
        };

        let first = run().await.unwrap();
        assert!(first.was_compressed());

        // Rewrite the stored summary; the next run must read it back
        let mut stored: Vec<serde_json::Value> =
            serde_json::from_str(&std::fs::read_to_string(&cache_path).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        stored[0]["value"]["compressed"] = serde_json::json!("We drive a lot.");
        std::fs::write(&cache_path, serde_json::to_string(&stored).unwrap()).unwrap();

        let second = run().await.unwrap();
        assert_eq!(
            second.compressed,
            "We drive a lot. We drive long distances every week. Which model should I buy?"
        );
    }
}
