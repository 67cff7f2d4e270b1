//! OpenRouter Provider Implementation
//!
//! Talks to any OpenAI-compatible chat completions endpoint; OpenRouter is
//! the default.
//!
//! # Features
//!
//! - Async HTTP communication with the chat completions API
//! - Configurable base URL, model, token limit and temperature
//! - Retry logic with exponential backoff
//! - Token usage reporting
//!
//! # Examples
//!
//! ```no_run
//! use brandlens_llm::OpenRouterProvider;
//!
//! # async fn run() -> Result<(), brandlens_llm::LlmError> {
//! let provider = OpenRouterProvider::new("sk-or-...", "nousresearch/hermes-2-pro-llama-3-8b");
//! let completion = provider.chat("Which Tesla model is cheapest?").await?;
//! println!("{} ({} tokens)", completion.text, completion.usage.total_tokens);
//! # Ok(())
//! # }
//! ```

use crate::LlmError;
use brandlens_domain::LlmProvider;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "nousresearch/hermes-2-pro-llama-3-8b";

/// Default completion token limit
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// System message sent with every request
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions about brands and companies.";

/// Token accounting reported by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the request
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens generated
    #[serde(default)]
    pub completion_tokens: u32,
    /// Sum of both
    #[serde(default)]
    pub total_tokens: u32,
}

/// A model answer with its token usage
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Content of the first choice
    pub text: String,
    /// Zeroed when the API omits usage
    pub usage: TokenUsage,
}

/// Chat completions provider
pub struct OpenRouterProvider {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterProvider {
    /// Create a provider for `model` on the default base URL
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Use another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the completion token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Endpoint requests are posted to
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Send `prompt` as the user message
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The API key is rejected
    /// - The model is not available
    /// - Network communication fails on every attempt
    /// - The response has no content
    pub async fn chat(&self, prompt: &str) -> Result<Completion, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let url = self.endpoint();

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            debug!("POST {} (model {}, attempt {})", url, self.model, attempts + 1);
            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.json::<ChatResponse>().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        return completion_from(body);
                    } else if status == reqwest::StatusCode::UNAUTHORIZED
                        || status == reqwest::StatusCode::FORBIDDEN
                    {
                        return Err(LlmError::Unauthorized);
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("LLM request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    /// Send `prompt` and return only the text
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat(prompt).await.map(|completion| completion.text)
    }

    fn generate_on_new_runtime(&self, prompt: &str) -> Result<String, LlmError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?
            .block_on(OpenRouterProvider::generate(self, prompt))
    }
}

fn completion_from(body: ChatResponse) -> Result<Completion, LlmError> {
    let text = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no content".to_string()))?;

    Ok(Completion {
        text,
        usage: body.usage.unwrap_or_default(),
    })
}

impl LlmProvider for OpenRouterProvider {
    type Error = LlmError;

    /// Blocking wrapper around [`OpenRouterProvider::generate`]
    ///
    /// Safe to call from any thread. On a multi-threaded runtime the request
    /// runs through `block_in_place`; a current-thread runtime cannot be
    /// re-entered, so the request runs on a scoped thread with its own
    /// runtime, as it does when no runtime is present.
    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let Ok(handle) = Handle::try_current() else {
            return self.generate_on_new_runtime(prompt);
        };

        match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(OpenRouterProvider::generate(self, prompt)))
            }
            _ => thread::scope(|scope| {
                scope
                    .spawn(|| self.generate_on_new_runtime(prompt))
                    .join()
                    .unwrap_or_else(|_| Err(LlmError::Other("Generation thread panicked".to_string())))
            }),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
