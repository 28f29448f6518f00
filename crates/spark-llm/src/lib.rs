//! AI suggestion adapter with multi-provider fallback.
//!
//! Supports Gemini, Anthropic (Claude), and OpenAI-compatible endpoints,
//! tried in priority order with automatic fallback on rate limits or
//! failures.
//!
//! The adapter is best-effort enrichment, never a blocking dependency:
//! [`SuggestService::suggest`] returns the empty [`Suggestions`] default on
//! any failure (no providers, missing credentials, network error, malformed
//! response) instead of propagating an error to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;
use tracing::{debug, warn};

use spark_models::Suggestions;

/// Maximum retries per provider before fallback
const MAX_RETRIES: u32 = 2;

/// Delay between retries (doubles each time)
const RETRY_DELAY_MS: u64 = 500;

/// Token budget for a suggestion completion
const SUGGESTION_MAX_TOKENS: u32 = 400;

/// Error types for the suggestion adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("No providers configured")]
    NoProviders,

    #[error("Request failed: {0}")]
    Request(String),
}

/// Result type for adapter internals.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration for one LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub priority: u8,
}

/// Configuration for the adapter.
#[derive(Debug, Clone, Default)]
pub struct SuggestConfig {
    pub providers: Vec<ProviderConfig>,
}

/// Get default endpoint for a provider
pub fn default_endpoint(name: &str) -> String {
    match name {
        "gemini" => "https://generativelanguage.googleapis.com/v1beta".to_string(),
        "anthropic" => "https://api.anthropic.com/v1".to_string(),
        _ => "https://api.openai.com/v1".to_string(),
    }
}

/// Get default model for a provider
pub fn default_model(name: &str) -> String {
    match name {
        "gemini" => "gemini-1.5-flash".to_string(),
        "anthropic" => "claude-3-5-haiku-20241022".to_string(),
        _ => "gpt-4o-mini".to_string(),
    }
}

/// Response from LLM API
#[derive(Debug, Deserialize)]
struct LlmResponse {
    choices: Option<Vec<Choice>>,
    candidates: Option<Vec<Candidate>>,     // Gemini format
    content: Option<Vec<AnthropicContent>>, // Anthropic format
    error: Option<LlmError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    content_type: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct LlmError {
    message: String,
}

/// Suggestion service with automatic provider fallback.
#[derive(Clone)]
pub struct SuggestService {
    client: Client,
    providers: Vec<ProviderConfig>,
}

impl SuggestService {
    /// Create the service from config. Providers are tried in priority
    /// order.
    pub fn new(config: &SuggestConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        let mut providers = config.providers.clone();
        providers.sort_by_key(|p| p.priority);

        debug!(
            providers = ?providers.iter().map(|p| &p.name).collect::<Vec<_>>(),
            "Suggestion service initialized"
        );

        Self { client, providers }
    }

    /// Whether any provider carries credentials. Lets the HTTP surface
    /// return a non-fatal notice instead of silently empty suggestions.
    pub fn is_available(&self) -> bool {
        self.providers.iter().any(|p| !p.api_key.is_empty())
    }

    /// Provider names in priority order
    pub fn providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name.clone()).collect()
    }

    /// Suggest tags and next steps for an idea.
    ///
    /// Never fails: any error inside the adapter degrades to the empty
    /// suggestion set with a warning.
    pub async fn suggest(&self, title: &str, content: &str) -> Suggestions {
        let prompt = suggestion_prompt(title, content);

        match self.complete(&prompt, SUGGESTION_MAX_TOKENS).await {
            Ok(text) => match extract_json(&text).map(parse_suggestions) {
                Some(suggestions) => suggestions,
                None => {
                    warn!("Suggestion response carried no parseable JSON");
                    Suggestions::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "Suggestion call failed, returning empty defaults");
                Suggestions::default()
            }
        }
    }

    /// Complete a prompt with automatic provider fallback.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        if self.providers.is_empty() {
            return Err(Error::NoProviders);
        }

        let mut last_error = None;

        for provider in &self.providers {
            if provider.api_key.is_empty() {
                debug!(provider = %provider.name, "Skipping provider without credentials");
                continue;
            }

            match self.try_provider(provider, prompt, max_tokens).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        provider = %provider.name,
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(Error::NoProviders))
    }

    /// Try a specific provider with retries.
    async fn try_provider(
        &self,
        provider: &ProviderConfig,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let mut delay = Duration::from_millis(RETRY_DELAY_MS);

        for attempt in 0..MAX_RETRIES {
            match self.call_provider(provider, prompt, max_tokens).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if is_retryable(&e) && attempt < MAX_RETRIES - 1 {
                        debug!(
                            provider = %provider.name,
                            attempt,
                            delay_ms = delay.as_millis(),
                            "Retrying after error"
                        );
                        sleep(delay).await;
                        delay *= 2;
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(Error::Llm(format!(
            "Provider {} failed after {} retries",
            provider.name, MAX_RETRIES
        )))
    }

    /// Make the actual API call to a provider.
    async fn call_provider(
        &self,
        provider: &ProviderConfig,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        debug!(
            provider = %provider.name,
            model = %provider.model,
            "Calling LLM provider"
        );

        let (url, body) = match provider.name.as_str() {
            "gemini" => build_gemini_request(provider, prompt, max_tokens),
            "anthropic" => build_anthropic_request(provider, prompt, max_tokens),
            _ => build_openai_request(provider, prompt, max_tokens),
        };

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        // Authentication header scheme differs per provider
        request = match provider.name.as_str() {
            "gemini" => request, // key travels in the URL
            "anthropic" => request
                .header("x-api-key", &provider.api_key)
                .header("anthropic-version", "2023-06-01"),
            _ => request.header("Authorization", format!("Bearer {}", provider.api_key)),
        };

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("Failed to read response: {}", e)))?;

        if status.as_u16() == 429 {
            return Err(Error::RateLimitExceeded);
        }

        if !status.is_success() {
            return Err(Error::Llm(format!(
                "Provider returned {}: {}",
                status, text
            )));
        }

        parse_response(&provider.name, &text)
    }
}

/// Check if an error is retryable
fn is_retryable(error: &Error) -> bool {
    matches!(error, Error::RateLimitExceeded)
        || error.to_string().contains("rate limit")
        || error.to_string().contains("503")
        || error.to_string().contains("timeout")
}

/// Build request for the Gemini API
fn build_gemini_request(
    provider: &ProviderConfig,
    prompt: &str,
    max_tokens: u32,
) -> (String, Value) {
    let url = format!(
        "{}/models/{}:generateContent?key={}",
        provider.base_url, provider.model, provider.api_key
    );

    let body = json!({
        "contents": [{
            "parts": [{"text": prompt}]
        }],
        "generationConfig": {
            "maxOutputTokens": max_tokens,
            "temperature": 0.3
        }
    });

    (url, body)
}

/// Build request for OpenAI-compatible APIs
fn build_openai_request(
    provider: &ProviderConfig,
    prompt: &str,
    max_tokens: u32,
) -> (String, Value) {
    let url = format!("{}/chat/completions", provider.base_url);

    let body = json!({
        "model": provider.model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "max_tokens": max_tokens,
        "temperature": 0.3
    });

    (url, body)
}

/// Build request for the Anthropic Claude API
fn build_anthropic_request(
    provider: &ProviderConfig,
    prompt: &str,
    max_tokens: u32,
) -> (String, Value) {
    let url = format!("{}/messages", provider.base_url);

    let body = json!({
        "model": provider.model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "max_tokens": max_tokens,
        "temperature": 0.3
    });

    (url, body)
}

/// Parse response bodies from the different API formats
fn parse_response(provider: &str, text: &str) -> Result<String> {
    let response: LlmResponse = serde_json::from_str(text)
        .map_err(|e| Error::Llm(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(Error::Llm(error.message));
    }

    // Try Anthropic format first
    if let Some(content) = response.content {
        if let Some(content_block) = content.first() {
            return Ok(content_block.text.clone());
        }
    }

    // Try Gemini format
    if let Some(candidates) = response.candidates {
        if let Some(candidate) = candidates.first() {
            if let Some(part) = candidate.content.parts.first() {
                return Ok(part.text.clone());
            }
        }
    }

    // Try OpenAI format
    if let Some(choices) = response.choices {
        if let Some(choice) = choices.first() {
            if let Some(message) = &choice.message {
                return Ok(message.content.clone());
            }
            if let Some(text) = &choice.text {
                return Ok(text.clone());
            }
        }
    }

    Err(Error::Llm(format!("No content in {} response", provider)))
}

/// Prompt asking for strict-JSON tag and next-step suggestions.
fn suggestion_prompt(title: &str, content: &str) -> String {
    format!(
        "You help organize a personal idea journal. Given the idea below, \
         suggest up to 5 short lowercase tags and up to 3 concrete next steps.\n\
         Respond with JSON only, in the shape \
         {{\"tags\": [\"...\"], \"next_steps\": [\"...\"]}}.\n\n\
         Title: {}\n\nIdea:\n{}",
        title, content
    )
}

/// Read a suggestion set out of an LLM JSON object, clamping list sizes.
fn parse_suggestions(json: Value) -> Suggestions {
    let string_list = |value: Option<&Value>| -> Vec<String> {
        value
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    };

    Suggestions::clamped(
        string_list(json.get("tags")),
        string_list(json.get("next_steps")),
    )
}

/// Extract JSON from LLM response text
pub fn extract_json(text: &str) -> Option<Value> {
    // Try to find JSON in code blocks
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            if let Ok(json) = serde_json::from_str(&text[start..start + end]) {
                return Some(json);
            }
        }
    }

    // Try to find JSON in generic code blocks
    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip language identifier if present
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            if let Ok(json) = serde_json::from_str(&text[start..start + end]) {
                return Some(json);
            }
        }
    }

    // Try to find a raw JSON object
    if let Some(start) = text.find('{') {
        let mut depth = 0;
        let mut end = start;
        for (i, c) in text[start..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        if end > start {
            if let Ok(json) = serde_json::from_str(&text[start..end]) {
                return Some(json);
            }
        }
    }

    None
}
