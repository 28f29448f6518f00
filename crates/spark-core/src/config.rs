//! Configuration management for Spark.
//!
//! Loads configuration from environment variables: server binding, the
//! journal data directory, attachment limits, and optional LLM providers
//! keyed off their API-key variables with fallback priority.

use std::env;
use std::sync::OnceLock;

use spark_llm::{default_endpoint, default_model, ProviderConfig};

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding ideas.json and folders.json
    pub data_dir: String,
    pub max_attachment_size: usize,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub providers: Vec<ProviderConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_or("PORT", "8750").parse().expect("Invalid PORT"),
            },
            storage: StorageConfig {
                data_dir: env_or("DATA_DIR", "./data"),
                max_attachment_size: env_or("MAX_ATTACHMENT_SIZE", "10485760")
                    .parse()
                    .unwrap_or(10 * 1024 * 1024), // 10MB
            },
            llm: LlmConfig {
                providers: Self::parse_llm_providers(),
            },
        }
    }

    /// Parse LLM providers from environment.
    /// Supports Gemini, Anthropic, and OpenAI with automatic fallback ordering.
    fn parse_llm_providers() -> Vec<ProviderConfig> {
        let mut providers = Vec::new();

        // Gemini (priority 1 - free tier)
        if let Ok(api_key) = env::var("GOOGLE_API_KEY") {
            providers.push(ProviderConfig {
                name: "gemini".to_string(),
                base_url: env_or("GEMINI_BASE_URL", &default_endpoint("gemini")),
                model: env_or("GEMINI_MODEL", &default_model("gemini")),
                api_key,
                priority: 1,
            });
        }

        // Anthropic/Claude (priority 2)
        if let Ok(api_key) = env::var("ANTHROPIC_API_KEY") {
            providers.push(ProviderConfig {
                name: "anthropic".to_string(),
                base_url: env_or("ANTHROPIC_BASE_URL", &default_endpoint("anthropic")),
                model: env_or("ANTHROPIC_MODEL", &default_model("anthropic")),
                api_key,
                priority: 2,
            });
        }

        // OpenAI (priority 3)
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            providers.push(ProviderConfig {
                name: "openai".to_string(),
                base_url: env_or("OPENAI_BASE_URL", &default_endpoint("openai")),
                model: env_or("OPENAI_MODEL", &default_model("openai")),
                api_key,
                priority: 3,
            });
        }

        providers.sort_by_key(|p| p.priority);
        providers
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
