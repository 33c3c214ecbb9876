use anyhow::{bail, Context, Result};

use crate::generation::normalizer::JsonExtraction;

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3:latest";

/// Application configuration loaded from environment variables.
/// Every value has a default so the service starts against a local Ollama out of the box.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub llm_retry_delay_ms: u64,
    pub json_extraction: JsonExtraction,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_max_retries: u32 = parse_env("LLM_MAX_RETRIES", 1)?;
        if llm_max_retries == 0 {
            bail!("LLM_MAX_RETRIES must be at least 1");
        }

        Ok(Config {
            ollama_base_url: env_or("OLLAMA_BASE_URL", DEFAULT_OLLAMA_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            ollama_model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries,
            llm_retry_delay_ms: parse_env("LLM_RETRY_DELAY_MS", 1000)?,
            json_extraction: env_or("JSON_EXTRACTION", "strict")
                .parse()
                .context("JSON_EXTRACTION must be 'strict' or 'lenient'")?,
            host: env_or("HOST", "127.0.0.1"),
            port: parse_env("PORT", 8000)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
