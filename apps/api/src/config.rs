use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::LlmSettings;
use crate::matching::BatchPolicy;

pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4-turbo";

/// Application configuration loaded from environment variables.
/// Only the LLM key is optional; every other variable has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Without a key the external strategy is unavailable.
    pub llm_api_key: Option<String>,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    /// Overall deadline for one analysis call, retries included.
    pub llm_timeout: Duration,
    pub llm_max_retries: u32,
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            llm_api_key: None,
            llm_api_url: DEFAULT_LLM_API_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_temperature: 0.3,
            llm_timeout: Duration::from_secs(60),
            llm_max_retries: 3,
            batch_size: 3,
            batch_delay: Duration::from_millis(1000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset and blank values take the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let batch_size: usize = parse_or(&get, "MATCH_BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            anyhow::bail!("MATCH_BATCH_SIZE must be at least 1");
        }

        Ok(Config {
            port: parse_or(&get, "PORT", defaults.port)?,
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
            llm_api_key: get("LLM_API_KEY"),
            llm_api_url: get("LLM_API_URL").unwrap_or(defaults.llm_api_url),
            llm_model: get("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_temperature: parse_or(&get, "LLM_TEMPERATURE", defaults.llm_temperature)?,
            llm_timeout: Duration::from_secs(parse_or(
                &get,
                "LLM_TIMEOUT_SECS",
                defaults.llm_timeout.as_secs(),
            )?),
            llm_max_retries: parse_or(&get, "LLM_MAX_RETRIES", defaults.llm_max_retries)?,
            batch_size,
            batch_delay: Duration::from_millis(parse_or(
                &get,
                "MATCH_BATCH_DELAY_MS",
                defaults.batch_delay.as_millis() as u64,
            )?),
        })
    }

    /// Connection settings for the analysis client, if a key is configured.
    pub fn llm_settings(&self) -> Option<LlmSettings> {
        self.llm_api_key.as_ref().map(|key| LlmSettings {
            api_url: self.llm_api_url.clone(),
            api_key: key.clone(),
            model: self.llm_model.clone(),
            temperature: self.llm_temperature,
            request_timeout: self.attempt_timeout(),
            max_retries: self.llm_max_retries,
        })
    }

    /// Per-attempt HTTP timeout: the overall deadline split across attempts,
    /// so a hung first attempt leaves room for a retry.
    pub fn attempt_timeout(&self) -> Duration {
        self.llm_timeout / self.llm_max_retries.max(1)
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy {
            batch_size: self.batch_size,
            batch_delay: self.batch_delay,
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
