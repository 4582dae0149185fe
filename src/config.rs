//! Runtime configuration for demoforge
//!
//! Settings are read from `DEMOFORGE_*` environment variables with defaults for
//! anything unset. CLI flags override individual fields after loading.
//!
//! # Environment Variables
//!
//! - `DEMOFORGE_PROVIDER`: ollama|openai|claude|gemini|grok|groq, default "ollama"
//! - `DEMOFORGE_MODEL`: model name, default depends on the provider
//! - `DEMOFORGE_REQUEST_TIMEOUT`: seconds per provider round trip, default "120"
//! - `DEMOFORGE_GENERATION_TIMEOUT`: seconds per phase generation, unset by default
//! - `DEMOFORGE_MAX_RETRIES`: coding attempts before the run fails, default "3"
//! - `DEMOFORGE_OUTPUT_DIR`: root for generated runs, default "generated_demo"
//! - `DEMOFORGE_TRANSCRIPT_LOG`: JSONL file receiving every prompt and reply
//! - `DEMOFORGE_MAX_TOKENS`: default "4096"
//! - `DEMOFORGE_TEMPERATURE`: default "0.7"
//! - `DEMOFORGE_LOG_LEVEL`: default "info"
//!
//! Provider credentials (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `OLLAMA_HOST`, ...)
//! are read by genai itself.
//!
//! ```no_run
//! use demoforge::DemoforgeConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DemoforgeConfig::default();
//! config.validate()?;
//! let client = config.create_client().await?;
//! # Ok(())
//! # }
//! ```

use crate::llm::{BackendError, GenAIClient, LLMClient};
use crate::util::parse_level;
use crate::workflow::{WorkflowConfig, DEFAULT_MAX_RETRIES};
use genai::adapter::AdapterKind;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_OUTPUT_DIR: &str = "generated_demo";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.7;

const MAX_TIMEOUT_SECS: u64 = 600;
const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: ollama, openai, claude, gemini, grok, groq")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Client initialization failed: {0}")]
    ClientInit(#[from] BackendError),
}

/// Maps a user-facing provider name onto the genai adapter
pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    match name.trim().to_lowercase().as_str() {
        "ollama" => Ok(AdapterKind::Ollama),
        "openai" => Ok(AdapterKind::OpenAI),
        "claude" | "anthropic" => Ok(AdapterKind::Anthropic),
        "gemini" => Ok(AdapterKind::Gemini),
        "grok" | "xai" => Ok(AdapterKind::Xai),
        "groq" => Ok(AdapterKind::Groq),
        other => Err(ConfigError::InvalidProvider(other.to_string())),
    }
}

fn default_model(provider: AdapterKind) -> &'static str {
    match provider {
        AdapterKind::Ollama => DEFAULT_OLLAMA_MODEL,
        AdapterKind::OpenAI => "gpt-4o-mini",
        AdapterKind::Anthropic => "claude-3-5-haiku-latest",
        AdapterKind::Gemini => "gemini-2.0-flash",
        AdapterKind::Xai => "grok-3-mini",
        AdapterKind::Groq => "llama-3.3-70b-versatile",
        _ => DEFAULT_OLLAMA_MODEL,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[derive(Debug, Clone)]
pub struct DemoforgeConfig {
    pub provider: AdapterKind,
    pub model: String,
    /// Seconds allowed for one provider round trip
    pub request_timeout_secs: u64,
    /// Seconds allowed for one phase generation, enforced by the engine
    pub generation_timeout_secs: Option<u64>,
    pub max_retries: u32,
    pub output_dir: PathBuf,
    pub transcript_log: Option<PathBuf>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub log_level: String,
    /// `DEMOFORGE_PROVIDER` value that names no known provider
    pub unknown_provider: Option<String>,
}

impl Default for DemoforgeConfig {
    fn default() -> Self {
        // An unknown name is kept for `validate` to reject
        let (provider, unknown_provider) = match env::var("DEMOFORGE_PROVIDER") {
            Ok(raw) if !raw.trim().is_empty() => match parse_provider(&raw) {
                Ok(provider) => (provider, None),
                Err(_) => (AdapterKind::Ollama, Some(raw.trim().to_string())),
            },
            _ => (AdapterKind::Ollama, None),
        };

        let model = env::var("DEMOFORGE_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_model(provider).to_string());

        let request_timeout_secs =
            env_parsed("DEMOFORGE_REQUEST_TIMEOUT").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let generation_timeout_secs = env_parsed("DEMOFORGE_GENERATION_TIMEOUT");
        let max_retries = env_parsed("DEMOFORGE_MAX_RETRIES").unwrap_or(DEFAULT_MAX_RETRIES);

        let output_dir = env::var("DEMOFORGE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let transcript_log = env::var("DEMOFORGE_TRANSCRIPT_LOG").ok().map(PathBuf::from);

        let max_tokens = env_parsed("DEMOFORGE_MAX_TOKENS").unwrap_or(DEFAULT_MAX_TOKENS);
        let temperature = env_parsed("DEMOFORGE_TEMPERATURE").unwrap_or(DEFAULT_TEMPERATURE);

        let log_level = env::var("DEMOFORGE_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            provider,
            model,
            request_timeout_secs,
            generation_timeout_secs,
            max_retries,
            output_dir,
            transcript_log,
            max_tokens,
            temperature,
            log_level,
            unknown_provider,
        }
    }
}

impl DemoforgeConfig {
    /// Checks numeric ranges and the log level
    ///
    /// Credentials are not checked here; genai reports them when the client
    /// makes its first request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref name) = self.unknown_provider {
            return Err(ConfigError::InvalidProvider(name.clone()));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model name cannot be empty".to_string(),
            ));
        }

        check_timeout("Request timeout", self.request_timeout_secs)?;
        if let Some(secs) = self.generation_timeout_secs {
            check_timeout("Generation timeout", secs)?;
        }

        if self.max_retries == 0 || self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::ValidationFailed(format!(
                "Max retries must be between 1 and {}",
                MAX_RETRIES_LIMIT
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max tokens must be at least 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationFailed(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if parse_level(&self.log_level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Engine settings derived from this configuration
    pub fn workflow_config(&self) -> WorkflowConfig {
        let mut config = WorkflowConfig::new()
            .with_max_retries(self.max_retries)
            .with_output_root(self.output_dir.clone());
        if let Some(secs) = self.generation_timeout_secs {
            config = config.with_generation_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Builds the genai-backed client for the configured provider
    pub async fn create_client(&self) -> Result<Arc<dyn LLMClient>, ConfigError> {
        let timeout = Duration::from_secs(self.request_timeout_secs);
        let client = GenAIClient::new(self.provider, self.model.clone(), timeout).await?;
        Ok(Arc::new(client))
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("provider".to_string(), self.provider.as_lower_str().to_string());
        map.insert("model".to_string(), self.model.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        if let Some(secs) = self.generation_timeout_secs {
            map.insert("generation_timeout_secs".to_string(), secs.to_string());
        }
        map.insert("max_retries".to_string(), self.max_retries.to_string());
        map.insert(
            "output_dir".to_string(),
            self.output_dir.display().to_string(),
        );
        if let Some(ref path) = self.transcript_log {
            map.insert("transcript_log".to_string(), path.display().to_string());
        }
        map.insert("max_tokens".to_string(), self.max_tokens.to_string());
        map.insert("temperature".to_string(), self.temperature.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

fn check_timeout(label: &str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ValidationFailed(format!(
            "{} must be at least 1 second",
            label
        )));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::ValidationFailed(format!(
            "{} cannot exceed 10 minutes",
            label
        )));
    }
    Ok(())
}

impl fmt::Display for DemoforgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Demoforge Configuration:")?;
        writeln!(f, "  Provider: {}", self.provider.as_lower_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        match self.generation_timeout_secs {
            Some(secs) => writeln!(f, "  Generation Timeout: {}s", secs)?,
            None => writeln!(f, "  Generation Timeout: none")?,
        }
        writeln!(f, "  Max Retries: {}", self.max_retries)?;
        writeln!(f, "  Output Dir: {}", self.output_dir.display())?;
        if let Some(ref path) = self.transcript_log {
            writeln!(f, "  Transcript Log: {}", path.display())?;
        }
        writeln!(f, "  Max Tokens: {}", self.max_tokens)?;
        writeln!(f, "  Temperature: {}", self.temperature)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
