//! Server configuration from the process environment.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub upload_dir: PathBuf,
    pub analysis_timeout: Duration,
    pub max_upload_bytes: usize,
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    /// Upper bound on completion length; provider default when unset.
    pub llm_max_tokens: Option<u32>,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_UPLOAD_DIR: &'static str = "uploads";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

    /// Read from the process environment (call `dotenv` first to pick up `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(get("PORT"), "PORT", Self::DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            get("ANALYSIS_TIMEOUT_SECS"),
            "ANALYSIS_TIMEOUT_SECS",
            Self::DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "ANALYSIS_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        let max_upload_bytes = parse_or(
            get("MAX_UPLOAD_BYTES"),
            "MAX_UPLOAD_BYTES",
            Self::DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        let llm_max_tokens = get("LLM_MAX_TOKENS")
            .map(|v| parse(v, "LLM_MAX_TOKENS"))
            .transpose()?;
        let llm_api_key = get("LLM_API_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .ok_or(ConfigError::Missing("LLM_API_KEY"))?;

        Ok(Self {
            port,
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_UPLOAD_DIR)),
            analysis_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
            llm_api_url: get("LLM_API_URL")
                .unwrap_or_else(|| scan_llm::OpenAiCompletionClient::DEFAULT_API_URL.to_string()),
            llm_api_key,
            llm_model: get("LLM_MODEL")
                .unwrap_or_else(|| scan_llm::OpenAiCompletionClient::DEFAULT_MODEL.to_string()),
            llm_max_tokens,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => parse(value, var),
    }
}

fn parse<T: std::str::FromStr>(value: String, var: &'static str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}
