use std::time::Duration;

use crate::error::TextGenerationError;

/// Default OpenAI-compatible endpoint base.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the HTTP text generator.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    /// Bearer token; `None` for local servers that need no auth.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var            | Default                      |
    /// |--------------------|------------------------------|
    /// | `LLM_API_URL`      | `https://api.openai.com/v1`  |
    /// | `LLM_API_KEY`      | none                         |
    /// | `LLM_MODEL`        | `gpt-4o-mini`                |
    /// | `LLM_TIMEOUT_SECS` | `60`                         |
    pub fn from_env() -> Result<Self, TextGenerationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary
    /// source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TextGenerationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("LLM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(TextGenerationError::Config(format!(
                "LLM_API_URL must be an http(s) URL, got '{api_url}'"
            )));
        }

        let model = lookup("LLM_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.into());

        let timeout_secs: u64 = match lookup("LLM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                TextGenerationError::Config(format!(
                    "LLM_TIMEOUT_SECS must be a valid u64, got '{raw}'"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut config =
            Self::new(api_url, model).with_timeout(Duration::from_secs(timeout_secs));
        if let Some(key) = lookup("LLM_API_KEY").filter(|k| !k.is_empty()) {
            config = config.with_api_key(key);
        }
        Ok(config)
    }
}
