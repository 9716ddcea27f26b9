//! The narrow port the pipeline talks to: one system instruction and one
//! user message in, raw text out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TextGenerationError;

/// Sampling temperature used when the caller does not pick one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Completion budget used when the caller does not pick one.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl TextRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// Remote text generation. Implementations own their transport, including
/// timeouts; callers never retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &TextRequest) -> Result<String, TextGenerationError>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(&self, request: &TextRequest) -> Result<String, TextGenerationError> {
        (**self).generate(request).await
    }
}
