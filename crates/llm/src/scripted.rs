//! Deterministic [`TextGenerator`] that replays queued responses.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::TextGenerationError;
use crate::port::{TextGenerator, TextRequest};

/// Replays queued responses in order and records every request it sees.
/// Once the queue is drained every call yields
/// [`TextGenerationError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedTextGenerator {
    responses: Mutex<VecDeque<Result<String, TextGenerationError>>>,
    requests: Mutex<Vec<TextRequest>>,
}

impl ScriptedTextGenerator {
    pub fn new(responses: impl IntoIterator<Item = Result<String, TextGenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A generator that answers once with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new([Ok(text.into())])
    }

    /// A generator that fails once with `error`.
    pub fn failing(error: TextGenerationError) -> Self {
        Self::new([Err(error)])
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<TextRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    async fn generate(&self, request: &TextRequest) -> Result<String, TextGenerationError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(Err(TextGenerationError::EmptyResponse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn replays_in_order_then_runs_dry() {
        let generator = ScriptedTextGenerator::new([
            Ok("first".to_string()),
            Err(TextGenerationError::Timeout),
        ]);
        let request = TextRequest::new("s", "u");

        assert_eq!(generator.generate(&request).await.unwrap(), "first");
        assert_matches!(generator.generate(&request).await, Err(TextGenerationError::Timeout));
        assert_matches!(
            generator.generate(&request).await,
            Err(TextGenerationError::EmptyResponse)
        );
        assert_eq!(generator.call_count(), 3);
        assert_eq!(generator.requests()[0].user, "u");
    }
}
