//! OpenAI-compatible chat-completions client.
//!
//! Sends the system instruction and user message to
//! `POST {api_url}/chat/completions` using [`reqwest`] and returns the
//! first choice's message content.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::TextGenerationError;
use crate::port::{TextGenerator, TextRequest};

/// HTTP text generator for a single OpenAI-compatible endpoint.
pub struct HttpTextGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpTextGenerator {
    /// Build a client whose every request is bounded by `config.timeout`.
    pub fn new(config: LlmConfig) -> Result<Self, TextGenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TextGenerationError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a generator reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, or turn it into a
    /// [`TextGenerationError::Status`] carrying the body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TextGenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TextGenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, request: &TextRequest) -> Result<String, TextGenerationError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!(
            model = %self.config.model,
            user_chars = request.user.len(),
            "Sending text generation request"
        );
        let response = Self::ensure_success(builder.send().await?).await?;
        let parsed: ChatCompletionResponse = response.json().await?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(TextGenerationError::EmptyResponse)?;

        tracing::debug!(chars = text.len(), "Text generation response received");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });
        (url, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|l| {
                let (name, value) = l.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    fn generator(url: String) -> HttpTextGenerator {
        let config = LlmConfig::new(url, "test-model")
            .with_api_key("sk-test")
            .with_timeout(Duration::from_secs(5));
        HttpTextGenerator::new(config).unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"concept\":\"x\"}"}}]}"#;
        let (url, server) = serve_once("HTTP/1.1 200 OK", body.to_string()).await;

        let text = generator(url)
            .generate(&TextRequest::new("system prompt", "user prompt"))
            .await
            .unwrap();
        assert_eq!(text, r#"{"concept":"x"}"#);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /chat/completions"));
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer sk-test"));
        assert!(raw.contains("\"model\":\"test-model\""));
        assert!(raw.contains("\"role\":\"system\""));
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        let (url, server) =
            serve_once("HTTP/1.1 429 Too Many Requests", r#"{"error":"slow down"}"#.to_string()).await;

        let result = generator(url).generate(&TextRequest::new("s", "u")).await;
        assert_matches!(
            result,
            Err(TextGenerationError::Status { status: 429, body }) if body.contains("slow down")
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn empty_choices_is_empty_response() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"{"choices":[]}"#.to_string()).await;

        let result = generator(url).generate(&TextRequest::new("s", "u")).await;
        assert_matches!(result, Err(TextGenerationError::EmptyResponse));
        server.await.unwrap();
    }
}
