/// Errors from the text-generation port.
#[derive(Debug, thiserror::Error)]
pub enum TextGenerationError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("Text generation request failed: {0}")]
    Transport(String),

    /// The service returned a non-2xx status code.
    #[error("Text generation API error ({status}): {body}")]
    Status {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered but produced no text.
    #[error("Text generation returned an empty response")]
    EmptyResponse,

    #[error("Text generation timed out")]
    Timeout,

    #[error("Text generation is misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TextGenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}
