use beatforge_core::CoreError;
use beatforge_llm::TextGenerationError;

/// Fatal pipeline failures. Anything non-fatal travels in the result's
/// reports instead.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Generation(#[from] TextGenerationError),

    /// The response is not JSON even after fence stripping and brace
    /// extraction.
    #[error("Could not parse generation response: {0}")]
    Parse(String),

    /// The response parsed but lacks required top-level fields.
    #[error("Generation response is missing required structure: {0}")]
    Structural(String),
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use beatforge_core::HexColor;

    #[test]
    fn core_validation_becomes_invalid_request() {
        let err: PipelineError = HexColor::parse("teal").unwrap_err().into();
        assert_matches!(err, PipelineError::InvalidRequest(ref msg) if msg.starts_with("Validation failed"));
    }
}
