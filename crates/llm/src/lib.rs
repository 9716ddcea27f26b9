//! Text-generation port and its adapters.
//!
//! The pipeline depends only on [`TextGenerator`]. [`HttpTextGenerator`]
//! talks to an OpenAI-compatible endpoint; [`ScriptedTextGenerator`] replays
//! canned responses for tests and offline runs.

pub mod config;
pub mod error;
pub mod http;
pub mod port;
pub mod scripted;

pub use config::LlmConfig;
pub use error::TextGenerationError;
pub use http::HttpTextGenerator;
pub use port::{TextGenerator, TextRequest};
pub use scripted::ScriptedTextGenerator;
