//! Brief-to-scenes orchestration around one text-generation call.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod raw;
pub mod response;
pub mod structure;
pub mod style;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use orchestrator::Brain;
