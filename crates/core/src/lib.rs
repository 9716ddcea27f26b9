//! Pure domain logic for turning a marketing brief into timed, validated
//! scenes: data model, profile tables and every decision/repair pass.
//!
//! Every pass takes values and returns new values; nothing here performs
//! I/O or holds state between calls.

pub mod beat_timing;
pub mod breathing;
pub mod color;
pub mod error;
pub mod hierarchy;
pub mod jitter;
pub mod keywords;
pub mod narrative;
pub mod palette;
pub mod profiles;
pub mod quality;
pub mod request;
pub mod result;
pub mod scene;
pub mod tempo;
pub mod transition;
pub mod types;
pub mod visual_flow;

pub use color::HexColor;
pub use error::CoreError;
pub use profiles::{ProfileTables, StyleProfile, VideoStyle};
pub use request::{GenerationRequest, ProvidedImage};
pub use result::GenerationResult;
pub use scene::{Beat, Scene};
pub use types::{Frame, DEFAULT_FPS, MAX_SCENE_FRAMES};
