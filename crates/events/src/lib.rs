//! Progress reporting for the generation pipeline.
//!
//! - [`progress`] defines the phase state machine and event payload.
//! - [`sink`] is the port the orchestrator reports through.
//! - [`bus`] fans events out to async subscribers.
//! - [`stream`] frames events as NDJSON for the worker's stdout and drains
//!   the bus into it.

pub mod bus;
pub mod progress;
pub mod sink;
pub mod stream;

pub use bus::ProgressBus;
pub use progress::{PipelinePhase, ProgressEvent, ProgressTracker};
pub use sink::{ProgressSink, RecordingSink};
pub use stream::{spawn_progress_writer, NdjsonWriter, StreamEvent};
