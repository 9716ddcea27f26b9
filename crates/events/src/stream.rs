//! Newline-delimited JSON framing for the worker's stdout stream.
//!
//! Each line is one [`StreamEvent`]: any number of `progress` lines followed
//! by exactly one terminal `result` or `error` line.

use std::io::Write;
use std::sync::{Arc, Mutex};

use beatforge_core::GenerationResult;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::bus::ProgressBus;
use crate::progress::ProgressEvent;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Progress(ProgressEvent),
    Result { result: Box<GenerationResult> },
    Error { message: String },
}

impl StreamEvent {
    pub fn result(result: GenerationResult) -> Self {
        Self::Result {
            result: Box::new(result),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }

    /// Serialize as a single JSON line, without the trailing newline.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Writes stream events as NDJSON, flushing after every line.
pub struct NdjsonWriter<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> NdjsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn write_event(&self, event: &StreamEvent) -> std::io::Result<()> {
        let line = event.to_line().map_err(std::io::Error::other)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| std::io::Error::other("ndjson writer lock poisoned"))?;
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Write every event published on `bus` to `out` as a `progress` line.
///
/// The subscription is taken before returning, so nothing published after
/// this call is missed. The task ends once the bus is dropped and every
/// buffered event has been written; await it before the terminal line.
pub fn spawn_progress_writer<W>(bus: &ProgressBus, out: Arc<NdjsonWriter<W>>) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = out.write_event(&StreamEvent::Progress(event)) {
                        tracing::error!(error = %e, "Failed to write progress line");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Progress writer lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::PipelinePhase;

    #[test]
    fn progress_line_is_flat_and_tagged() {
        let event = StreamEvent::Progress(ProgressEvent::new(
            PipelinePhase::DetectingStyle,
            100,
            "Style detected",
        ));
        let value: serde_json::Value = serde_json::from_str(&event.to_line().unwrap()).unwrap();
        assert_eq!(value["type"], "progress");
        assert_eq!(value["phase"], "detecting_style");
        assert_eq!(value["overallProgress"], 10);
        assert!(!event.is_terminal());
    }

    #[test]
    fn error_line_carries_message() {
        let event = StreamEvent::error("boom");
        let value: serde_json::Value = serde_json::from_str(&event.to_line().unwrap()).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "boom");
        assert!(event.is_terminal());
    }

    #[test]
    fn writer_emits_one_line_per_event() {
        let writer = NdjsonWriter::new(Vec::new());
        writer
            .write_event(&StreamEvent::Progress(ProgressEvent::new(
                PipelinePhase::AnalyzingIntent,
                0,
                "a",
            )))
            .unwrap();
        writer.write_event(&StreamEvent::error("b")).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        assert!(lines[0].contains("\"type\":\"progress\""));
        assert!(lines[1].contains("\"type\":\"error\""));
    }

    // -- spawn_progress_writer ---------------------------------------------------

    #[tokio::test]
    async fn bus_events_drain_to_lines_before_close() {
        let bus = ProgressBus::default();
        let out = Arc::new(NdjsonWriter::new(Vec::new()));
        let task = spawn_progress_writer(&bus, Arc::clone(&out));

        bus.publish(ProgressEvent::new(PipelinePhase::AnalyzingIntent, 0, "start"));
        bus.publish(ProgressEvent::new(PipelinePhase::DetectingStyle, 100, "style"));
        drop(bus);
        task.await.unwrap();

        let writer = Arc::try_unwrap(out).ok().expect("task released the writer");
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"message\":\"start\""));
        assert!(lines[1].contains("\"phase\":\"detecting_style\""));
    }
}
