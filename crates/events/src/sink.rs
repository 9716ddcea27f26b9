//! Progress delivery port.
//!
//! The orchestrator reports to a [`ProgressSink`] synchronously, in emission
//! order. The worker hands it the broadcast
//! [`ProgressBus`](crate::bus::ProgressBus); tests use [`RecordingSink`].

use std::sync::Mutex;

use crate::progress::ProgressEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: &ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::PipelinePhase;

    #[test]
    fn recording_sink_preserves_order() {
        let sink = RecordingSink::default();
        sink.emit(&ProgressEvent::new(PipelinePhase::AnalyzingIntent, 0, "first"));
        sink.emit(&ProgressEvent::new(PipelinePhase::DetectingStyle, 0, "second"));
        let messages: Vec<String> = sink.events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
