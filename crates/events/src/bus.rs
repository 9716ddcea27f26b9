//! In-process progress bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ProgressBus`] fans progress events out to any number of async
//! subscribers. It is a [`ProgressSink`], so the orchestrator can report to
//! it directly; share it via `Arc<ProgressBus>`.

use tokio::sync::broadcast;

use crate::progress::ProgressEvent;
use crate::sink::ProgressSink;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

pub struct ProgressBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped when nobody listens.
    pub fn publish(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ProgressSink for ProgressBus {
    fn emit(&self, event: &ProgressEvent) {
        self.publish(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::PipelinePhase;

    #[tokio::test]
    async fn subscribers_receive_in_emission_order() {
        let bus = ProgressBus::default();
        let mut rx = bus.subscribe();

        bus.emit(&ProgressEvent::new(PipelinePhase::AnalyzingIntent, 0, "start"));
        bus.emit(&ProgressEvent::new(PipelinePhase::DetectingStyle, 50, "style"));

        let first = rx.recv().await.expect("first event");
        let second = rx.recv().await.expect("second event");
        assert_eq!(first.phase, PipelinePhase::AnalyzingIntent);
        assert_eq!(second.phase, PipelinePhase::DetectingStyle);
    }

    #[tokio::test]
    async fn every_subscriber_sees_each_progress_event() {
        let bus = ProgressBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ProgressEvent::new(PipelinePhase::Complete, 100, "done"));

        assert_eq!(rx1.recv().await.expect("rx1").overall_progress, 100);
        assert_eq!(rx2.recv().await.expect("rx2").message, "done");
    }

    #[test]
    fn progress_without_listeners_is_dropped() {
        let bus = ProgressBus::new(4);
        bus.publish(ProgressEvent::new(PipelinePhase::Finalizing, 10, "orphan"));
    }
}
