//! Pipeline phases, their progress weights and the progress event payload.

use serde::{Deserialize, Serialize};

use crate::sink::ProgressSink;

// ---------------------------------------------------------------------------
// PipelinePhase
// ---------------------------------------------------------------------------

/// Orchestrator states, in the only order they may be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    AnalyzingIntent,
    DetectingStyle,
    PlanningNarrative,
    StructuringScenes,
    CreatingBeats,
    ValidatingQuality,
    Finalizing,
    Complete,
}

impl PipelinePhase {
    pub const ALL: &'static [PipelinePhase] = &[
        PipelinePhase::AnalyzingIntent,
        PipelinePhase::DetectingStyle,
        PipelinePhase::PlanningNarrative,
        PipelinePhase::StructuringScenes,
        PipelinePhase::CreatingBeats,
        PipelinePhase::ValidatingQuality,
        PipelinePhase::Finalizing,
        PipelinePhase::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalyzingIntent => "analyzing_intent",
            Self::DetectingStyle => "detecting_style",
            Self::PlanningNarrative => "planning_narrative",
            Self::StructuringScenes => "structuring_scenes",
            Self::CreatingBeats => "creating_beats",
            Self::ValidatingQuality => "validating_quality",
            Self::Finalizing => "finalizing",
            Self::Complete => "complete",
        }
    }

    /// Share of overall progress owned by this phase. Weights sum to 100.
    pub fn weight(&self) -> u32 {
        match self {
            Self::AnalyzingIntent => 5,
            Self::DetectingStyle => 5,
            Self::PlanningNarrative => 10,
            Self::StructuringScenes => 35,
            Self::CreatingBeats => 20,
            Self::ValidatingQuality => 15,
            Self::Finalizing => 10,
            Self::Complete => 0,
        }
    }

    /// Overall progress at `phase_progress` percent through this phase.
    pub fn overall_progress(&self, phase_progress: u8) -> u8 {
        if *self == Self::Complete {
            return 100;
        }
        let before: u32 = Self::ALL
            .iter()
            .take_while(|p| *p != self)
            .map(PipelinePhase::weight)
            .sum();
        let within = self.weight() * u32::from(phase_progress.min(100)) / 100;
        (before + within).min(100) as u8
    }
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProgressEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub phase: PipelinePhase,
    pub phase_progress: u8,
    pub overall_progress: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_scene: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_scenes: Option<usize>,
}

impl ProgressEvent {
    pub fn new(phase: PipelinePhase, phase_progress: u8, message: impl Into<String>) -> Self {
        let phase_progress = if phase == PipelinePhase::Complete {
            100
        } else {
            phase_progress.min(100)
        };
        Self {
            phase,
            phase_progress,
            overall_progress: phase.overall_progress(phase_progress),
            message: message.into(),
            current_scene: None,
            total_scenes: None,
        }
    }

    pub fn with_scene(mut self, current: usize, total: usize) -> Self {
        self.current_scene = Some(current);
        self.total_scenes = Some(total);
        self
    }
}

// ---------------------------------------------------------------------------
// ProgressTracker
// ---------------------------------------------------------------------------

/// Emits progress events in strict phase order to a sink.
///
/// A report for an earlier phase than the current one is folded into the
/// current phase, and overall progress never decreases.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    phase: PipelinePhase,
    overall: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            phase: PipelinePhase::AnalyzingIntent,
            overall: 0,
        }
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn report(&mut self, phase: PipelinePhase, phase_progress: u8, message: impl Into<String>) {
        self.send(ProgressEvent::new(self.clamp(phase), phase_progress, message));
    }

    pub fn report_scene(
        &mut self,
        phase: PipelinePhase,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) {
        let progress = if total == 0 {
            100
        } else {
            (current * 100 / total).min(100) as u8
        };
        self.send(ProgressEvent::new(self.clamp(phase), progress, message).with_scene(current, total));
    }

    /// Terminal event: `complete` at 100/100.
    pub fn complete(&mut self, message: impl Into<String>) {
        self.send(ProgressEvent::new(PipelinePhase::Complete, 100, message));
    }

    fn clamp(&self, phase: PipelinePhase) -> PipelinePhase {
        if phase < self.phase {
            tracing::warn!(
                requested = %phase,
                current = %self.phase,
                "Out-of-order progress phase folded into current phase"
            );
            self.phase
        } else {
            phase
        }
    }

    fn send(&mut self, mut event: ProgressEvent) {
        self.phase = event.phase;
        event.overall_progress = event.overall_progress.max(self.overall);
        self.overall = event.overall_progress;
        tracing::debug!(
            phase = %event.phase,
            overall = event.overall_progress,
            "{}",
            event.message
        );
        self.sink.emit(&event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    // -- weights ---------------------------------------------------------------

    #[test]
    fn weights_sum_to_one_hundred() {
        let total: u32 = PipelinePhase::ALL.iter().map(PipelinePhase::weight).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn overall_progress_accumulates_prior_phases() {
        assert_eq!(PipelinePhase::AnalyzingIntent.overall_progress(0), 0);
        assert_eq!(PipelinePhase::PlanningNarrative.overall_progress(0), 10);
        assert_eq!(PipelinePhase::StructuringScenes.overall_progress(50), 37);
        assert_eq!(PipelinePhase::Finalizing.overall_progress(100), 100);
        assert_eq!(PipelinePhase::Complete.overall_progress(0), 100);
    }

    #[test]
    fn complete_event_is_always_full() {
        let e = ProgressEvent::new(PipelinePhase::Complete, 3, "done");
        assert_eq!((e.phase_progress, e.overall_progress), (100, 100));
    }

    #[test]
    fn event_serializes_camel_case() {
        let e = ProgressEvent::new(PipelinePhase::CreatingBeats, 50, "beats").with_scene(2, 4);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["phase"], "creating_beats");
        assert_eq!(json["phaseProgress"], 50);
        assert_eq!(json["overallProgress"], 65);
        assert_eq!(json["currentScene"], 2);
        assert_eq!(json["totalScenes"], 4);
    }

    // -- ProgressTracker -------------------------------------------------------

    #[test]
    fn tracker_keeps_order_and_monotonic_progress() {
        let sink = RecordingSink::default();
        let mut tracker = ProgressTracker::new(&sink);
        tracker.report(PipelinePhase::DetectingStyle, 100, "style");
        tracker.report(PipelinePhase::AnalyzingIntent, 0, "late");
        tracker.report_scene(PipelinePhase::StructuringScenes, 1, 2, "scene 1");
        tracker.complete("done");

        let events = sink.events();
        let phases: Vec<PipelinePhase> = events.iter().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            vec![
                PipelinePhase::DetectingStyle,
                PipelinePhase::DetectingStyle,
                PipelinePhase::StructuringScenes,
                PipelinePhase::Complete
            ]
        );
        for w in events.windows(2) {
            assert!(w[0].overall_progress <= w[1].overall_progress);
        }
        assert_eq!(events.last().unwrap().overall_progress, 100);
    }
}
