//! Generation result: the finalized scene graph plus every report that
//! travels alongside it.

use serde::{Deserialize, Serialize};

use crate::breathing::BreathingBalance;
use crate::hierarchy::HierarchySpec;
use crate::narrative::NarrativeArc;
use crate::palette::{Palette, PaletteReport};
use crate::profiles::{StyleProfile, VideoStyle};
use crate::quality::{QualityAssessment, QualityReport, VideoIssue};
use crate::scene::Scene;
use crate::tempo::TempoReport;
use crate::transition::PlannedTransition;
use crate::types::Frame;
use crate::visual_flow::VisualFlowReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub style: VideoStyle,
    pub style_profile: StyleProfile,
    pub language: String,
    /// One-line creative concept.
    pub concept: String,
    pub emotional_arc: Vec<String>,
    pub fps: u32,
    pub scenes: Vec<Scene>,
    /// Always the sum of the scene durations.
    pub total_duration_frames: Frame,
    pub quality_report: QualityReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_flow: Option<VisualFlowReport>,
    pub narrative_arc: NarrativeArc,
    pub tempo_report: TempoReport,
    pub hierarchy: Vec<HierarchySpec>,
    pub palette: Palette,
    pub palette_report: PaletteReport,
    pub breathing_balance: BreathingBalance,
    pub transitions: Vec<PlannedTransition>,
    pub scene_assessments: Vec<QualityAssessment>,
    pub video_issues: Vec<VideoIssue>,
}

/// Sum of scene durations, saturating at `Frame::MAX`.
pub fn total_duration(scenes: &[Scene]) -> Frame {
    scenes
        .iter()
        .fold(0, |total: Frame, s| total.saturating_add(s.duration_frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::test_support::scene;
    use crate::scene::SceneType;

    #[test]
    fn total_is_sum_of_durations() {
        let scenes = vec![
            scene("a", SceneType::Hook, Vec::new(), 90),
            scene("b", SceneType::Cta, Vec::new(), 75),
        ];
        assert_eq!(total_duration(&scenes), 165);
        assert_eq!(total_duration(&[]), 0);
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let scenes = vec![
            scene("a", SceneType::Hook, Vec::new(), Frame::MAX - 10),
            scene("b", SceneType::Cta, Vec::new(), 75),
        ];
        assert_eq!(total_duration(&scenes), Frame::MAX);
    }
}
