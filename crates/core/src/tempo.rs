//! Tempo adjuster: validates a scene against its (phase, style) tempo
//! profile and applies one corrective pass.

use serde::{Deserialize, Serialize};

use crate::beat_timing::retime_scene;
use crate::narrative::NarrativePhase;
use crate::profiles::{MotionIntensity, StyleProfile, TempoProfile};
use crate::scene::{Beat, BeatAction, EntryAnimation, Scene};
use crate::types::Frame;

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TempoViolation {
    TooFewBeats { actual: usize, min: usize },
    TooManyBeats { actual: usize, max: usize },
    DurationBelow { actual: Frame, min: Frame },
    DurationAbove { actual: Frame, max: Frame },
    MotionTooHigh { actual: MotionIntensity, allowed: MotionIntensity },
}

/// Check content-beat count, duration and background motion against `profile`.
pub fn validate_tempo(scene: &Scene, profile: &TempoProfile) -> Vec<TempoViolation> {
    let mut violations = Vec::new();

    let beats = scene.content_beat_count();
    if beats < profile.beats.min {
        violations.push(TempoViolation::TooFewBeats {
            actual: beats,
            min: profile.beats.min,
        });
    } else if beats > profile.beats.max {
        violations.push(TempoViolation::TooManyBeats {
            actual: beats,
            max: profile.beats.max,
        });
    }

    let duration = scene.duration_frames;
    if duration < profile.duration.min {
        violations.push(TempoViolation::DurationBelow {
            actual: duration,
            min: profile.duration.min,
        });
    } else if duration > profile.duration.max {
        violations.push(TempoViolation::DurationAbove {
            actual: duration,
            max: profile.duration.max,
        });
    }

    let motion = scene.background.animation.intensity();
    if motion > profile.motion {
        violations.push(TempoViolation::MotionTooHigh {
            actual: motion,
            allowed: profile.motion,
        });
    }

    violations
}

// ---------------------------------------------------------------------------
// Adjustment
// ---------------------------------------------------------------------------

/// Per-scene tempo outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoSceneReport {
    pub scene_id: String,
    pub phase: NarrativePhase,
    pub profile: TempoProfileSummary,
    /// Violations found before adjusting.
    pub corrected: Vec<TempoViolation>,
    /// Violations still present afterwards.
    pub remaining: Vec<TempoViolation>,
    pub beats_added: usize,
    pub beats_removed: usize,
}

/// Integer view of a tempo profile for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoProfileSummary {
    pub min_beats: usize,
    pub max_beats: usize,
    pub min_frames: Frame,
    pub max_frames: Frame,
    pub motion: MotionIntensity,
    pub idle_allowed: bool,
}

impl From<&TempoProfile> for TempoProfileSummary {
    fn from(p: &TempoProfile) -> Self {
        Self {
            min_beats: p.beats.min,
            max_beats: p.beats.max,
            min_frames: p.duration.min,
            max_frames: p.duration.max,
            motion: p.motion,
            idle_allowed: p.idle_allowed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoReport {
    pub scenes: Vec<TempoSceneReport>,
    pub all_within_tempo: bool,
}

impl TempoReport {
    pub fn from_scenes(scenes: Vec<TempoSceneReport>) -> Self {
        let all_within_tempo = scenes.iter().all(|s| s.remaining.is_empty());
        Self {
            scenes,
            all_within_tempo,
        }
    }
}

/// Index of the last CTA beat; trimming never removes it.
fn protected_cta(beats: &[Beat]) -> Option<usize> {
    beats.iter().rposition(|b| b.action == BeatAction::ShowCta)
}

/// Drop trailing content beats until at most `max` remain.
fn trim_content_beats(beats: &mut Vec<Beat>, max: usize) -> usize {
    let mut removed = 0;
    let mut content = beats.iter().filter(|b| !b.is_breathing()).count();
    let mut i = beats.len();
    while content > max && i > 0 {
        i -= 1;
        if beats[i].is_breathing() || Some(i) == protected_cta(beats) {
            continue;
        }
        beats.remove(i);
        content -= 1;
        removed += 1;
    }
    removed
}

/// One corrective pass over `scene`.
///
/// Trims or pads content beats into the beat range, clamps the duration into
/// the duration range (never below the end of the last beat), re-times when
/// the beat list changed or would overflow, and caps background motion.
pub fn adjust_scene_tempo(
    scene: &Scene,
    profile: &TempoProfile,
    style: &StyleProfile,
) -> (Scene, TempoSceneReport) {
    let before = validate_tempo(scene, profile);
    let mut beats = scene.beats.clone();

    let beats_removed = trim_content_beats(&mut beats, profile.beats.max);

    let mut beats_added = 0;
    let content = beats.iter().filter(|b| !b.is_breathing()).count();
    for k in content..profile.beats.min {
        let accent = Beat::new(format!("{}-accent-{}", scene.id, k + 1), BeatAction::Accent, 0, 1)
            .with_entry(EntryAnimation::FadeIn, style.entry_fade_frames);
        let insert_at = beats.iter().position(Beat::is_breathing).unwrap_or(beats.len());
        beats.insert(insert_at, accent);
        beats_added += 1;
    }

    let duration = profile.duration.clamp(scene.duration_frames);
    let mut adjusted = scene.with_beats(beats).with_duration(duration);

    let overflows = adjusted.content_end() > duration;
    if beats_added > 0 || beats_removed > 0 || overflows {
        adjusted = retime_scene(&adjusted);
    }
    let beats_end = adjusted.beats_end();
    if beats_end > adjusted.duration_frames {
        adjusted.duration_frames = beats_end;
    }

    let capped = adjusted.background.animation.capped_at(profile.motion);
    if capped != adjusted.background.animation {
        adjusted.background.animation = capped;
    }

    let remaining = validate_tempo(&adjusted, profile);
    if !remaining.is_empty() {
        tracing::warn!(
            scene_id = %scene.id,
            remaining = remaining.len(),
            "Tempo violations remain after adjustment"
        );
    }

    let report = TempoSceneReport {
        scene_id: scene.id.clone(),
        phase: profile.phase,
        profile: profile.into(),
        corrected: before
            .iter()
            .filter(|v| !remaining.contains(v))
            .copied()
            .collect(),
        remaining,
        beats_added,
        beats_removed,
    };
    (adjusted, report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
