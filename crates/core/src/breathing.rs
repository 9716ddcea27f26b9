//! Breathing injector: idle beats that give the viewer a rest, and the
//! video-wide balance of idle time against total time.

use serde::{Deserialize, Serialize};

use crate::profiles::{ProfileTables, VideoStyle};
use crate::scene::{Beat, BeatAction, EntryAnimation, HoldAnimation, MarketingIntention, Scene, SceneType};
use crate::types::{frames_to_seconds, Frame};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Content beats per second above which a scene needs a rest.
pub const DENSITY_THRESHOLD: f64 = 1.5;

/// Beat text longer than this many characters needs a rest after it.
pub const LONG_TEXT_CHARS: usize = 60;

/// Frames kept free before the scene end for `BeforeTransition` placement.
pub const TRANSITION_PAD_FRAMES: Frame = 10;

/// Video-wide breathing ratio bounds.
pub const MIN_BREATHING_RATIO: f64 = 0.05;
pub const MAX_BREATHING_RATIO: f64 = 0.15;

/// Minimum share of scenes that carry a breathing beat.
pub const MIN_BREATHING_COVERAGE: f64 = 0.30;

/// Ratio aimed for when existing pauses have to be lengthened.
pub const TARGET_BREATHING_RATIO: f64 = 0.10;

/// Fade length of an injected breathing beat.
pub const BREATHING_FADE_FRAMES: Frame = 6;

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingPlacement {
    /// Right after the last content beat.
    AfterContent,
    /// Ending just before the scene end minus the transition pad.
    BeforeTransition,
    /// Flush with the scene end.
    SceneEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingPreset {
    pub name: String,
    pub duration_frames: Frame,
    pub placement: BreathingPlacement,
    pub hold: HoldAnimation,
}

impl BreathingPreset {
    fn new(name: &str, duration_frames: Frame, placement: BreathingPlacement, hold: HoldAnimation) -> Self {
        Self {
            name: name.to_string(),
            duration_frames,
            placement,
            hold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingPresetTable {
    pub quick_beat: BreathingPreset,
    pub cinematic_hold: BreathingPreset,
    pub still_pause: BreathingPreset,
    pub soft_pause: BreathingPreset,
    pub proof_settle: BreathingPreset,
}

impl Default for BreathingPresetTable {
    fn default() -> Self {
        use BreathingPlacement::*;
        Self {
            quick_beat: BreathingPreset::new("quick_beat", 12, AfterContent, HoldAnimation::Pulse),
            cinematic_hold: BreathingPreset::new("cinematic_hold", 30, BeforeTransition, HoldAnimation::SlowZoom),
            still_pause: BreathingPreset::new("still_pause", 24, SceneEnd, HoldAnimation::Still),
            soft_pause: BreathingPreset::new("soft_pause", 18, AfterContent, HoldAnimation::GentleFloat),
            proof_settle: BreathingPreset::new("proof_settle", 24, AfterContent, HoldAnimation::Still),
        }
    }
}

impl BreathingPresetTable {
    /// Preset for a scene: PROOF scenes settle, everything else follows the style.
    pub fn recommended(&self, style: VideoStyle, scene_type: SceneType) -> &BreathingPreset {
        if scene_type == SceneType::Proof {
            return &self.proof_settle;
        }
        match style {
            VideoStyle::Dynamic => &self.quick_beat,
            VideoStyle::Cinematic => &self.cinematic_hold,
            VideoStyle::Minimal => &self.still_pause,
            VideoStyle::Corporate => &self.soft_pause,
        }
    }
}

// ---------------------------------------------------------------------------
// Need assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingReason {
    /// The intention must keep momentum; never rest.
    ExcludedIntention,
    /// The intention always earns a rest after its content.
    Intention,
    HighDensity,
    LongText,
    NotNeeded,
}

impl BreathingReason {
    pub fn needs_breathing(&self) -> bool {
        matches!(self, Self::Intention | Self::HighDensity | Self::LongText)
    }
}

/// Content beats per second of nominal scene time.
pub fn beat_density(scene: &Scene, fps: u32) -> f64 {
    let seconds = frames_to_seconds(scene.duration_frames, fps);
    if seconds <= 0.0 {
        return 0.0;
    }
    scene.content_beat_count() as f64 / seconds
}

/// Decide whether `scene` should carry a breathing beat.
pub fn assess_breathing_need(scene: &Scene, fps: u32) -> BreathingReason {
    use MarketingIntention::*;
    match scene.intention {
        CaptureAttention | DriveAction => return BreathingReason::ExcludedIntention,
        CreateEmpathy | BuildTrust | DemonstrateValue | EvokeEmotion => return BreathingReason::Intention,
        Inform => {}
    }
    if beat_density(scene, fps) > DENSITY_THRESHOLD {
        return BreathingReason::HighDensity;
    }
    let long_text = scene
        .content_beats()
        .filter_map(|b| b.text.as_deref())
        .any(|t| t.chars().count() > LONG_TEXT_CHARS);
    if long_text {
        BreathingReason::LongText
    } else {
        BreathingReason::NotNeeded
    }
}

// ---------------------------------------------------------------------------
// Injection
// ---------------------------------------------------------------------------

/// Add a breathing beat per `preset`. Scenes that already breathe are
/// returned unchanged. The scene grows when the beat does not fit.
pub fn inject_breathing(scene: &Scene, preset: &BreathingPreset) -> Scene {
    if scene.has_breathing() {
        return scene.clone();
    }

    let content_end = scene.content_end();
    let length = preset.duration_frames;
    let (start, tail) = match preset.placement {
        BreathingPlacement::AfterContent => (content_end, 0),
        BreathingPlacement::BeforeTransition => (
            scene
                .duration_frames
                .saturating_sub(TRANSITION_PAD_FRAMES + length)
                .max(content_end),
            TRANSITION_PAD_FRAMES,
        ),
        BreathingPlacement::SceneEnd => (scene.duration_frames.saturating_sub(length).max(content_end), 0),
    };

    let beat = Beat::new(format!("{}-breathe", scene.id), BeatAction::Breathe, start, length)
        .with_entry(EntryAnimation::FadeIn, BREATHING_FADE_FRAMES.min(length))
        .with_hold(preset.hold);

    let mut beats = scene.beats.clone();
    beats.push(beat);
    let duration = scene
        .duration_frames
        .max(start.saturating_add(length).saturating_add(tail));
    tracing::debug!(
        scene_id = %scene.id,
        preset = %preset.name,
        start,
        duration,
        "Injected breathing beat"
    );
    scene.with_beats(beats).with_duration(duration)
}

/// Remove every breathing beat. Duration is kept.
pub fn strip_breathing(scene: &Scene) -> Scene {
    scene.with_beats(scene.content_beats().cloned().collect())
}

/// Per-scene breathing pass: strip where the phase forbids idle time,
/// inject where the scene needs it.
pub fn apply_breathing(scene: &Scene, tables: &ProfileTables, style: VideoStyle, fps: u32) -> Scene {
    let tempo = tables.tempo_for(scene.phase, style);
    if !tempo.idle_allowed {
        return if scene.has_breathing() {
            strip_breathing(scene)
        } else {
            scene.clone()
        };
    }
    if assess_breathing_need(scene, fps).needs_breathing() {
        inject_breathing(scene, tables.breathing.recommended(style, scene.scene_type))
    } else {
        scene.clone()
    }
}

/// Breathing pass over the whole video. Interior scenes go through
/// [`apply_breathing`]; the first and last scene never breathe, so any
/// breathing they arrive with is stripped.
pub fn apply_video_breathing(
    scenes: &[Scene],
    tables: &ProfileTables,
    style: VideoStyle,
    fps: u32,
) -> Vec<Scene> {
    let last = scenes.len().saturating_sub(1);
    scenes
        .iter()
        .enumerate()
        .map(|(i, scene)| {
            if i != 0 && i != last {
                apply_breathing(scene, tables, style, fps)
            } else if scene.has_breathing() {
                tracing::debug!(scene_id = %scene.id, "Stripping breathing from edge scene");
                strip_breathing(scene)
            } else {
                scene.clone()
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Video balance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingBalance {
    /// Breathing frames over total frames.
    pub ratio: f64,
    /// Share of scenes with a breathing beat.
    pub coverage: f64,
    pub balanced: bool,
    pub injected: Vec<String>,
    /// Scenes whose existing pause was lengthened.
    #[serde(default)]
    pub extended: Vec<String>,
    pub removed: Vec<String>,
}

fn measure(scenes: &[Scene]) -> (f64, f64) {
    if scenes.is_empty() {
        return (0.0, 0.0);
    }
    let total: u64 = scenes.iter().map(|s| u64::from(s.duration_frames)).sum();
    let breathing: u64 = scenes.iter().map(|s| u64::from(s.breathing_frames())).sum();
    let with_breathing = scenes.iter().filter(|s| s.has_breathing()).count();
    let ratio = if total == 0 {
        0.0
    } else {
        breathing as f64 / total as f64
    };
    (ratio, with_breathing as f64 / scenes.len() as f64)
}

fn is_balanced(ratio: f64, coverage: f64) -> bool {
    (MIN_BREATHING_RATIO..=MAX_BREATHING_RATIO).contains(&ratio) && coverage >= MIN_BREATHING_COVERAGE
}

/// Current breathing balance of `scenes` without changing anything.
pub fn measure_breathing(scenes: &[Scene]) -> BreathingBalance {
    let (ratio, coverage) = measure(scenes);
    BreathingBalance {
        ratio,
        coverage,
        balanced: is_balanced(ratio, coverage),
        injected: Vec::new(),
        extended: Vec::new(),
        removed: Vec::new(),
    }
}

/// Lengthen the last breathing beat of a scene by `extra` frames. The scene
/// grows by the same amount so nothing after the pause is cut.
fn extend_pause(scene: &Scene, extra: Frame) -> Scene {
    let mut beats = scene.beats.clone();
    if let Some(beat) = beats.iter_mut().rev().find(|b| b.is_breathing()) {
        beat.duration_frames = beat.duration_frames.saturating_add(extra);
    }
    scene
        .with_beats(beats)
        .with_duration(scene.duration_frames.saturating_add(extra))
}

/// Spread the frames missing to [`TARGET_BREATHING_RATIO`] over the interior
/// scenes that already breathe and whose phase allows idle time.
fn lengthen_pauses(scenes: &mut [Scene], tables: &ProfileTables, style: VideoStyle) -> Vec<String> {
    let last = scenes.len().saturating_sub(1);
    let eligible: Vec<usize> = (1..last)
        .filter(|&i| scenes[i].has_breathing() && tables.tempo_for(scenes[i].phase, style).idle_allowed)
        .collect();
    if eligible.is_empty() {
        return Vec::new();
    }

    let total: u64 = scenes.iter().map(|s| u64::from(s.duration_frames)).sum();
    let breathing: u64 = scenes.iter().map(|s| u64::from(s.breathing_frames())).sum();
    // (breathing + x) / (total + x) >= target
    let missing = (TARGET_BREATHING_RATIO * total as f64 - breathing as f64) / (1.0 - TARGET_BREATHING_RATIO);
    if missing <= 0.0 {
        return Vec::new();
    }
    let missing = Frame::try_from(missing.ceil() as u64).unwrap_or(Frame::MAX);

    let count = eligible.len() as Frame;
    let (share, remainder) = (missing / count, missing % count);
    let mut extended = Vec::new();
    for (k, &i) in eligible.iter().enumerate() {
        let extra = share + Frame::from((k as Frame) < remainder);
        if extra == 0 {
            continue;
        }
        tracing::debug!(scene_id = %scenes[i].id, extra, "Lengthening breathing beat");
        scenes[i] = extend_pause(&scenes[i], extra);
        extended.push(scenes[i].id.clone());
    }
    extended
}

/// Keep the video-wide breathing ratio within bounds.
///
/// Already balanced videos are returned unchanged. Otherwise breathing is
/// injected into (or stripped from) interior scenes whose phase allows idle
/// time. When that still leaves the ratio short, existing interior pauses
/// are lengthened. The first and last scene are never touched.
pub fn balance_breathing(
    scenes: &[Scene],
    tables: &ProfileTables,
    style: VideoStyle,
) -> (Vec<Scene>, BreathingBalance) {
    let mut current = scenes.to_vec();
    let (mut ratio, mut coverage) = measure(&current);
    let mut injected = Vec::new();
    let mut extended = Vec::new();
    let mut removed = Vec::new();

    if is_balanced(ratio, coverage) || current.len() < 3 {
        return (
            current,
            BreathingBalance {
                ratio,
                coverage,
                balanced: is_balanced(ratio, coverage),
                injected,
                extended,
                removed,
            },
        );
    }

    let interior = 1..current.len() - 1;

    if ratio > MAX_BREATHING_RATIO {
        for i in interior.clone().rev() {
            if ratio <= MAX_BREATHING_RATIO {
                break;
            }
            if current[i].has_breathing() {
                current[i] = strip_breathing(&current[i]);
                removed.push(current[i].id.clone());
                (ratio, coverage) = measure(&current);
            }
        }
    } else {
        for i in interior {
            if is_balanced(ratio, coverage) {
                break;
            }
            let scene = &current[i];
            let excluded = matches!(
                scene.intention,
                MarketingIntention::CaptureAttention | MarketingIntention::DriveAction
            );
            if scene.has_breathing() || excluded || !tables.tempo_for(scene.phase, style).idle_allowed {
                continue;
            }
            let candidate = inject_breathing(scene, tables.breathing.recommended(style, scene.scene_type));
            let mut trial = current.clone();
            trial[i] = candidate;
            let (trial_ratio, trial_coverage) = measure(&trial);
            if trial_ratio > MAX_BREATHING_RATIO {
                continue;
            }
            injected.push(trial[i].id.clone());
            current = trial;
            (ratio, coverage) = (trial_ratio, trial_coverage);
        }
        if ratio < MIN_BREATHING_RATIO {
            extended = lengthen_pauses(&mut current, tables, style);
            (ratio, coverage) = measure(&current);
        }
    }

    let balanced = is_balanced(ratio, coverage);
    if !balanced {
        tracing::warn!(ratio, coverage, "Breathing balance not reached");
    }
    (
        current,
        BreathingBalance {
            ratio,
            coverage,
            balanced,
            injected,
            extended,
            removed,
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::NarrativePhase;
    use crate::scene::test_support::{scene, text_beat};
    use crate::types::DEFAULT_FPS;

    fn one_beat(id: &str, intention: MarketingIntention) -> Scene {
        let mut s = scene(
            id,
            SceneType::Feature,
            vec![text_beat("a", BeatAction::RevealHeadline, 6, 78)],
            90,
        );
        s.intention = intention;
        s
    }

    // -- assess_breathing_need --------------------------------------------------

    #[test]
    fn excluded_intentions_never_breathe() {
        let s = one_beat("s", MarketingIntention::CaptureAttention);
        assert_eq!(assess_breathing_need(&s, DEFAULT_FPS), BreathingReason::ExcludedIntention);
        let s = one_beat("s", MarketingIntention::DriveAction);
        assert!(!assess_breathing_need(&s, DEFAULT_FPS).needs_breathing());
    }

    #[test]
    fn always_intentions_breathe() {
        let s = one_beat("s", MarketingIntention::BuildTrust);
        assert_eq!(assess_breathing_need(&s, DEFAULT_FPS), BreathingReason::Intention);
    }

    #[test]
    fn dense_inform_scene_breathes() {
        let beats = (0..5)
            .map(|i| text_beat(&format!("b{i}"), BeatAction::Accent, i * 10, 10))
            .collect();
        let s = scene("s", SceneType::Feature, beats, 90);
        assert!(beat_density(&s, DEFAULT_FPS) > DENSITY_THRESHOLD);
        assert_eq!(assess_breathing_need(&s, DEFAULT_FPS), BreathingReason::HighDensity);
    }

    #[test]
    fn long_text_breathes() {
        let mut s = one_beat("s", MarketingIntention::Inform);
        s.beats[0].text = Some("x".repeat(LONG_TEXT_CHARS + 1));
        assert_eq!(assess_breathing_need(&s, DEFAULT_FPS), BreathingReason::LongText);
        s.beats[0].text = Some("short".to_string());
        assert_eq!(assess_breathing_need(&s, DEFAULT_FPS), BreathingReason::NotNeeded);
    }

    #[test]
    fn proof_scenes_settle() {
        let table = BreathingPresetTable::default();
        assert_eq!(table.recommended(VideoStyle::Dynamic, SceneType::Proof).name, "proof_settle");
        assert_eq!(table.recommended(VideoStyle::Dynamic, SceneType::Feature).name, "quick_beat");
    }

    // -- inject_breathing -------------------------------------------------------

    #[test]
    fn after_content_placement_grows_scene_when_needed() {
        let s = one_beat("s", MarketingIntention::Inform);
        let preset = BreathingPresetTable::default().soft_pause;
        let out = inject_breathing(&s, &preset);
        let br = out.beats.last().unwrap();
        assert!(br.is_breathing());
        assert_eq!(br.start_frame, 84);
        assert_eq!(out.duration_frames, 102);
        assert_eq!(s.duration_frames, 90);
    }

    #[test]
    fn before_transition_leaves_pad() {
        let s = scene(
            "s",
            SceneType::Feature,
            vec![text_beat("a", BeatAction::RevealHeadline, 0, 30)],
            120,
        );
        let preset = BreathingPresetTable::default().cinematic_hold;
        let out = inject_breathing(&s, &preset);
        let br = out.beats.last().unwrap();
        assert_eq!(br.start_frame, 80);
        assert_eq!(br.end_frame() + TRANSITION_PAD_FRAMES, out.duration_frames);
        assert_eq!(out.duration_frames, 120);
    }

    #[test]
    fn scene_end_is_flush() {
        let s = scene(
            "s",
            SceneType::Feature,
            vec![text_beat("a", BeatAction::RevealHeadline, 0, 30)],
            120,
        );
        let out = inject_breathing(&s, &BreathingPresetTable::default().still_pause);
        assert_eq!(out.beats.last().unwrap().end_frame(), 120);
    }

    #[test]
    fn injection_is_not_repeated() {
        let s = one_beat("s", MarketingIntention::Inform);
        let preset = BreathingPresetTable::default().quick_beat;
        let once = inject_breathing(&s, &preset);
        assert_eq!(inject_breathing(&once, &preset), once);
    }

    #[test]
    fn strip_removes_only_breathing() {
        let s = inject_breathing(
            &one_beat("s", MarketingIntention::Inform),
            &BreathingPresetTable::default().quick_beat,
        );
        let stripped = strip_breathing(&s);
        assert_eq!(stripped.beats.len(), 1);
        assert!(!stripped.has_breathing());
    }

    #[test]
    fn disallowed_phase_strips_breathing() {
        let tables = ProfileTables::default();
        let mut s = inject_breathing(
            &one_beat("s", MarketingIntention::BuildTrust),
            &tables.breathing.soft_pause,
        );
        s.phase = NarrativePhase::Climax;
        let out = apply_breathing(&s, &tables, VideoStyle::Corporate, DEFAULT_FPS);
        assert!(!out.has_breathing());
    }

    #[test]
    fn edge_scenes_never_breathe() {
        let tables = ProfileTables::default();
        let mut scenes: Vec<Scene> = (0..3)
            .map(|i| one_beat(&format!("s{i}"), MarketingIntention::EvokeEmotion))
            .collect();
        scenes[0] = inject_breathing(&scenes[0], &tables.breathing.soft_pause);
        let out = apply_video_breathing(&scenes, &tables, VideoStyle::Corporate, DEFAULT_FPS);
        assert!(!out[0].has_breathing());
        assert!(out[1].has_breathing());
        assert!(!out[2].has_breathing());
    }

    // -- balance_breathing ------------------------------------------------------

    #[test]
    fn balance_injects_into_interior_scenes() {
        let tables = ProfileTables::default();
        let scenes: Vec<Scene> = (0..5)
            .map(|i| one_beat(&format!("s{i}"), MarketingIntention::Inform))
            .collect();
        let (out, report) = balance_breathing(&scenes, &tables, VideoStyle::Corporate);
        assert!(report.balanced);
        assert_eq!(report.injected, vec!["s1", "s2"]);
        assert!(!out[0].has_breathing());
        assert!(!out[4].has_breathing());
        assert!((MIN_BREATHING_RATIO..=MAX_BREATHING_RATIO).contains(&report.ratio));
    }

    #[test]
    fn short_ratio_lengthens_existing_pause() {
        let tables = ProfileTables::default();
        let mut scenes: Vec<Scene> = (0..4)
            .map(|i| one_beat(&format!("s{i}"), MarketingIntention::Inform))
            .collect();
        scenes[1] = inject_breathing(&scenes[1], &tables.breathing.soft_pause);
        scenes[2].phase = NarrativePhase::Climax;
        assert!(measure_breathing(&scenes).ratio < MIN_BREATHING_RATIO);

        let (out, report) = balance_breathing(&scenes, &tables, VideoStyle::Corporate);
        assert!(report.injected.is_empty());
        assert_eq!(report.extended, vec!["s1"]);
        assert_eq!(out[1].breathing_frames(), 40);
        assert_eq!(out[1].duration_frames, 124);
        assert!((MIN_BREATHING_RATIO..=MAX_BREATHING_RATIO).contains(&report.ratio));
        assert_eq!(measure_breathing(&out).ratio, report.ratio);
        assert!(!out[2].has_breathing());
    }

    #[test]
    fn huge_scenes_do_not_overflow_the_measure() {
        let scenes: Vec<Scene> = (0..3)
            .map(|i| {
                let mut s = one_beat(&format!("s{i}"), MarketingIntention::Inform);
                s.duration_frames = Frame::MAX;
                s
            })
            .collect();
        let report = measure_breathing(&scenes);
        assert_eq!(report.ratio, 0.0);
    }

    #[test]
    fn balanced_video_is_left_alone() {
        let tables = ProfileTables::default();
        let mut scenes: Vec<Scene> = (0..3)
            .map(|i| one_beat(&format!("s{i}"), MarketingIntention::Inform))
            .collect();
        scenes[1] = inject_breathing(&scenes[1], &tables.breathing.soft_pause);
        let (out, report) = balance_breathing(&scenes, &tables, VideoStyle::Corporate);
        assert!(report.balanced);
        assert!(report.injected.is_empty());
        assert_eq!(out, scenes);
    }

    #[test]
    fn excess_breathing_is_stripped_from_interior() {
        let tables = ProfileTables::default();
        let long = BreathingPreset::new("long", 60, BreathingPlacement::AfterContent, HoldAnimation::Still);
        let scenes: Vec<Scene> = (0..4)
            .map(|i| inject_breathing(&one_beat(&format!("s{i}"), MarketingIntention::Inform), &long))
            .collect();
        let (out, report) = balance_breathing(&scenes, &tables, VideoStyle::Corporate);
        assert!(out[0].has_breathing());
        assert!(out[3].has_breathing());
        assert!(!report.removed.is_empty());
        assert!(report.ratio <= MAX_BREATHING_RATIO || report.removed.len() == 2);
    }
}
