//! Quality judge: a fixed, ordered battery of structural criteria per scene,
//! each with an optional deterministic repair, plus cross-scene checks.
//!
//! The judge never mutates its input. [`auto_fix_scene`] works on a clone and
//! reports which repairs fired; the caller decides whether to re-assess.

use serde::{Deserialize, Serialize};

use crate::beat_timing::{all_share_start, has_temporal_progression, spread_simultaneous_beats};
use crate::profiles::StyleProfile;
use crate::scene::{
    BackgroundAnimation, EntryAnimation, EntrySpec, ImageFraming, ImageKind, ImageRole, Scene,
    SceneType, TextureKind,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CRITERION_NOT_SLIDE_LIKE: &str = "not_slide_like";
pub const CRITERION_HAS_BEATS: &str = "has_beats";
pub const CRITERION_TEMPORAL_PROGRESSION: &str = "temporal_progression";
pub const CRITERION_BACKGROUND_ALIVE: &str = "background_alive";
pub const CRITERION_ENTRY_ANIMATIONS: &str = "entry_animations";
pub const CRITERION_DURATION_IN_BAND: &str = "duration_in_band";
pub const CRITERION_IMAGE_ROLES: &str = "image_roles";
pub const CRITERION_LOGO_FRAMING: &str = "logo_framing";

pub const VIDEO_SILHOUETTE_REPEAT: &str = "silhouette_repeat";
pub const VIDEO_FIRST_IS_HOOK: &str = "first_is_hook";
pub const VIDEO_LAST_IS_CTA: &str = "last_is_cta";
pub const VIDEO_EMOTIONAL_ARC: &str = "emotional_arc";

/// Opacity of the grain texture added by background repairs.
pub const REPAIR_TEXTURE_OPACITY: f32 = 0.05;

/// Minimum number of stops in the declared emotional arc.
pub const MIN_EMOTIONAL_ARC_STOPS: usize = 3;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

type CheckFn = fn(&Scene, &StyleProfile) -> bool;
type RepairFn = fn(&Scene, &StyleProfile) -> Scene;

/// One named structural criterion.
pub struct Criterion {
    pub name: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    /// Returns `true` when the scene satisfies the criterion.
    pub check: CheckFn,
    pub repair: Option<RepairFn>,
}

/// The canonical criteria, in declaration order.
pub const CRITERIA: &[Criterion] = &[
    Criterion {
        name: CRITERION_NOT_SLIDE_LIKE,
        severity: Severity::Error,
        message: "scene is slide-like: static untextured background with simultaneous or absent beats",
        check: |scene, _| !is_slide_like(scene),
        repair: Some(repair_slide_like),
    },
    Criterion {
        name: CRITERION_HAS_BEATS,
        severity: Severity::Error,
        message: "scene has no beats",
        check: |scene, _| !scene.beats.is_empty(),
        repair: None,
    },
    Criterion {
        name: CRITERION_TEMPORAL_PROGRESSION,
        severity: Severity::Error,
        message: "multi-beat scene has no temporal progression",
        check: |scene, _| has_temporal_progression(scene),
        repair: Some(repair_progression),
    },
    Criterion {
        name: CRITERION_BACKGROUND_ALIVE,
        severity: Severity::Warning,
        message: "background has neither texture nor motion",
        check: |scene, _| background_is_alive(scene),
        repair: Some(repair_background_texture),
    },
    Criterion {
        name: CRITERION_ENTRY_ANIMATIONS,
        severity: Severity::Error,
        message: "one or more beats lack an entry animation",
        check: |scene, _| scene.beats.iter().all(|b| b.entry.is_some()),
        repair: Some(repair_entry_animations),
    },
    Criterion {
        name: CRITERION_DURATION_IN_BAND,
        severity: Severity::Warning,
        message: "scene duration is outside the style's allowed band",
        check: |scene, style| style.scene_duration.contains(scene.duration_frames),
        repair: None,
    },
    Criterion {
        name: CRITERION_IMAGE_ROLES,
        severity: Severity::Warning,
        message: "image carries only a bare accent role",
        check: |scene, _| scene.images.iter().all(|i| i.role != ImageRole::Accent),
        repair: None,
    },
    Criterion {
        name: CRITERION_LOGO_FRAMING,
        severity: Severity::Error,
        message: "logo is framed as an unframed hero",
        check: |scene, _| {
            !scene.images.iter().any(|i| {
                i.kind == ImageKind::Logo
                    && i.role == ImageRole::Hero
                    && i.framing == ImageFraming::None
            })
        },
        repair: None,
    },
];

/// Slide-like: static, untextured background and beats that are absent or
/// all start together.
pub fn is_slide_like(scene: &Scene) -> bool {
    let bg = &scene.background;
    let static_bg = bg.animation == BackgroundAnimation::Static
        && (bg.texture == TextureKind::None || bg.texture_opacity <= 0.0);
    static_bg && (scene.beats.is_empty() || all_share_start(&scene.beats))
}

fn background_is_alive(scene: &Scene) -> bool {
    let bg = &scene.background;
    (bg.texture != TextureKind::None && bg.texture_opacity > 0.0)
        || bg.animation != BackgroundAnimation::Static
}

fn with_grain(scene: &Scene) -> Scene {
    let mut background = scene.background.clone();
    background.texture = TextureKind::Grain;
    background.texture_opacity = REPAIR_TEXTURE_OPACITY;
    scene.with_background(background)
}

fn repair_slide_like(scene: &Scene, _style: &StyleProfile) -> Scene {
    let mut fixed = with_grain(scene);
    fixed.background.animation = BackgroundAnimation::SubtleDrift;
    if !scene.rhythm.strategy.allows_simultaneous_beats() {
        fixed.beats = spread_simultaneous_beats(&fixed.beats, fixed.duration_frames);
    }
    fixed
}

fn repair_progression(scene: &Scene, _style: &StyleProfile) -> Scene {
    scene.with_beats(spread_simultaneous_beats(&scene.beats, scene.duration_frames))
}

fn repair_background_texture(scene: &Scene, _style: &StyleProfile) -> Scene {
    with_grain(scene)
}

fn repair_entry_animations(scene: &Scene, style: &StyleProfile) -> Scene {
    let beats = scene
        .beats
        .iter()
        .map(|beat| {
            let mut beat = beat.clone();
            if beat.entry.is_none() {
                beat.entry = Some(EntrySpec {
                    kind: EntryAnimation::FadeIn,
                    duration_frames: style.entry_fade_frames,
                });
            }
            beat
        })
        .collect();
    scene.with_beats(beats)
}

// ---------------------------------------------------------------------------
// Scene assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityIssue {
    pub criterion: String,
    pub message: String,
}

/// Judge verdict for one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    pub scene_id: String,
    pub passed: bool,
    pub errors: Vec<QualityIssue>,
    pub warnings: Vec<QualityIssue>,
    pub auto_fixed: bool,
    pub fixes_applied: Vec<String>,
}

/// Run every criterion against `scene`.
pub fn assess_scene(scene: &Scene, style: &StyleProfile) -> QualityAssessment {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    for criterion in CRITERIA {
        if (criterion.check)(scene, style) {
            continue;
        }
        let issue = QualityIssue {
            criterion: criterion.name.to_string(),
            message: criterion.message.to_string(),
        };
        match criterion.severity {
            Severity::Error => errors.push(issue),
            Severity::Warning => warnings.push(issue),
        }
    }
    QualityAssessment {
        scene_id: scene.id.clone(),
        passed: errors.is_empty(),
        errors,
        warnings,
        auto_fixed: false,
        fixes_applied: Vec::new(),
    }
}

/// Fixed scene plus the names of the repairs that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoFixOutcome {
    pub scene: Scene,
    pub fixes_applied: Vec<&'static str>,
}

/// Apply each failing criterion's repair once, in declaration order, to a
/// progressively fixed clone of `scene`.
pub fn auto_fix_scene(scene: &Scene, style: &StyleProfile) -> AutoFixOutcome {
    let mut current = scene.clone();
    let mut fixes_applied = Vec::new();
    for criterion in CRITERIA {
        let Some(repair) = criterion.repair else {
            continue;
        };
        if (criterion.check)(&current, style) {
            continue;
        }
        let repaired = repair(&current, style);
        if repaired != current {
            tracing::debug!(
                scene_id = %scene.id,
                criterion = criterion.name,
                "Applied quality repair"
            );
            fixes_applied.push(criterion.name);
            current = repaired;
        }
    }
    AutoFixOutcome {
        scene: current,
        fixes_applied,
    }
}

/// Assess a scene and, when it has any issue and `auto_fix` is set, run a
/// single repair pass and re-assess. The returned scene carries the
/// `quality_validated` flag of the final verdict.
pub fn judge_scene(scene: &Scene, style: &StyleProfile, auto_fix: bool) -> (Scene, QualityAssessment) {
    let first = assess_scene(scene, style);
    let clean = first.errors.is_empty() && first.warnings.is_empty();
    if clean || !auto_fix {
        let mut judged = scene.clone();
        judged.quality_validated = first.passed;
        return (judged, first);
    }

    let outcome = auto_fix_scene(scene, style);
    if outcome.fixes_applied.is_empty() {
        let mut judged = scene.clone();
        judged.quality_validated = first.passed;
        return (judged, first);
    }

    let mut second = assess_scene(&outcome.scene, style);
    second.auto_fixed = true;
    second.fixes_applied = outcome.fixes_applied.iter().map(|s| s.to_string()).collect();
    let mut judged = outcome.scene;
    judged.quality_validated = second.passed;
    if !second.passed {
        tracing::warn!(
            scene_id = %judged.id,
            errors = second.errors.len(),
            "Scene still fails quality criteria after auto-fix"
        );
    }
    (judged, second)
}

// ---------------------------------------------------------------------------
// Video assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIssue {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAssessment {
    pub scenes: Vec<QualityAssessment>,
    pub issues: Vec<VideoIssue>,
    pub passed: bool,
}

/// Cross-scene invariants only.
pub fn assess_video_structure(scenes: &[Scene], emotional_arc: &[String]) -> Vec<VideoIssue> {
    let mut issues = Vec::new();

    for (i, pair) in scenes.windows(2).enumerate() {
        if pair[0].is_multi_beat() == pair[1].is_multi_beat() {
            let shape = if pair[1].is_multi_beat() {
                "multi-beat"
            } else {
                "single-beat"
            };
            issues.push(VideoIssue {
                code: VIDEO_SILHOUETTE_REPEAT.to_string(),
                severity: Severity::Warning,
                message: format!(
                    "scenes {} and {} share the same {shape} silhouette",
                    pair[0].id, pair[1].id
                ),
                scene_index: Some(i + 1),
            });
        }
    }

    if let Some(first) = scenes.first() {
        if first.scene_type != SceneType::Hook {
            issues.push(VideoIssue {
                code: VIDEO_FIRST_IS_HOOK.to_string(),
                severity: Severity::Error,
                message: format!("first scene {} is not a HOOK", first.id),
                scene_index: Some(0),
            });
        }
    }

    if let Some(last) = scenes.last() {
        if last.scene_type != SceneType::Cta {
            issues.push(VideoIssue {
                code: VIDEO_LAST_IS_CTA.to_string(),
                severity: Severity::Error,
                message: format!("last scene {} is not a CTA", last.id),
                scene_index: Some(scenes.len() - 1),
            });
        }
    }

    if emotional_arc.len() < MIN_EMOTIONAL_ARC_STOPS {
        issues.push(VideoIssue {
            code: VIDEO_EMOTIONAL_ARC.to_string(),
            severity: Severity::Error,
            message: format!(
                "emotional arc has {} stops, at least {MIN_EMOTIONAL_ARC_STOPS} required",
                emotional_arc.len()
            ),
            scene_index: None,
        });
    }

    issues
}

/// Assess every scene plus the cross-scene invariants.
pub fn assess_video(
    scenes: &[Scene],
    emotional_arc: &[String],
    style: &StyleProfile,
) -> VideoAssessment {
    let assessments: Vec<QualityAssessment> =
        scenes.iter().map(|s| assess_scene(s, style)).collect();
    let issues = assess_video_structure(scenes, emotional_arc);
    let passed = assessments.iter().all(|a| a.passed)
        && issues.iter().all(|i| i.severity != Severity::Error);
    VideoAssessment {
        scenes: assessments,
        issues,
        passed,
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Quality summary carried in the generation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub all_scenes_valid: bool,
    pub invalid_scenes: Vec<usize>,
    pub warnings: Vec<String>,
}

/// Fold per-scene assessments and video issues into the summary report.
///
/// Remaining scene errors and warnings plus every video issue become warning
/// strings; nothing is dropped.
pub fn build_quality_report(assessments: &[QualityAssessment], video_issues: &[VideoIssue]) -> QualityReport {
    let mut invalid_scenes = Vec::new();
    let mut warnings = Vec::new();
    for (index, assessment) in assessments.iter().enumerate() {
        if !assessment.passed {
            invalid_scenes.push(index);
        }
        for issue in assessment.errors.iter().chain(&assessment.warnings) {
            warnings.push(format!(
                "scene {} [{}]: {}",
                assessment.scene_id, issue.criterion, issue.message
            ));
        }
    }
    for issue in video_issues {
        warnings.push(format!("video [{}]: {}", issue.code, issue.message));
    }
    QualityReport {
        all_scenes_valid: invalid_scenes.is_empty(),
        invalid_scenes,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
