//! Turns the recovered JSON into typed scenes.
//!
//! Unknown or missing kinds fall back to sensible defaults and image ids the
//! request never provided are dropped, so a single odd field never fails the
//! whole response. Only a missing or empty scene list is fatal.

use std::collections::HashSet;

use beatforge_core::profiles::Pacing;
use beatforge_core::scene::{
    parse_kind, parse_scene_type, BackgroundAnimation, BackgroundSpec, BeatAction, EntrySpec,
    ExitSpec, GradientKind, ImageFraming, ImageKind, ImageRole, LayoutPosition,
    MarketingIntention, MotionDirection, RhythmDecision, RhythmStrategy, SceneImage, SceneType,
    TextureKind, TypographySpec,
};
use beatforge_core::narrative::NarrativePhase;
use beatforge_core::{Beat, Frame, GenerationRequest, HexColor, Scene, StyleProfile, MAX_SCENE_FRAMES};
use serde_json::Value;

use crate::error::PipelineError;
use crate::raw::{RawBackground, RawBeat, RawGeneration, RawScene, RawSceneImage};

pub const DEFAULT_HEADING_FONT: &str = "Inter";
pub const DEFAULT_BODY_FONT: &str = "Inter";

/// Exit length used when the generator names an exit without a length.
const DEFAULT_EXIT_FRAMES: Frame = 8;

/// Scenes plus the creative framing around them.
#[derive(Debug, Clone)]
pub struct StructuredVideo {
    pub concept: String,
    pub emotional_arc: Vec<String>,
    pub scenes: Vec<StructuredScene>,
}

#[derive(Debug, Clone)]
pub struct StructuredScene {
    pub scene: Scene,
    /// Every beat arrived with an explicit start frame.
    pub explicitly_timed: bool,
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// Read the top-level shape. Fails when `scenes` is absent or empty.
pub fn parse_generation(value: Value) -> Result<RawGeneration, PipelineError> {
    if !value.is_object() {
        return Err(PipelineError::Structural(
            "response is not a JSON object".into(),
        ));
    }
    let raw: RawGeneration =
        serde_json::from_value(value).map_err(|e| PipelineError::Structural(e.to_string()))?;
    match &raw.scenes {
        None => Err(PipelineError::Structural("missing 'scenes'".into())),
        Some(scenes) if scenes.is_empty() => {
            Err(PipelineError::Structural("'scenes' is empty".into()))
        }
        Some(_) => Ok(raw),
    }
}

pub fn structure_video(
    raw: RawGeneration,
    request: &GenerationRequest,
    style: &StyleProfile,
    fps: u32,
) -> Result<StructuredVideo, PipelineError> {
    let raw_scenes = raw
        .scenes
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::Structural("'scenes' is empty".into()))?;

    let count = raw_scenes.len();
    let mut seen_ids = HashSet::new();
    let scenes = raw_scenes
        .iter()
        .enumerate()
        .map(|(index, raw_scene)| {
            let mut structured = structure_scene(raw_scene, index, count, request, style, fps);
            if !seen_ids.insert(structured.scene.id.clone()) {
                structured.scene.id = format!("{}-{}", structured.scene.id, index + 1);
                seen_ids.insert(structured.scene.id.clone());
            }
            structured
        })
        .collect();

    let concept = raw
        .concept
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| request.prompt.trim().to_string());

    let emotional_arc = raw
        .emotional_arc
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(StructuredVideo {
        concept,
        emotional_arc,
        scenes,
    })
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// First scene hooks, last scene calls to action, the rest feature.
fn fallback_scene_type(index: usize, count: usize) -> SceneType {
    if index == 0 {
        SceneType::Hook
    } else if index + 1 == count {
        SceneType::Cta
    } else {
        SceneType::Feature
    }
}

pub fn default_intention(scene_type: SceneType) -> MarketingIntention {
    match scene_type {
        SceneType::Hook => MarketingIntention::CaptureAttention,
        SceneType::Problem => MarketingIntention::CreateEmpathy,
        SceneType::Solution => MarketingIntention::DemonstrateValue,
        SceneType::Feature => MarketingIntention::Inform,
        SceneType::Benefit => MarketingIntention::EvokeEmotion,
        SceneType::Proof => MarketingIntention::BuildTrust,
        SceneType::Cta => MarketingIntention::DriveAction,
    }
}

fn default_role(kind: ImageKind) -> ImageRole {
    match kind {
        ImageKind::Product => ImageRole::Product,
        ImageKind::Logo => ImageRole::Logo,
        ImageKind::Background => ImageRole::Background,
        ImageKind::Lifestyle | ImageKind::Person | ImageKind::Screenshot => ImageRole::Supporting,
    }
}

fn default_framing(kind: ImageKind) -> ImageFraming {
    match kind {
        ImageKind::Logo => ImageFraming::Badge,
        ImageKind::Screenshot => ImageFraming::Device,
        _ => ImageFraming::None,
    }
}

/// Non-negative finite frame count, capped at [`MAX_SCENE_FRAMES`].
fn to_frames(value: f64) -> Option<Frame> {
    (value.is_finite() && value >= 0.0).then(|| value.round().min(f64::from(MAX_SCENE_FRAMES)) as Frame)
}

fn scene_duration(raw: &RawScene, style: &StyleProfile, fps: u32) -> Frame {
    raw.duration_frames
        .and_then(to_frames)
        .or_else(|| raw.duration_seconds.and_then(|s| to_frames(s * f64::from(fps))))
        .filter(|d| *d > 0)
        .unwrap_or((style.scene_duration.min + style.scene_duration.max) / 2)
}

pub fn structure_scene(
    raw: &RawScene,
    index: usize,
    count: usize,
    request: &GenerationRequest,
    style: &StyleProfile,
    fps: u32,
) -> StructuredScene {
    let id = raw
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("scene-{}", index + 1));

    let scene_type = raw
        .scene_type
        .as_deref()
        .and_then(parse_scene_type)
        .unwrap_or_else(|| {
            let fallback = fallback_scene_type(index, count);
            tracing::warn!(scene_id = %id, raw = ?raw.scene_type, fallback = ?fallback, "Unknown scene type");
            fallback
        });

    let intention = raw
        .intention
        .as_deref()
        .and_then(parse_kind::<MarketingIntention>)
        .unwrap_or_else(|| default_intention(scene_type));

    let rhythm = {
        let r = raw.rhythm.clone().unwrap_or_default();
        RhythmDecision {
            strategy: r
                .strategy
                .as_deref()
                .and_then(parse_kind::<RhythmStrategy>)
                .unwrap_or(RhythmStrategy::Cascade),
            pacing: r
                .pacing
                .as_deref()
                .and_then(parse_kind::<Pacing>)
                .unwrap_or(style.pacing),
            rationale: r.rationale.filter(|s| !s.trim().is_empty()),
        }
    };

    let duration_frames = scene_duration(raw, style, fps);

    let mut images = structure_images(&id, &raw.images, request);
    let beats: Vec<Beat> = raw
        .beats
        .iter()
        .enumerate()
        .map(|(k, b)| structure_beat(&id, k, b, request, style))
        .collect();
    for image_id in beats.iter().filter_map(|b| b.image_id.as_deref()) {
        if images.iter().all(|i| i.image_id != image_id) {
            if let Some(provided) = request.image(image_id) {
                images.push(SceneImage {
                    image_id: image_id.to_string(),
                    kind: provided.kind,
                    role: default_role(provided.kind),
                    framing: default_framing(provided.kind),
                });
            }
        }
    }

    let explicitly_timed = !raw.beats.is_empty()
        && raw
            .beats
            .iter()
            .all(|b| b.start_frame.and_then(to_frames).is_some());

    let scene = Scene {
        id,
        scene_type,
        intention,
        phase: NarrativePhase::Opening,
        rhythm,
        beats,
        duration_frames,
        background: structure_background(raw.background.as_ref()),
        typography: TypographySpec {
            heading_font: raw
                .typography
                .as_ref()
                .and_then(|t| t.heading_font.clone())
                .unwrap_or_else(|| DEFAULT_HEADING_FONT.into()),
            body_font: raw
                .typography
                .as_ref()
                .and_then(|t| t.body_font.clone())
                .unwrap_or_else(|| DEFAULT_BODY_FONT.into()),
            primary_color: HexColor::from_rgb(0xff, 0xff, 0xff),
            secondary_color: HexColor::from_rgb(0xc9, 0xcd, 0xd3),
        },
        images,
        layout_position: raw
            .layout_position
            .as_deref()
            .and_then(parse_kind::<LayoutPosition>)
            .unwrap_or_default(),
        dominant_motion: raw
            .dominant_motion
            .as_deref()
            .and_then(parse_kind::<MotionDirection>)
            .unwrap_or_default(),
        image_pattern: None,
        quality_validated: false,
    };

    StructuredScene {
        scene,
        explicitly_timed,
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

fn structure_images(
    scene_id: &str,
    raw: &[RawSceneImage],
    request: &GenerationRequest,
) -> Vec<SceneImage> {
    let mut images: Vec<SceneImage> = Vec::new();
    for entry in raw {
        let Some(image_id) = entry.image_id.as_deref() else {
            continue;
        };
        let Some(provided) = request.image(image_id) else {
            tracing::warn!(scene_id, image_id, "Dropping reference to unknown image");
            continue;
        };
        if images.iter().any(|i| i.image_id == image_id) {
            continue;
        }
        images.push(SceneImage {
            image_id: image_id.to_string(),
            kind: provided.kind,
            role: entry
                .role
                .as_deref()
                .and_then(parse_kind)
                .unwrap_or_else(|| default_role(provided.kind)),
            framing: entry
                .framing
                .as_deref()
                .and_then(parse_kind)
                .unwrap_or_else(|| default_framing(provided.kind)),
        });
    }
    images
}

fn structure_beat(
    scene_id: &str,
    k: usize,
    raw: &RawBeat,
    request: &GenerationRequest,
    style: &StyleProfile,
) -> Beat {
    let id = raw
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{scene_id}-b{}", k + 1));

    let text = raw
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let image_id = match raw.image_id.as_deref() {
        Some(image_id) if request.image(image_id).is_some() => Some(image_id.to_string()),
        Some(image_id) => {
            tracing::warn!(scene_id, beat_id = %id, image_id, "Dropping beat reference to unknown image");
            None
        }
        None => None,
    };

    let action = raw
        .action
        .as_deref()
        .and_then(parse_kind::<BeatAction>)
        .unwrap_or(if image_id.is_some() {
            BeatAction::ShowImage
        } else if text.is_some() {
            BeatAction::RevealSubtext
        } else {
            BeatAction::Accent
        });

    let start = raw.start_frame.and_then(to_frames).unwrap_or(0);
    let length = raw
        .duration_frames
        .and_then(to_frames)
        .filter(|d| *d > 0)
        .unwrap_or(style.base_rhythm_frames);

    let mut beat = Beat::new(id, action, start, length);
    beat.text = text;
    beat.image_id = image_id;
    beat.entry = raw.entry.as_ref().and_then(|e| {
        Some(EntrySpec {
            kind: parse_kind(e.kind())?,
            duration_frames: e
                .duration_frames()
                .and_then(to_frames)
                .unwrap_or(style.entry_fade_frames),
        })
    });
    beat.hold = raw.hold.as_deref().and_then(parse_kind);
    beat.exit = raw.exit.as_ref().and_then(|e| {
        Some(ExitSpec {
            kind: parse_kind(e.kind())?,
            duration_frames: e
                .duration_frames()
                .and_then(to_frames)
                .unwrap_or(DEFAULT_EXIT_FRAMES),
        })
    });
    beat.position = raw.position.as_deref().and_then(parse_kind);
    beat
}

fn structure_background(raw: Option<&RawBackground>) -> BackgroundSpec {
    let mut background = BackgroundSpec::flat(HexColor::from_rgb(0x10, 0x11, 0x14));
    let Some(raw) = raw else {
        return background;
    };

    let colors: Vec<HexColor> = raw
        .colors
        .iter()
        .filter_map(|c| HexColor::parse(c).ok())
        .collect();
    if !colors.is_empty() {
        if colors.len() > 1 {
            background.gradient = GradientKind::Linear;
        }
        background.colors = colors;
    }
    if let Some(gradient) = raw.gradient.as_deref().and_then(parse_kind::<GradientKind>) {
        background.gradient = gradient;
    }
    if let Some(texture) = raw.texture.as_deref().and_then(parse_kind::<TextureKind>) {
        background.texture = texture;
    }
    if let Some(opacity) = raw.texture_opacity.filter(|o| o.is_finite()) {
        background.texture_opacity = opacity.clamp(0.0, 1.0);
    }
    if let Some(animation) = raw.animation.as_deref().and_then(parse_kind::<BackgroundAnimation>) {
        background.animation = animation;
    }
    background
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use beatforge_core::request::ProvidedImage;
    use beatforge_core::scene::EntryAnimation;
    use beatforge_core::{ProfileTables, VideoStyle};
    use serde_json::json;

    fn request_with_image() -> GenerationRequest {
        let mut request = GenerationRequest::new("A shoe launch");
        request.images.push(ProvidedImage {
            id: "shoe".into(),
            kind: ImageKind::Product,
            description: None,
        });
        request
    }

    fn video(value: Value) -> StructuredVideo {
        let tables = ProfileTables::default();
        let raw = parse_generation(value).unwrap();
        structure_video(raw, &request_with_image(), tables.style(VideoStyle::Corporate), 30).unwrap()
    }

    // -- structural errors -----------------------------------------------------

    #[test]
    fn missing_or_empty_scenes_are_structural_errors() {
        assert_matches!(parse_generation(json!({"concept": "x"})), Err(PipelineError::Structural(_)));
        assert_matches!(parse_generation(json!({"scenes": []})), Err(PipelineError::Structural(_)));
        assert_matches!(parse_generation(json!([1, 2])), Err(PipelineError::Structural(_)));
        assert_matches!(
            parse_generation(json!({"scenes": "three"})),
            Err(PipelineError::Structural(_))
        );
    }

    // -- mapping -----------------------------------------------------------------

    #[test]
    fn maps_loose_fields() {
        let v = video(json!({
            "concept": "Run further",
            "emotionalArc": ["doubt", "spark", "drive"],
            "scenes": [{
                "id": "s1",
                "type": "hook",
                "durationFrames": 90.0,
                "layoutPosition": "Left",
                "background": {"colors": ["#112233", "nope"], "animation": "slow-pan"},
                "beats": [
                    {"action": "reveal_headline", "text": "Go", "startFrame": 0, "durationFrames": 30,
                     "entry": {"kind": "Scale In", "durationFrames": 9}},
                    {"action": "show_image", "imageId": "shoe", "startFrame": 20, "entry": "slide_up"}
                ]
            }]
        }));
        assert_eq!(v.concept, "Run further");
        assert_eq!(v.emotional_arc.len(), 3);

        let s = &v.scenes[0];
        assert!(s.explicitly_timed);
        assert_eq!(s.scene.scene_type, SceneType::Hook);
        assert_eq!(s.scene.intention, MarketingIntention::CaptureAttention);
        assert_eq!(s.scene.duration_frames, 90);
        assert_eq!(s.scene.background.colors.len(), 1);
        assert_eq!(s.scene.background.animation, BackgroundAnimation::SlowPan);
        assert_eq!(s.scene.beats[0].entry.unwrap().kind, EntryAnimation::ScaleIn);
        assert_eq!(s.scene.beats[0].entry.unwrap().duration_frames, 9);
        assert_eq!(s.scene.beats[1].entry.unwrap().kind, EntryAnimation::SlideUp);
        assert_eq!(s.scene.beats[1].id, "s1-b2");
        // image referenced only from a beat is added to the scene
        assert_eq!(s.scene.images.len(), 1);
        assert_eq!(s.scene.images[0].role, ImageRole::Product);
    }

    #[test]
    fn unknown_values_fall_back() {
        let v = video(json!({
            "scenes": [
                {"type": "intro", "beats": [{"text": "hello"}]},
                {"type": "???", "beats": [{"imageId": "ghost"}], "images": [{"imageId": "ghost"}]},
                {"beats": []}
            ]
        }));
        let types: Vec<SceneType> = v.scenes.iter().map(|s| s.scene.scene_type).collect();
        assert_eq!(types, vec![SceneType::Hook, SceneType::Feature, SceneType::Cta]);
        assert_eq!(v.concept, "A shoe launch");
        assert_eq!(v.scenes[0].scene.id, "scene-1");
        assert_eq!(v.scenes[0].scene.beats[0].action, BeatAction::RevealSubtext);
        assert!(!v.scenes[0].explicitly_timed);
        // unknown image ids are dropped everywhere
        assert!(v.scenes[1].scene.images.is_empty());
        assert_eq!(v.scenes[1].scene.beats[0].image_id, None);
        assert_eq!(v.scenes[1].scene.beats[0].action, BeatAction::Accent);
        // corporate band 60-165 → midpoint
        assert_eq!(v.scenes[2].scene.duration_frames, 112);
    }

    #[test]
    fn duplicate_scene_ids_are_made_unique() {
        let v = video(json!({"scenes": [{"id": "a"}, {"id": "a"}]}));
        assert_eq!(v.scenes[0].scene.id, "a");
        assert_eq!(v.scenes[1].scene.id, "a-2");
    }

    #[test]
    fn seconds_convert_to_frames() {
        let v = video(json!({"scenes": [{"durationSeconds": 2.5}]}));
        assert_eq!(v.scenes[0].scene.duration_frames, 75);
    }

    #[test]
    fn huge_frame_values_are_capped() {
        let v = video(json!({"scenes": [{
            "durationFrames": 9.0e12,
            "beats": [{"action": "breathe", "startFrame": 4000000000u64, "durationFrames": 200000000}]
        }]}));
        let s = &v.scenes[0].scene;
        assert_eq!(s.duration_frames, MAX_SCENE_FRAMES);
        assert_eq!(s.beats[0].start_frame, MAX_SCENE_FRAMES);
        assert_eq!(s.beats[0].duration_frames, MAX_SCENE_FRAMES);
    }
}
