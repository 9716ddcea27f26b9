//! Transition planner: continuity scoring between adjacent scenes and the
//! transition behavior chosen from it.

use serde::{Deserialize, Serialize};

use crate::jitter::{JitterOffset, JitterSource, MAX_JITTER_PX};
use crate::profiles::VideoStyle;
use crate::scene::{LayoutPosition, MotionDirection, Scene, SceneType};
use crate::types::Frame;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SCORE_SAME_LAYOUT: u8 = 30;
pub const SCORE_SAME_MOTION: u8 = 25;
pub const SCORE_SAME_COLOR_FAMILY: u8 = 20;
pub const SCORE_SAME_IMAGE_PRESENCE: u8 = 15;
pub const SCORE_ADJACENT_TYPES: u8 = 10;

/// Scores at or above this get a nearly invisible blend.
pub const SEAMLESS_THRESHOLD: u8 = 70;

/// Reference canvas used to turn layout offsets into pixels.
pub const CANVAS_WIDTH_PX: f32 = 1920.0;
pub const CANVAS_HEIGHT_PX: f32 = 1080.0;

/// Distance travelled by layers in a motion continuation.
pub const MOTION_TRAVEL_PX: f32 = 120.0;

pub const DYNAMIC_DURATION_FACTOR: f64 = 0.6;
pub const DYNAMIC_MIN_FRAMES: Frame = 4;
pub const DYNAMIC_DELTA_FACTOR: f32 = 1.5;
pub const CINEMATIC_DURATION_FACTOR: f64 = 1.3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    SeamlessBlend,
    MotionContinuation,
    PositionMorph,
    ScaleEmphasis,
    SoftCrossfade,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeamlessBlend => "seamless_blend",
            Self::MotionContinuation => "motion_continuation",
            Self::PositionMorph => "position_morph",
            Self::ScaleEmphasis => "scale_emphasis",
            Self::SoftCrossfade => "soft_crossfade",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseOut,
    EaseInOut,
}

/// A value animated from `from` to `to` over the transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub from: f32,
    pub to: f32,
}

impl Curve {
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    pub const fn hold(value: f32) -> Self {
        Self { from: value, to: value }
    }

    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            from: f(self.from),
            to: f(self.to),
        }
    }
}

/// Opacity, scale, position and blur curves of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMotion {
    pub opacity: Curve,
    pub scale: Curve,
    pub translate_x: Curve,
    pub translate_y: Curve,
    pub blur: Curve,
}

impl LayerMotion {
    fn fade(from: f32, to: f32) -> Self {
        Self {
            opacity: Curve::new(from, to),
            scale: Curve::hold(1.0),
            translate_x: Curve::hold(0.0),
            translate_y: Curve::hold(0.0),
            blur: Curve::hold(0.0),
        }
    }

    /// Scale translation and scale deltas by `factor`.
    fn amplified(self, factor: f32) -> Self {
        Self {
            scale: self.scale.map(|v| 1.0 + (v - 1.0) * factor),
            translate_x: self.translate_x.map(|v| v * factor),
            translate_y: self.translate_y.map(|v| v * factor),
            ..self
        }
    }

    /// Rotate rightward travel onto `direction`.
    fn oriented(self, direction: MotionDirection) -> Self {
        let x = self.translate_x;
        match direction {
            MotionDirection::None | MotionDirection::Right => self,
            MotionDirection::Left => Self {
                translate_x: x.map(|v| -v),
                ..self
            },
            MotionDirection::Down => Self {
                translate_x: self.translate_y,
                translate_y: x,
                ..self
            },
            MotionDirection::Up => Self {
                translate_x: self.translate_y,
                translate_y: x.map(|v| -v),
                ..self
            },
        }
    }
}

/// Behavior between two scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSpec {
    pub kind: TransitionKind,
    pub duration_frames: Frame,
    /// Whether outgoing and incoming layers play at the same time.
    pub overlap: bool,
    pub outgoing: LayerMotion,
    pub incoming: LayerMotion,
    pub direction: MotionDirection,
    pub easing: Easing,
    /// Per-frame glitch offsets, dynamic style only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<Vec<JitterOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTransition {
    pub from_scene_id: String,
    pub to_scene_id: String,
    pub continuity_score: u8,
    pub spec: TransitionSpec,
}

// ---------------------------------------------------------------------------
// Scoring and decision
// ---------------------------------------------------------------------------

/// Heuristic 0–100 similarity of two adjacent scenes.
pub fn continuity_score(from: &Scene, to: &Scene) -> u8 {
    let mut score = 0u8;
    if from.layout_position == to.layout_position {
        score += SCORE_SAME_LAYOUT;
    }
    if from.dominant_motion == to.dominant_motion {
        score += SCORE_SAME_MOTION;
    }
    let same_family = match (from.background.leading_color(), to.background.leading_color()) {
        (Some(a), Some(b)) => a.same_family(b),
        _ => false,
    };
    if same_family {
        score += SCORE_SAME_COLOR_FAMILY;
    }
    if from.has_images() == to.has_images() {
        score += SCORE_SAME_IMAGE_PRESENCE;
    }
    if from.scene_type.is_adjacent_to(to.scene_type) {
        score += SCORE_ADJACENT_TYPES;
    }
    score.min(100)
}

/// Pick the transition kind for a scored pair.
pub fn choose_kind(from: &Scene, to: &Scene, score: u8) -> TransitionKind {
    if score >= SEAMLESS_THRESHOLD {
        TransitionKind::SeamlessBlend
    } else if !from.dominant_motion.is_none() && from.dominant_motion == to.dominant_motion {
        TransitionKind::MotionContinuation
    } else if from.layout_position != to.layout_position {
        TransitionKind::PositionMorph
    } else if matches!(to.scene_type, SceneType::Proof | SceneType::Cta) {
        TransitionKind::ScaleEmphasis
    } else {
        TransitionKind::SoftCrossfade
    }
}

/// Base spec for `kind`, before style adaptation.
pub fn base_spec(kind: TransitionKind) -> TransitionSpec {
    let (duration_frames, overlap, outgoing, incoming, easing) = match kind {
        TransitionKind::SeamlessBlend => (
            8,
            true,
            LayerMotion {
                blur: Curve::new(0.0, 2.0),
                ..LayerMotion::fade(1.0, 0.0)
            },
            LayerMotion {
                blur: Curve::new(2.0, 0.0),
                ..LayerMotion::fade(0.0, 1.0)
            },
            Easing::Linear,
        ),
        TransitionKind::MotionContinuation => (
            14,
            true,
            LayerMotion {
                translate_x: Curve::new(0.0, MOTION_TRAVEL_PX),
                ..LayerMotion::fade(1.0, 0.0)
            },
            LayerMotion {
                translate_x: Curve::new(-MOTION_TRAVEL_PX, 0.0),
                ..LayerMotion::fade(0.0, 1.0)
            },
            Easing::EaseInOut,
        ),
        TransitionKind::PositionMorph => (
            16,
            true,
            LayerMotion {
                scale: Curve::new(1.0, 0.96),
                ..LayerMotion::fade(1.0, 0.0)
            },
            LayerMotion {
                scale: Curve::new(0.96, 1.0),
                ..LayerMotion::fade(0.0, 1.0)
            },
            Easing::EaseInOut,
        ),
        TransitionKind::ScaleEmphasis => (
            12,
            false,
            LayerMotion {
                scale: Curve::new(1.0, 1.08),
                ..LayerMotion::fade(1.0, 0.0)
            },
            LayerMotion {
                scale: Curve::new(0.9, 1.0),
                ..LayerMotion::fade(0.0, 1.0)
            },
            Easing::EaseOut,
        ),
        TransitionKind::SoftCrossfade => (
            12,
            true,
            LayerMotion::fade(1.0, 0.0),
            LayerMotion::fade(0.0, 1.0),
            Easing::EaseInOut,
        ),
    };
    TransitionSpec {
        kind,
        duration_frames,
        overlap,
        outgoing,
        incoming,
        direction: MotionDirection::None,
        easing,
        jitter: None,
    }
}

/// Dominant axis direction of the move from one layout anchor to another.
fn layout_direction(from: LayoutPosition, to: LayoutPosition) -> MotionDirection {
    let (fx, fy) = from.offset();
    let (tx, ty) = to.offset();
    let (dx, dy) = (tx - fx, ty - fy);
    if dx == 0.0 && dy == 0.0 {
        MotionDirection::None
    } else if dx.abs() >= dy.abs() {
        if dx > 0.0 {
            MotionDirection::Right
        } else {
            MotionDirection::Left
        }
    } else if dy > 0.0 {
        MotionDirection::Down
    } else {
        MotionDirection::Up
    }
}

/// Orient the spec's motion to the pair's shared direction.
fn orient(mut spec: TransitionSpec, from: &Scene, to: &Scene) -> TransitionSpec {
    match spec.kind {
        TransitionKind::MotionContinuation => {
            spec.direction = from.dominant_motion;
            spec.outgoing = spec.outgoing.oriented(spec.direction);
            spec.incoming = spec.incoming.oriented(spec.direction);
        }
        TransitionKind::PositionMorph => {
            let (fx, fy) = from.layout_position.offset();
            let (tx, ty) = to.layout_position.offset();
            let dx = (tx - fx) * CANVAS_WIDTH_PX;
            let dy = (ty - fy) * CANVAS_HEIGHT_PX;
            spec.direction = layout_direction(from.layout_position, to.layout_position);
            spec.outgoing.translate_x = Curve::new(0.0, dx);
            spec.outgoing.translate_y = Curve::new(0.0, dy);
            spec.incoming.translate_x = Curve::new(-dx, 0.0);
            spec.incoming.translate_y = Curve::new(-dy, 0.0);
        }
        _ => {}
    }
    spec
}

/// Adapt a spec to the video style. Dynamic transitions are shorter, more
/// pronounced and carry a seeded jitter track; cinematic ones are longer.
pub fn adapt_for_style(mut spec: TransitionSpec, style: VideoStyle, jitter_seed: u64) -> TransitionSpec {
    match style {
        VideoStyle::Dynamic => {
            let scaled = (f64::from(spec.duration_frames) * DYNAMIC_DURATION_FACTOR).round() as Frame;
            spec.duration_frames = scaled.max(DYNAMIC_MIN_FRAMES);
            spec.outgoing = spec.outgoing.amplified(DYNAMIC_DELTA_FACTOR);
            spec.incoming = spec.incoming.amplified(DYNAMIC_DELTA_FACTOR);
            let mut source = JitterSource::new(jitter_seed);
            spec.jitter = Some(source.track(spec.duration_frames, MAX_JITTER_PX));
        }
        VideoStyle::Cinematic => {
            spec.duration_frames =
                (f64::from(spec.duration_frames) * CINEMATIC_DURATION_FACTOR).round() as Frame;
        }
        VideoStyle::Minimal | VideoStyle::Corporate => {}
    }
    spec
}

/// Score, choose and adapt the transition between two scenes.
pub fn plan_transition(from: &Scene, to: &Scene, style: VideoStyle, jitter_seed: u64) -> PlannedTransition {
    let score = continuity_score(from, to);
    let kind = choose_kind(from, to, score);
    let spec = adapt_for_style(orient(base_spec(kind), from, to), style, jitter_seed);
    tracing::debug!(
        from = %from.id,
        to = %to.id,
        score,
        kind = kind.as_str(),
        "Planned transition"
    );
    PlannedTransition {
        from_scene_id: from.id.clone(),
        to_scene_id: to.id.clone(),
        continuity_score: score,
        spec,
    }
}

/// Plan every adjacent pair. Pair `i` uses `jitter_seed + i`.
pub fn plan_transitions(scenes: &[Scene], style: VideoStyle, jitter_seed: u64) -> Vec<PlannedTransition> {
    scenes
        .windows(2)
        .enumerate()
        .map(|(i, pair)| plan_transition(&pair[0], &pair[1], style, jitter_seed.wrapping_add(i as u64)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
