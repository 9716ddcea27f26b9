//! Scene and beat data model.
//!
//! Every pass treats these as values: it clones the input, patches a few
//! fields and returns the new value. Nothing is mutated in place across
//! pass boundaries.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::color::HexColor;
use crate::narrative::NarrativePhase;
use crate::profiles::{MotionIntensity, Pacing};
use crate::types::Frame;
use crate::visual_flow::ImagePattern;

// ---------------------------------------------------------------------------
// Closed kinds
// ---------------------------------------------------------------------------

/// Narrative role of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneType {
    Hook,
    Problem,
    Solution,
    Feature,
    Benefit,
    Proof,
    Cta,
}

impl SceneType {
    /// Whether two scene types are narratively adjacent (order-insensitive).
    pub fn is_adjacent_to(&self, other: SceneType) -> bool {
        use SceneType::*;
        matches!(
            (*self, other),
            (Hook, Problem)
                | (Problem, Hook)
                | (Problem, Solution)
                | (Solution, Problem)
                | (Solution, Feature)
                | (Feature, Solution)
                | (Feature, Benefit)
                | (Benefit, Feature)
                | (Benefit, Proof)
                | (Proof, Benefit)
                | (Solution, Proof)
                | (Proof, Solution)
                | (Proof, Cta)
                | (Cta, Proof)
        )
    }
}

/// What the scene is meant to do for the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketingIntention {
    CaptureAttention,
    CreateEmpathy,
    BuildTrust,
    DemonstrateValue,
    EvokeEmotion,
    Inform,
    DriveAction,
}

/// Declared rhythm strategy of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhythmStrategy {
    Cascade,
    Staccato,
    Crescendo,
    CallAndResponse,
    SingleMoment,
    BreathingPause,
}

impl RhythmStrategy {
    /// Strategies whose beats may intentionally share one start frame.
    pub fn allows_simultaneous_beats(&self) -> bool {
        matches!(self, Self::SingleMoment | Self::BreathingPause)
    }
}

/// Rhythm decision recorded on a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RhythmDecision {
    pub strategy: RhythmStrategy,
    pub pacing: Pacing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Atomic visual action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatAction {
    RevealHeadline,
    RevealSubtext,
    ShowImage,
    ShowStat,
    ShowCta,
    Accent,
    Breathe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryAnimation {
    FadeIn,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    ScaleIn,
    ZoomBurst,
    BlurIn,
    TypeOn,
    Bounce,
    MaskReveal,
}

impl EntryAnimation {
    /// The more dominant variant used when a primary element needs a boost.
    pub fn dominant(&self) -> EntryAnimation {
        match self {
            Self::FadeIn | Self::BlurIn | Self::TypeOn => Self::ScaleIn,
            Self::SlideUp | Self::SlideDown | Self::SlideLeft | Self::SlideRight => Self::ZoomBurst,
            Self::MaskReveal => Self::Bounce,
            Self::ScaleIn => Self::ZoomBurst,
            Self::ZoomBurst | Self::Bounce => *self,
        }
    }

    /// The subtler variant used when a competing element needs softening.
    pub fn subtle(&self) -> EntryAnimation {
        match self {
            Self::ZoomBurst | Self::Bounce | Self::ScaleIn => Self::FadeIn,
            Self::SlideUp | Self::SlideDown | Self::SlideLeft | Self::SlideRight => Self::BlurIn,
            Self::MaskReveal | Self::TypeOn => Self::FadeIn,
            Self::FadeIn | Self::BlurIn => *self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitAnimation {
    FadeOut,
    SlideOut,
    ScaleOut,
    BlurOut,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldAnimation {
    Still,
    SlowZoom,
    GentleFloat,
    Pulse,
    Shimmer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPosition {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl LayoutPosition {
    /// Normalized screen offset of the layout anchor from center.
    pub fn offset(&self) -> (f32, f32) {
        match self {
            Self::Center => (0.0, 0.0),
            Self::Left => (-0.25, 0.0),
            Self::Right => (0.25, 0.0),
            Self::Top => (0.0, -0.25),
            Self::Bottom => (0.0, 0.25),
        }
    }
}

/// Dominant motion direction of a scene. `None` is the zero direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MotionDirection {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl MotionDirection {
    /// Unit vector in screen space (y grows downward).
    pub fn vector(&self) -> (f32, f32) {
        match self {
            Self::None => (0.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Focus emphasis written by the hierarchy enforcer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    #[default]
    Normal,
    Dominant,
    Subdued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Product,
    Logo,
    Lifestyle,
    Screenshot,
    Person,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRole {
    Hero,
    Product,
    Supporting,
    Background,
    Logo,
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageFraming {
    #[default]
    None,
    Card,
    Device,
    Circle,
    Badge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    Solid,
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureKind {
    None,
    Grain,
    Noise,
    Paper,
    Halftone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundAnimation {
    Static,
    SubtleDrift,
    SlowPan,
    GradientShift,
    Pulse,
}

impl BackgroundAnimation {
    pub fn intensity(&self) -> MotionIntensity {
        match self {
            Self::Static | Self::SubtleDrift => MotionIntensity::Low,
            Self::SlowPan | Self::GradientShift => MotionIntensity::Medium,
            Self::Pulse => MotionIntensity::High,
        }
    }

    /// Strongest animation allowed at `intensity`.
    pub fn capped_at(&self, intensity: MotionIntensity) -> BackgroundAnimation {
        if self.intensity() <= intensity {
            return *self;
        }
        match intensity {
            MotionIntensity::Low => Self::SubtleDrift,
            MotionIntensity::Medium | MotionIntensity::High => Self::SlowPan,
        }
    }
}

/// Parse a loosely formatted kind string (`"Fade-In"`, `"fade in"`, `"fade_in"`)
/// into any of the snake_case kinds above.
pub fn parse_kind<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let normalized = raw
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_");
    serde_json::from_value(serde_json::Value::String(normalized)).ok()
}

/// Parse a scene type string (`"hook"`, `"HOOK"`, `"call-to-action"` → `Cta`).
pub fn parse_scene_type(raw: &str) -> Option<SceneType> {
    let normalized = raw.trim().to_ascii_uppercase().replace(['-', ' '], "_");
    let normalized = match normalized.as_str() {
        "CALL_TO_ACTION" => "CTA".to_string(),
        "SOCIAL_PROOF" | "TESTIMONIAL" => "PROOF".to_string(),
        _ => normalized,
    };
    serde_json::from_value(serde_json::Value::String(normalized)).ok()
}

// ---------------------------------------------------------------------------
// Beat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySpec {
    pub kind: EntryAnimation,
    pub duration_frames: Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitSpec {
    pub kind: ExitAnimation,
    pub duration_frames: Frame,
}

/// One atomic, independently timed visual action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beat {
    pub id: String,
    pub action: BeatAction,
    pub start_frame: Frame,
    pub duration_frames: Frame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<EntrySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<HoldAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<ExitSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<LayoutPosition>,
    #[serde(default)]
    pub emphasis: Emphasis,
}

impl Beat {
    pub fn new(
        id: impl Into<String>,
        action: BeatAction,
        start_frame: Frame,
        duration_frames: Frame,
    ) -> Self {
        Self {
            id: id.into(),
            action,
            start_frame,
            duration_frames,
            text: None,
            image_id: None,
            entry: None,
            hold: None,
            exit: None,
            position: None,
            emphasis: Emphasis::Normal,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_image(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
        self
    }

    pub fn with_entry(mut self, kind: EntryAnimation, duration_frames: Frame) -> Self {
        self.entry = Some(EntrySpec {
            kind,
            duration_frames,
        });
        self
    }

    pub fn with_hold(mut self, hold: HoldAnimation) -> Self {
        self.hold = Some(hold);
        self
    }

    pub fn with_timing(mut self, start_frame: Frame, duration_frames: Frame) -> Self {
        self.start_frame = start_frame;
        self.duration_frames = duration_frames;
        self
    }

    /// First frame after the beat.
    pub fn end_frame(&self) -> Frame {
        self.start_frame.saturating_add(self.duration_frames)
    }

    /// Idle "breathing" beats carry no content.
    pub fn is_breathing(&self) -> bool {
        self.action == BeatAction::Breathe
    }
}

// ---------------------------------------------------------------------------
// Background, typography, images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundSpec {
    pub gradient: GradientKind,
    /// Gradient stops (a single entry for solid backgrounds).
    pub colors: Vec<HexColor>,
    pub angle: u16,
    pub texture: TextureKind,
    pub texture_opacity: f32,
    pub animation: BackgroundAnimation,
}

impl BackgroundSpec {
    /// Flat static background with no texture.
    pub fn flat(color: HexColor) -> Self {
        Self {
            gradient: GradientKind::Solid,
            colors: vec![color],
            angle: 0,
            texture: TextureKind::None,
            texture_opacity: 0.0,
            animation: BackgroundAnimation::Static,
        }
    }

    /// First gradient stop, if any.
    pub fn leading_color(&self) -> Option<&HexColor> {
        self.colors.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographySpec {
    pub heading_font: String,
    pub body_font: String,
    pub primary_color: HexColor,
    pub secondary_color: HexColor,
}

/// An image placed in a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneImage {
    pub image_id: String,
    pub kind: ImageKind,
    pub role: ImageRole,
    #[serde(default)]
    pub framing: ImageFraming,
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// One timed visual unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub scene_type: SceneType,
    pub intention: MarketingIntention,
    pub phase: NarrativePhase,
    pub rhythm: RhythmDecision,
    pub beats: Vec<Beat>,
    pub duration_frames: Frame,
    pub background: BackgroundSpec,
    pub typography: TypographySpec,
    #[serde(default)]
    pub images: Vec<SceneImage>,
    #[serde(default)]
    pub layout_position: LayoutPosition,
    #[serde(default)]
    pub dominant_motion: MotionDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pattern: Option<ImagePattern>,
    #[serde(default)]
    pub quality_validated: bool,
}

impl Scene {
    pub fn with_beats(&self, beats: Vec<Beat>) -> Scene {
        Scene {
            beats,
            ..self.clone()
        }
    }

    pub fn with_background(&self, background: BackgroundSpec) -> Scene {
        Scene {
            background,
            ..self.clone()
        }
    }

    pub fn with_duration(&self, duration_frames: Frame) -> Scene {
        Scene {
            duration_frames,
            ..self.clone()
        }
    }

    /// Beats that carry content (everything except breathing beats).
    pub fn content_beats(&self) -> impl Iterator<Item = &Beat> {
        self.beats.iter().filter(|b| !b.is_breathing())
    }

    pub fn content_beat_count(&self) -> usize {
        self.content_beats().count()
    }

    /// End frame of the last-ending content beat (0 without content).
    pub fn content_end(&self) -> Frame {
        self.content_beats().map(Beat::end_frame).max().unwrap_or(0)
    }

    /// End frame of the last-ending beat of any kind.
    pub fn beats_end(&self) -> Frame {
        self.beats.iter().map(Beat::end_frame).max().unwrap_or(0)
    }

    pub fn has_breathing(&self) -> bool {
        self.beats.iter().any(Beat::is_breathing)
    }

    /// Total frames spent in breathing beats.
    pub fn breathing_frames(&self) -> Frame {
        self.beats
            .iter()
            .filter(|b| b.is_breathing())
            .fold(0, |total: Frame, b| total.saturating_add(b.duration_frames))
    }

    pub fn is_multi_beat(&self) -> bool {
        self.beats.len() > 1
    }

    /// Whether the scene shows any image, declared or via an image beat.
    pub fn has_images(&self) -> bool {
        !self.images.is_empty() || self.beats.iter().any(|b| b.image_id.is_some())
    }

    /// Number of distinct beat start frames.
    pub fn distinct_start_count(&self) -> usize {
        let mut starts: Vec<Frame> = self.beats.iter().map(|b| b.start_frame).collect();
        starts.sort_unstable();
        starts.dedup();
        starts.len()
    }

    pub fn image(&self, image_id: &str) -> Option<&SceneImage> {
        self.images.iter().find(|i| i.image_id == image_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::color::HexColor;

    /// A plain scene with the given beats and duration.
    pub fn scene(id: &str, scene_type: SceneType, beats: Vec<Beat>, duration: Frame) -> Scene {
        Scene {
            id: id.to_string(),
            scene_type,
            intention: MarketingIntention::Inform,
            phase: NarrativePhase::Development,
            rhythm: RhythmDecision {
                strategy: RhythmStrategy::Cascade,
                pacing: Pacing::Balanced,
                rationale: None,
            },
            beats,
            duration_frames: duration,
            background: BackgroundSpec::flat(HexColor::parse("#101010").unwrap()),
            typography: TypographySpec {
                heading_font: "Inter".to_string(),
                body_font: "Inter".to_string(),
                primary_color: HexColor::parse("#ffffff").unwrap(),
                secondary_color: HexColor::parse("#cccccc").unwrap(),
            },
            images: Vec::new(),
            layout_position: LayoutPosition::Center,
            dominant_motion: MotionDirection::None,
            image_pattern: None,
            quality_validated: false,
        }
    }

    pub fn text_beat(id: &str, action: BeatAction, start: Frame, dur: Frame) -> Beat {
        Beat::new(id, action, start, dur)
            .with_text(format!("{id} text"))
            .with_entry(EntryAnimation::FadeIn, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn parse_kind_accepts_loose_spellings() {
        assert_eq!(parse_kind::<EntryAnimation>("Fade-In"), Some(EntryAnimation::FadeIn));
        assert_eq!(parse_kind::<EntryAnimation>("zoom burst"), Some(EntryAnimation::ZoomBurst));
        assert_eq!(parse_kind::<EntryAnimation>("wobble"), None);
    }

    #[test]
    fn parse_scene_type_aliases() {
        assert_eq!(parse_scene_type("hook"), Some(SceneType::Hook));
        assert_eq!(parse_scene_type("call-to-action"), Some(SceneType::Cta));
        assert_eq!(parse_scene_type("testimonial"), Some(SceneType::Proof));
        assert_eq!(parse_scene_type("outro"), None);
    }

    #[test]
    fn adjacency_is_symmetric() {
        assert!(SceneType::Problem.is_adjacent_to(SceneType::Solution));
        assert!(SceneType::Solution.is_adjacent_to(SceneType::Problem));
        assert!(!SceneType::Hook.is_adjacent_to(SceneType::Cta));
    }

    #[test]
    fn dominant_and_subtle_are_fixed_points_at_extremes() {
        assert_eq!(EntryAnimation::ZoomBurst.dominant(), EntryAnimation::ZoomBurst);
        assert_eq!(EntryAnimation::FadeIn.subtle(), EntryAnimation::FadeIn);
        assert_eq!(EntryAnimation::FadeIn.dominant(), EntryAnimation::ScaleIn);
    }

    #[test]
    fn background_animation_cap() {
        assert_eq!(
            BackgroundAnimation::Pulse.capped_at(MotionIntensity::Low),
            BackgroundAnimation::SubtleDrift
        );
        assert_eq!(
            BackgroundAnimation::SlowPan.capped_at(MotionIntensity::High),
            BackgroundAnimation::SlowPan
        );
    }

    #[test]
    fn scene_helpers() {
        let s = scene(
            "s1",
            SceneType::Hook,
            vec![
                text_beat("a", BeatAction::RevealHeadline, 0, 30),
                Beat::new("b", BeatAction::Breathe, 30, 20),
            ],
            90,
        );
        assert_eq!(s.content_beat_count(), 1);
        assert_eq!(s.content_end(), 30);
        assert_eq!(s.beats_end(), 50);
        assert_eq!(s.breathing_frames(), 20);
        assert!(s.has_breathing());
        assert_eq!(s.distinct_start_count(), 2);
    }

    #[test]
    fn with_beats_leaves_original_untouched() {
        let s = scene("s1", SceneType::Hook, Vec::new(), 90);
        let patched = s.with_beats(vec![Beat::new("x", BeatAction::Accent, 0, 10)]);
        assert!(s.beats.is_empty());
        assert_eq!(patched.beats.len(), 1);
    }

    #[test]
    fn scene_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&SceneType::Cta).unwrap(), "\"CTA\"");
    }
}
