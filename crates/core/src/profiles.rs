//! Immutable profile tables: style pacing, phase tempo, palettes,
//! breathing presets and image-presentation patterns.
//!
//! Every component receives a `&ProfileTables` explicitly. The built-in
//! tables come from [`ProfileTables::default`]; tests substitute their own.

use serde::{Deserialize, Serialize};

use crate::breathing::BreathingPresetTable;
use crate::narrative::NarrativePhase;
use crate::palette::{preset_palettes, Palette};
use crate::types::Frame;
use crate::visual_flow::{default_pattern_rules, ImagePatternRule};

// ---------------------------------------------------------------------------
// Closed style vocabulary
// ---------------------------------------------------------------------------

/// Pacing/visual-density archetype. Exactly one is active per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStyle {
    Dynamic,
    Cinematic,
    Minimal,
    Corporate,
}

impl VideoStyle {
    /// Declaration order; also the tie-break order for style detection.
    pub const ALL: &'static [VideoStyle] = &[
        VideoStyle::Dynamic,
        VideoStyle::Cinematic,
        VideoStyle::Minimal,
        VideoStyle::Corporate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Cinematic => "cinematic",
            Self::Minimal => "minimal",
            Self::Corporate => "corporate",
        }
    }

    /// Parse a style tag, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamic" => Some(Self::Dynamic),
            "cinematic" => Some(Self::Cinematic),
            "minimal" => Some(Self::Minimal),
            "corporate" => Some(Self::Corporate),
            _ => None,
        }
    }
}

impl std::fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pacing descriptor consumed by the beat timing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    Fast,
    Calm,
    #[default]
    Balanced,
}

/// Ordered motion intensity; `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionIntensity {
    Low,
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// Ranges
// ---------------------------------------------------------------------------

/// Inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub min: Frame,
    pub max: Frame,
}

impl FrameRange {
    pub const fn new(min: Frame, max: Frame) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Frame) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: Frame) -> Frame {
        value.clamp(self.min, self.max.max(self.min))
    }
}

/// Inclusive beat-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatRange {
    pub min: usize,
    pub max: usize,
}

impl BeatRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: usize) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

// ---------------------------------------------------------------------------
// StyleProfile
// ---------------------------------------------------------------------------

/// Pacing targets for one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    pub style: VideoStyle,
    pub pacing: Pacing,
    /// Frames per beat.
    pub base_rhythm_frames: Frame,
    pub beats_per_scene: BeatRange,
    pub motion: MotionIntensity,
    pub scene_duration: FrameRange,
    /// Length of the default fade-in applied when a beat lacks an entry.
    pub entry_fade_frames: Frame,
    /// Scene count requested from the text generator.
    pub target_scene_count: usize,
    /// Multiplier applied to phase tempo durations.
    pub tempo_duration_scale: f64,
    /// Adjustment applied to the phase tempo beat maximum.
    pub tempo_beat_delta: i32,
}

/// One [`StyleProfile`] per style; lookup is exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTable {
    pub dynamic: StyleProfile,
    pub cinematic: StyleProfile,
    pub minimal: StyleProfile,
    pub corporate: StyleProfile,
}

impl StyleTable {
    pub fn get(&self, style: VideoStyle) -> &StyleProfile {
        match style {
            VideoStyle::Dynamic => &self.dynamic,
            VideoStyle::Cinematic => &self.cinematic,
            VideoStyle::Minimal => &self.minimal,
            VideoStyle::Corporate => &self.corporate,
        }
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            dynamic: StyleProfile {
                style: VideoStyle::Dynamic,
                pacing: Pacing::Fast,
                base_rhythm_frames: 8,
                beats_per_scene: BeatRange::new(3, 6),
                motion: MotionIntensity::High,
                scene_duration: FrameRange::new(45, 120),
                entry_fade_frames: 6,
                target_scene_count: 6,
                tempo_duration_scale: 0.75,
                tempo_beat_delta: 1,
            },
            cinematic: StyleProfile {
                style: VideoStyle::Cinematic,
                pacing: Pacing::Calm,
                base_rhythm_frames: 20,
                beats_per_scene: BeatRange::new(2, 4),
                motion: MotionIntensity::Medium,
                scene_duration: FrameRange::new(90, 210),
                entry_fade_frames: 18,
                target_scene_count: 5,
                tempo_duration_scale: 1.25,
                tempo_beat_delta: 0,
            },
            minimal: StyleProfile {
                style: VideoStyle::Minimal,
                pacing: Pacing::Calm,
                base_rhythm_frames: 24,
                beats_per_scene: BeatRange::new(1, 3),
                motion: MotionIntensity::Low,
                scene_duration: FrameRange::new(75, 180),
                entry_fade_frames: 15,
                target_scene_count: 4,
                tempo_duration_scale: 1.1,
                tempo_beat_delta: -1,
            },
            corporate: StyleProfile {
                style: VideoStyle::Corporate,
                pacing: Pacing::Balanced,
                base_rhythm_frames: 14,
                beats_per_scene: BeatRange::new(2, 5),
                motion: MotionIntensity::Medium,
                scene_duration: FrameRange::new(60, 165),
                entry_fade_frames: 10,
                target_scene_count: 5,
                tempo_duration_scale: 1.0,
                tempo_beat_delta: 0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tempo
// ---------------------------------------------------------------------------

/// Style-independent tempo baseline for one narrative phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTempo {
    pub beats: BeatRange,
    pub duration: FrameRange,
    pub motion: MotionIntensity,
    pub idle_allowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTempoTable {
    pub opening: PhaseTempo,
    pub development: PhaseTempo,
    pub climax: PhaseTempo,
    pub resolution: PhaseTempo,
}

impl PhaseTempoTable {
    pub fn get(&self, phase: NarrativePhase) -> &PhaseTempo {
        match phase {
            NarrativePhase::Opening => &self.opening,
            NarrativePhase::Development => &self.development,
            NarrativePhase::Climax => &self.climax,
            NarrativePhase::Resolution => &self.resolution,
        }
    }
}

impl Default for PhaseTempoTable {
    fn default() -> Self {
        Self {
            opening: PhaseTempo {
                beats: BeatRange::new(2, 3),
                duration: FrameRange::new(45, 90),
                motion: MotionIntensity::High,
                idle_allowed: false,
            },
            development: PhaseTempo {
                beats: BeatRange::new(2, 4),
                duration: FrameRange::new(75, 150),
                motion: MotionIntensity::Medium,
                idle_allowed: true,
            },
            climax: PhaseTempo {
                beats: BeatRange::new(3, 5),
                duration: FrameRange::new(60, 120),
                motion: MotionIntensity::High,
                idle_allowed: false,
            },
            resolution: PhaseTempo {
                beats: BeatRange::new(1, 3),
                duration: FrameRange::new(75, 150),
                motion: MotionIntensity::Low,
                idle_allowed: true,
            },
        }
    }
}

/// Pacing target for one `(phase, style)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoProfile {
    pub phase: NarrativePhase,
    pub style: VideoStyle,
    pub beats: BeatRange,
    pub duration: FrameRange,
    pub motion: MotionIntensity,
    pub idle_allowed: bool,
}

// ---------------------------------------------------------------------------
// ProfileTables
// ---------------------------------------------------------------------------

/// All configuration tables, loaded once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileTables {
    pub styles: StyleTable,
    pub phase_tempo: PhaseTempoTable,
    pub palettes: Vec<Palette>,
    pub breathing: BreathingPresetTable,
    pub image_patterns: Vec<ImagePatternRule>,
}

impl Default for ProfileTables {
    fn default() -> Self {
        Self {
            styles: StyleTable::default(),
            phase_tempo: PhaseTempoTable::default(),
            palettes: preset_palettes(),
            breathing: BreathingPresetTable::default(),
            image_patterns: default_pattern_rules(),
        }
    }
}

impl ProfileTables {
    pub fn style(&self, style: VideoStyle) -> &StyleProfile {
        self.styles.get(style)
    }

    /// Resolve the tempo profile for a `(phase, style)` pair.
    ///
    /// Phase durations are scaled by the style and clamped into the style's
    /// scene-duration band; the beat maximum shifts by the style delta but
    /// never drops below the minimum; motion is capped by the style.
    pub fn tempo_for(&self, phase: NarrativePhase, style: VideoStyle) -> TempoProfile {
        let base = self.phase_tempo.get(phase);
        let profile = self.style(style);
        let band = profile.scene_duration;

        let scale = |f: Frame| (f64::from(f) * profile.tempo_duration_scale).round() as Frame;
        let max = band.clamp(scale(base.duration.max));
        let min = band.clamp(scale(base.duration.min)).min(max);

        let beat_min = base.beats.min.max(1);
        let beat_max = (base.beats.max as i64 + i64::from(profile.tempo_beat_delta))
            .max(beat_min as i64) as usize;

        TempoProfile {
            phase,
            style,
            beats: BeatRange::new(beat_min, beat_max),
            duration: FrameRange::new(min, max),
            motion: base.motion.min(profile.motion),
            idle_allowed: base.idle_allowed,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
