//! Locked palette system: preset selection, brand-color derivation,
//! application to every scene and conformance validation.

use serde::{Deserialize, Serialize};

use crate::color::{builtin, HexColor};
use crate::keywords::best_match;
use crate::profiles::{ProfileTables, VideoStyle};
use crate::scene::{BackgroundSpec, GradientKind, Scene, SceneType, TextureKind};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Base gradient angle in degrees.
pub const BASE_GRADIENT_ANGLE: u16 = 135;

/// Per-scene angle offsets, cycled by scene index.
pub const ANGLE_OFFSETS: [i16; 3] = [-15, 0, 15];

/// Brand colors brighter than this get a dark theme.
pub const BRAND_LUMINANCE_THRESHOLD: f64 = 0.5;

/// Share of the brand color mixed into the derived mid neutral.
pub const BRAND_MID_MIX: f64 = 0.35;

pub const DERIVED_TEXTURE_OPACITY: f32 = 0.05;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteMood {
    Tech,
    Luxury,
    Wellness,
    Energetic,
    Professional,
    /// Derived from a request-provided brand color.
    Brand,
}

/// Whether scene backgrounds sit on the dark or the light neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteTheme {
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeutralTriplet {
    pub dark: HexColor,
    pub mid: HexColor,
    pub light: HexColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextColors {
    pub primary: HexColor,
    pub secondary: HexColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthLayer {
    pub gradient: GradientKind,
    pub texture: TextureKind,
    pub texture_opacity: f32,
    /// Drop-shadow opacity for framed elements.
    pub shadow_opacity: f32,
}

/// Locked color system for a whole video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub name: String,
    pub mood: PaletteMood,
    pub theme: PaletteTheme,
    /// Prompt words that select this palette.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub primary: HexColor,
    pub neutrals: NeutralTriplet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<HexColor>,
    pub text: TextColors,
    pub depth: DepthLayer,
}

impl Palette {
    /// Every color a scene background may use.
    pub fn declared_colors(&self) -> Vec<HexColor> {
        let mut colors = vec![
            self.primary.clone(),
            self.neutrals.dark.clone(),
            self.neutrals.mid.clone(),
            self.neutrals.light.clone(),
        ];
        if let Some(accent) = &self.accent {
            colors.push(accent.clone());
        }
        colors
    }

    pub fn declares(&self, color: &HexColor) -> bool {
        self.primary == *color
            || self.neutrals.dark == *color
            || self.neutrals.mid == *color
            || self.neutrals.light == *color
            || self.accent.as_ref() == Some(color)
    }

    /// The neutral scene backgrounds sit on.
    pub fn base(&self) -> &HexColor {
        match self.theme {
            PaletteTheme::Dark => &self.neutrals.dark,
            PaletteTheme::Light => &self.neutrals.light,
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

struct PresetDef {
    name: &'static str,
    mood: PaletteMood,
    keywords: &'static [&'static str],
    primary: &'static str,
    neutrals: [&'static str; 3],
    accent: Option<&'static str>,
    gradient: GradientKind,
    texture: TextureKind,
    texture_opacity: f32,
}

const PRESETS: &[PresetDef] = &[
    PresetDef {
        name: "tech",
        mood: PaletteMood::Tech,
        keywords: &["tech", "software", "app", "ai", "saas", "digital", "startup", "cloud", "developer"],
        primary: "#2563EB",
        neutrals: ["#0F172A", "#475569", "#F1F5F9"],
        accent: Some("#22D3EE"),
        gradient: GradientKind::Linear,
        texture: TextureKind::Grain,
        texture_opacity: 0.04,
    },
    PresetDef {
        name: "luxury",
        mood: PaletteMood::Luxury,
        keywords: &["luxury", "premium", "elegant", "fashion", "jewelry", "exclusive", "couture"],
        primary: "#C9A227",
        neutrals: ["#0B0B0C", "#3F3A34", "#F5F0E6"],
        accent: Some("#8C1C13"),
        gradient: GradientKind::Radial,
        texture: TextureKind::Noise,
        texture_opacity: 0.05,
    },
    PresetDef {
        name: "wellness",
        mood: PaletteMood::Wellness,
        keywords: &["wellness", "health", "yoga", "organic", "natural", "spa", "mindful", "skincare"],
        primary: "#6B8F71",
        neutrals: ["#1F2A24", "#7C8C80", "#F4F1EA"],
        accent: Some("#E8B4A0"),
        gradient: GradientKind::Linear,
        texture: TextureKind::Paper,
        texture_opacity: 0.06,
    },
    PresetDef {
        name: "energetic",
        mood: PaletteMood::Energetic,
        keywords: &["energetic", "sport", "sports", "fitness", "gaming", "energy", "festival", "music"],
        primary: "#FF5A36",
        neutrals: ["#1A1A2E", "#4A4E69", "#FFF8F0"],
        accent: Some("#FFD23F"),
        gradient: GradientKind::Linear,
        texture: TextureKind::Halftone,
        texture_opacity: 0.05,
    },
    PresetDef {
        name: "professional",
        mood: PaletteMood::Professional,
        keywords: &["corporate", "finance", "consulting", "legal", "b2b", "enterprise", "insurance"],
        primary: "#1E3A8A",
        neutrals: ["#111827", "#6B7280", "#F9FAFB"],
        accent: None,
        gradient: GradientKind::Linear,
        texture: TextureKind::Grain,
        texture_opacity: 0.03,
    },
];

fn preset_from(def: &PresetDef) -> Palette {
    let dark = builtin(def.neutrals[0]);
    let mid = builtin(def.neutrals[1]);
    let light = builtin(def.neutrals[2]);
    Palette {
        name: def.name.to_string(),
        mood: def.mood,
        theme: PaletteTheme::Dark,
        keywords: def.keywords.iter().map(|k| k.to_string()).collect(),
        primary: builtin(def.primary),
        text: TextColors {
            primary: light.clone(),
            secondary: mid.mix(&light, 0.5),
        },
        neutrals: NeutralTriplet { dark, mid, light },
        accent: def.accent.map(builtin),
        depth: DepthLayer {
            gradient: def.gradient,
            texture: def.texture,
            texture_opacity: def.texture_opacity,
            shadow_opacity: 0.35,
        },
    }
}

/// The five built-in preset palettes.
pub fn preset_palettes() -> Vec<Palette> {
    PRESETS.iter().map(preset_from).collect()
}

/// Preset mood used when neither a brand color nor a mood keyword decides.
pub fn default_mood(style: VideoStyle) -> PaletteMood {
    match style {
        VideoStyle::Dynamic => PaletteMood::Energetic,
        VideoStyle::Cinematic => PaletteMood::Luxury,
        VideoStyle::Minimal => PaletteMood::Wellness,
        VideoStyle::Corporate => PaletteMood::Professional,
    }
}

/// Derive a palette from one brand color.
///
/// Bright brand colors get a dark theme, dark ones a light theme; the mid
/// neutral tints the theme's base toward the brand color.
pub fn derive_palette(brand: &HexColor) -> Palette {
    let dark_theme = brand.luminance() > BRAND_LUMINANCE_THRESHOLD;
    let (theme, dark, mid_base, light, text_primary, text_secondary) = if dark_theme {
        (
            PaletteTheme::Dark,
            builtin("#101114"),
            builtin("#101114"),
            builtin("#F5F6F8"),
            builtin("#F5F6F8"),
            builtin("#C9CDD3"),
        )
    } else {
        (
            PaletteTheme::Light,
            builtin("#121417"),
            builtin("#F7F8FA"),
            builtin("#F7F8FA"),
            builtin("#121417"),
            builtin("#4B5563"),
        )
    };
    Palette {
        name: format!("brand-{}", brand.as_str().trim_start_matches('#')),
        mood: PaletteMood::Brand,
        theme,
        keywords: Vec::new(),
        primary: brand.clone(),
        neutrals: NeutralTriplet {
            mid: mid_base.mix(brand, BRAND_MID_MIX),
            dark,
            light,
        },
        accent: None,
        text: TextColors {
            primary: text_primary,
            secondary: text_secondary,
        },
        depth: DepthLayer {
            gradient: GradientKind::Linear,
            texture: TextureKind::Grain,
            texture_opacity: DERIVED_TEXTURE_OPACITY,
            shadow_opacity: 0.3,
        },
    }
}

/// Choose the palette for a request: brand color first, then mood keywords
/// in the prompt, then the style default.
pub fn select_palette(
    tables: &ProfileTables,
    style: VideoStyle,
    prompt: &str,
    brand_color: Option<&HexColor>,
) -> Palette {
    if let Some(brand) = brand_color {
        tracing::debug!(brand = %brand, "Deriving palette from brand color");
        return derive_palette(brand);
    }

    let keyword_sets: Vec<&[String]> = tables.palettes.iter().map(|p| p.keywords.as_slice()).collect();
    if let Some(index) = best_match(prompt, &keyword_sets) {
        let palette = tables.palettes[index].clone();
        tracing::debug!(palette = %palette.name, "Palette selected by mood keywords");
        return palette;
    }

    let mood = default_mood(style);
    tables
        .palettes
        .iter()
        .find(|p| p.mood == mood)
        .or_else(|| tables.palettes.first())
        .cloned()
        .unwrap_or_else(|| preset_from(&PRESETS[PRESETS.len() - 1]))
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Gradient angle for the scene at `index`.
pub fn scene_angle(index: usize) -> u16 {
    let offset = ANGLE_OFFSETS[index % ANGLE_OFFSETS.len()];
    (i32::from(BASE_GRADIENT_ANGLE) + i32::from(offset)) as u16
}

/// Two gradient stops: the theme base plus the primary for emphasis scenes,
/// the mid neutral otherwise.
fn scene_stops(palette: &Palette, scene_type: SceneType) -> Vec<HexColor> {
    let second = match scene_type {
        SceneType::Hook | SceneType::Proof | SceneType::Cta => palette.primary.clone(),
        _ => palette.neutrals.mid.clone(),
    };
    vec![palette.base().clone(), second]
}

/// Rewrite one scene's background and typography colors from `palette`.
/// Background animation is left alone.
pub fn apply_palette_to_scene(scene: &Scene, palette: &Palette, index: usize) -> Scene {
    let mut patched = scene.with_background(BackgroundSpec {
        gradient: palette.depth.gradient,
        colors: scene_stops(palette, scene.scene_type),
        angle: scene_angle(index),
        texture: palette.depth.texture,
        texture_opacity: palette.depth.texture_opacity,
        animation: scene.background.animation,
    });
    patched.typography.primary_color = palette.text.primary.clone();
    patched.typography.secondary_color = palette.text.secondary.clone();
    patched
}

pub fn apply_palette_to_video(scenes: &[Scene], palette: &Palette) -> Vec<Scene> {
    scenes
        .iter()
        .enumerate()
        .map(|(i, s)| apply_palette_to_scene(s, palette, i))
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteField {
    Background,
    TextPrimary,
    TextSecondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteMismatch {
    pub scene_id: String,
    pub field: PaletteField,
    pub color: HexColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteReport {
    pub palette: String,
    pub consistent: bool,
    pub mismatches: Vec<PaletteMismatch>,
}

/// Check every scene against `palette`. Mismatches are reported, not fixed.
pub fn validate_palette_consistency(scenes: &[Scene], palette: &Palette) -> PaletteReport {
    let mut mismatches = Vec::new();
    for scene in scenes {
        for color in &scene.background.colors {
            if !palette.declares(color) {
                mismatches.push(PaletteMismatch {
                    scene_id: scene.id.clone(),
                    field: PaletteField::Background,
                    color: color.clone(),
                });
            }
        }
        if scene.typography.primary_color != palette.text.primary {
            mismatches.push(PaletteMismatch {
                scene_id: scene.id.clone(),
                field: PaletteField::TextPrimary,
                color: scene.typography.primary_color.clone(),
            });
        }
        if scene.typography.secondary_color != palette.text.secondary {
            mismatches.push(PaletteMismatch {
                scene_id: scene.id.clone(),
                field: PaletteField::TextSecondary,
                color: scene.typography.secondary_color.clone(),
            });
        }
    }
    if !mismatches.is_empty() {
        tracing::warn!(
            palette = %palette.name,
            mismatches = mismatches.len(),
            "Palette inconsistencies found"
        );
    }
    PaletteReport {
        palette: palette.name.clone(),
        consistent: mismatches.is_empty(),
        mismatches,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::test_support::scene;

    fn hex(s: &str) -> HexColor {
        HexColor::parse(s).unwrap()
    }

    // -- presets ----------------------------------------------------------------

    #[test]
    fn five_presets_with_expected_primaries() {
        let presets = preset_palettes();
        let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["tech", "luxury", "wellness", "energetic", "professional"]);
        assert_eq!(presets[0].primary, hex("#2563eb"));
        assert!(presets[4].accent.is_none());
        assert_eq!(presets[1].depth.gradient, GradientKind::Radial);
    }

    #[test]
    fn declared_colors_include_accent_when_present() {
        let presets = preset_palettes();
        assert_eq!(presets[0].declared_colors().len(), 5);
        assert_eq!(presets[4].declared_colors().len(), 4);
    }

    // -- select_palette ---------------------------------------------------------

    #[test]
    fn mood_keywords_pick_a_preset() {
        let tables = ProfileTables::default();
        let p = select_palette(&tables, VideoStyle::Corporate, "A yoga retreat for wellness lovers", None);
        assert_eq!(p.mood, PaletteMood::Wellness);
    }

    #[test]
    fn style_default_without_keywords() {
        let tables = ProfileTables::default();
        let p = select_palette(&tables, VideoStyle::Cinematic, "A story about a watch", None);
        assert_eq!(p.mood, PaletteMood::Luxury);
        let p = select_palette(&tables, VideoStyle::Dynamic, "Hello there", None);
        assert_eq!(p.mood, PaletteMood::Energetic);
    }

    #[test]
    fn brand_color_wins_over_keywords() {
        let tables = ProfileTables::default();
        let brand = hex("#ff00aa");
        let p = select_palette(&tables, VideoStyle::Minimal, "tech startup", Some(&brand));
        assert_eq!(p.mood, PaletteMood::Brand);
        assert_eq!(p.primary, brand);
    }

    // -- derive_palette ---------------------------------------------------------

    #[test]
    fn bright_brand_gets_dark_theme() {
        let p = derive_palette(&hex("#ffe066"));
        assert_eq!(p.theme, PaletteTheme::Dark);
        assert_eq!(p.neutrals.dark, hex("#101114"));
        assert_eq!(p.text.primary, hex("#f5f6f8"));
        assert_eq!(p.neutrals.mid, hex("#101114").mix(&hex("#ffe066"), BRAND_MID_MIX));
    }

    #[test]
    fn dark_brand_gets_light_theme() {
        let p = derive_palette(&hex("#1e3a8a"));
        assert_eq!(p.theme, PaletteTheme::Light);
        assert_eq!(p.base(), &hex("#f7f8fa"));
        assert_eq!(p.text.primary, hex("#121417"));
        assert_eq!(p.text.secondary, hex("#4b5563"));
        assert!(p.accent.is_none());
    }

    // -- application --------------------------------------------------------------

    #[test]
    fn angles_cycle_around_base() {
        assert_eq!(scene_angle(0), 120);
        assert_eq!(scene_angle(1), 135);
        assert_eq!(scene_angle(2), 150);
        assert_eq!(scene_angle(3), 120);
    }

    #[test]
    fn applied_video_is_consistent() {
        let palette = preset_palettes().remove(0);
        let scenes = vec![
            scene("s0", SceneType::Hook, Vec::new(), 90),
            scene("s1", SceneType::Feature, Vec::new(), 90),
            scene("s2", SceneType::Cta, Vec::new(), 90),
        ];
        let applied = apply_palette_to_video(&scenes, &palette);
        for s in &applied {
            assert_eq!(s.background.colors.len(), 2);
            assert!(s.background.colors.iter().all(|c| palette.declares(c)));
            assert_eq!(s.background.texture, TextureKind::Grain);
        }
        assert_eq!(applied[0].background.colors[1], palette.primary);
        assert_eq!(applied[1].background.colors[1], palette.neutrals.mid);
        assert!(validate_palette_consistency(&applied, &palette).consistent);
    }

    #[test]
    fn foreign_colors_are_reported() {
        let palette = preset_palettes().remove(0);
        let scenes = vec![scene("s0", SceneType::Hook, Vec::new(), 90)];
        let report = validate_palette_consistency(&scenes, &palette);
        assert!(!report.consistent);
        let fields: Vec<PaletteField> = report.mismatches.iter().map(|m| m.field).collect();
        assert_eq!(
            fields,
            vec![PaletteField::Background, PaletteField::TextPrimary, PaletteField::TextSecondary]
        );
    }
}
