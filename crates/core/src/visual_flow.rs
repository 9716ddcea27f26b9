//! Image-presentation patterns per scene and the video-level flow report.

use serde::{Deserialize, Serialize};

use crate::scene::{ImageKind, ImageRole, Scene};
use crate::transition::{PlannedTransition, TransitionKind};

/// Scenes with at least this many images prefer a collage.
pub const COLLAGE_MIN_IMAGES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImagePattern {
    FullBleed,
    FloatingCard,
    SplitScreen,
    DeviceMockup,
    Collage,
    Spotlight,
}

impl ImagePattern {
    pub const ALL: &'static [ImagePattern] = &[
        ImagePattern::FullBleed,
        ImagePattern::FloatingCard,
        ImagePattern::SplitScreen,
        ImagePattern::DeviceMockup,
        ImagePattern::Collage,
        ImagePattern::Spotlight,
    ];
}

/// Preferred patterns for one image kind, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePatternRule {
    pub kind: ImageKind,
    pub patterns: Vec<ImagePattern>,
}

pub fn default_pattern_rules() -> Vec<ImagePatternRule> {
    use ImagePattern::*;
    let rule = |kind, patterns: &[ImagePattern]| ImagePatternRule {
        kind,
        patterns: patterns.to_vec(),
    };
    vec![
        rule(ImageKind::Product, &[FloatingCard, Spotlight, SplitScreen]),
        rule(ImageKind::Logo, &[Spotlight, FloatingCard]),
        rule(ImageKind::Lifestyle, &[FullBleed, SplitScreen, Collage]),
        rule(ImageKind::Screenshot, &[DeviceMockup, FloatingCard]),
        rule(ImageKind::Person, &[SplitScreen, FullBleed, Spotlight]),
        rule(ImageKind::Background, &[FullBleed]),
    ]
}

/// Kind of the image that leads the scene: the hero if any, else the first.
fn leading_kind(scene: &Scene) -> Option<ImageKind> {
    scene
        .images
        .iter()
        .find(|i| i.role == ImageRole::Hero)
        .or_else(|| scene.images.first())
        .map(|i| i.kind)
}

fn candidates(scene: &Scene, rules: &[ImagePatternRule]) -> Vec<ImagePattern> {
    let mut out = Vec::new();
    if scene.images.len() >= COLLAGE_MIN_IMAGES {
        out.push(ImagePattern::Collage);
    }
    if let Some(kind) = leading_kind(scene) {
        if let Some(rule) = rules.iter().find(|r| r.kind == kind) {
            out.extend(rule.patterns.iter().copied());
        }
    }
    out.extend(ImagePattern::ALL.iter().copied());
    out
}

/// Give every scene with images a pattern, never repeating the previous
/// scene's pattern. Image-less scenes get none.
pub fn assign_image_patterns(scenes: &[Scene], rules: &[ImagePatternRule]) -> Vec<Scene> {
    let mut previous: Option<ImagePattern> = None;
    scenes
        .iter()
        .map(|scene| {
            let mut patched = scene.clone();
            patched.image_pattern = if scene.images.is_empty() {
                None
            } else {
                candidates(scene, rules)
                    .into_iter()
                    .find(|p| Some(*p) != previous)
            };
            previous = patched.image_pattern;
            patched
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualFlowReport {
    /// Mean continuity score over adjacent pairs; 100 with fewer than two scenes.
    pub coherence_score: u8,
    /// Distinct patterns in order of first use.
    pub patterns_used: Vec<ImagePattern>,
    /// Distinct transition kinds in order of first use.
    pub transitions_used: Vec<TransitionKind>,
}

pub fn build_visual_flow_report(scenes: &[Scene], transitions: &[PlannedTransition]) -> VisualFlowReport {
    let coherence_score = if transitions.is_empty() {
        100
    } else {
        let total: u32 = transitions.iter().map(|t| u32::from(t.continuity_score)).sum();
        (f64::from(total) / transitions.len() as f64).round() as u8
    };

    let mut patterns_used = Vec::new();
    for pattern in scenes.iter().filter_map(|s| s.image_pattern) {
        if !patterns_used.contains(&pattern) {
            patterns_used.push(pattern);
        }
    }

    let mut transitions_used = Vec::new();
    for kind in transitions.iter().map(|t| t.spec.kind) {
        if !transitions_used.contains(&kind) {
            transitions_used.push(kind);
        }
    }

    VisualFlowReport {
        coherence_score,
        patterns_used,
        transitions_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::VideoStyle;
    use crate::scene::test_support::scene;
    use crate::scene::{ImageFraming, SceneImage, SceneType};
    use crate::transition::plan_transitions;

    fn with_image(id: &str, kind: ImageKind) -> Scene {
        let mut s = scene(id, SceneType::Feature, Vec::new(), 90);
        s.images.push(SceneImage {
            image_id: format!("{id}-img"),
            kind,
            role: ImageRole::Hero,
            framing: ImageFraming::Card,
        });
        s
    }

    #[test]
    fn product_scenes_alternate_patterns() {
        let scenes = vec![
            with_image("a", ImageKind::Product),
            with_image("b", ImageKind::Product),
            with_image("c", ImageKind::Product),
        ];
        let out = assign_image_patterns(&scenes, &default_pattern_rules());
        let patterns: Vec<_> = out.iter().map(|s| s.image_pattern).collect();
        assert_eq!(
            patterns,
            vec![
                Some(ImagePattern::FloatingCard),
                Some(ImagePattern::Spotlight),
                Some(ImagePattern::FloatingCard)
            ]
        );
    }

    #[test]
    fn single_option_kind_falls_back_without_repeat() {
        let scenes = vec![
            with_image("a", ImageKind::Background),
            with_image("b", ImageKind::Background),
        ];
        let out = assign_image_patterns(&scenes, &default_pattern_rules());
        assert_eq!(out[0].image_pattern, Some(ImagePattern::FullBleed));
        assert_ne!(out[1].image_pattern, out[0].image_pattern);
    }

    #[test]
    fn image_less_scene_has_no_pattern() {
        let scenes = vec![scene("a", SceneType::Hook, Vec::new(), 90)];
        let out = assign_image_patterns(&scenes, &default_pattern_rules());
        assert_eq!(out[0].image_pattern, None);
    }

    #[test]
    fn many_images_prefer_collage() {
        let mut s = with_image("a", ImageKind::Product);
        for i in 0..2 {
            s.images.push(SceneImage {
                image_id: format!("extra{i}"),
                kind: ImageKind::Lifestyle,
                role: ImageRole::Supporting,
                framing: ImageFraming::None,
            });
        }
        let out = assign_image_patterns(&[s], &default_pattern_rules());
        assert_eq!(out[0].image_pattern, Some(ImagePattern::Collage));
    }

    #[test]
    fn single_scene_is_fully_coherent() {
        let report = build_visual_flow_report(&[scene("a", SceneType::Hook, Vec::new(), 90)], &[]);
        assert_eq!(report.coherence_score, 100);
        assert!(report.transitions_used.is_empty());
    }

    #[test]
    fn report_averages_scores_and_dedups_kinds() {
        let scenes: Vec<Scene> = (0..3)
            .map(|i| scene(&format!("s{i}"), SceneType::Feature, Vec::new(), 90))
            .collect();
        let transitions = plan_transitions(&scenes, VideoStyle::Corporate, 0);
        let report = build_visual_flow_report(&scenes, &transitions);
        // Identical feature scenes: 30 + 25 + 20 + 15, no type adjacency.
        assert_eq!(report.coherence_score, 90);
        assert_eq!(report.transitions_used, vec![TransitionKind::SeamlessBlend]);
    }
}
