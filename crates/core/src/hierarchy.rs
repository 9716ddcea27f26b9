//! Visual hierarchy: weight every candidate element, assign focus roles and
//! rebalance scenes whose elements compete for attention.

use serde::{Deserialize, Serialize};

use crate::scene::{Beat, BeatAction, Emphasis, EntryAnimation, EntrySpec, ImageRole, Scene};
use crate::types::Frame;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum weight for a secondary element.
pub const SECONDARY_THRESHOLD: f64 = 50.0;
/// Minimum weight gap between the primary and the top secondary.
pub const MIN_PRIMARY_GAP: f64 = 15.0;
pub const MAX_SECONDARY: usize = 2;

pub const FIRST_TO_APPEAR_BONUS: f64 = 10.0;
pub const DOMINANT_EMPHASIS_BONUS: f64 = 10.0;
pub const SUBDUED_BASE_FACTOR: f64 = 0.6;

/// Start delay applied to demoted competitors.
pub const DEMOTION_DELAY_FRAMES: Frame = 12;
/// Entry length multiplier applied to demoted competitors.
pub const DEMOTION_ENTRY_FACTOR: f64 = 1.5;
/// Entry length used when a demoted beat had no entry.
pub const DEFAULT_DEMOTED_ENTRY_FRAMES: Frame = 15;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

pub fn action_weight(action: BeatAction) -> f64 {
    match action {
        BeatAction::RevealHeadline => 70.0,
        BeatAction::ShowCta => 65.0,
        BeatAction::ShowStat => 60.0,
        BeatAction::RevealSubtext => 45.0,
        BeatAction::ShowImage => 50.0,
        BeatAction::Accent => 20.0,
        BeatAction::Breathe => 0.0,
    }
}

pub fn image_role_weight(role: ImageRole) -> f64 {
    match role {
        ImageRole::Hero => 80.0,
        ImageRole::Product => 75.0,
        ImageRole::Supporting => 50.0,
        ImageRole::Logo => 40.0,
        ImageRole::Accent => 30.0,
        ImageRole::Background => 15.0,
    }
}

pub fn entry_bonus(entry: Option<EntryAnimation>) -> f64 {
    match entry {
        Some(EntryAnimation::ZoomBurst) => 20.0,
        Some(EntryAnimation::Bounce) => 15.0,
        Some(EntryAnimation::ScaleIn) => 12.0,
        Some(
            EntryAnimation::SlideUp
            | EntryAnimation::SlideDown
            | EntryAnimation::SlideLeft
            | EntryAnimation::SlideRight,
        ) => 8.0,
        Some(EntryAnimation::MaskReveal) => 8.0,
        Some(EntryAnimation::TypeOn) => 6.0,
        Some(EntryAnimation::BlurIn) => 5.0,
        Some(EntryAnimation::FadeIn) => 3.0,
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A candidate element: a beat, or an image no beat reveals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementRef {
    Beat { beat_id: String },
    Image { image_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyRole {
    Primary,
    Secondary,
    Ambient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementWeight {
    pub element: ElementRef,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyIssue {
    NoPrimary,
    InsufficientGap { primary: f64, secondary: f64 },
    TooManyCompetitors { count: usize },
}

/// Focus-role assignment for one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchySpec {
    pub scene_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<ElementWeight>,
    pub secondary: Vec<ElementWeight>,
    pub ambient: Vec<ElementWeight>,
    pub valid: bool,
    pub issues: Vec<HierarchyIssue>,
    /// Whether the enforcer changed the scene.
    #[serde(default)]
    pub repaired: bool,
}

impl HierarchySpec {
    pub fn role_of(&self, element: &ElementRef) -> Option<HierarchyRole> {
        if self.primary.as_ref().is_some_and(|p| &p.element == element) {
            return Some(HierarchyRole::Primary);
        }
        if self.secondary.iter().any(|e| &e.element == element) {
            return Some(HierarchyRole::Secondary);
        }
        if self.ambient.iter().any(|e| &e.element == element) {
            return Some(HierarchyRole::Ambient);
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn beat_weight(beat: &Beat, scene: &Scene, first: bool) -> f64 {
    let base = match beat.image_id.as_deref() {
        Some(id) if beat.text.is_none() => scene
            .image(id)
            .map(|img| image_role_weight(img.role))
            .unwrap_or_else(|| action_weight(BeatAction::ShowImage)),
        _ => action_weight(beat.action),
    };
    let mut weight = match beat.emphasis {
        Emphasis::Subdued => base * SUBDUED_BASE_FACTOR,
        Emphasis::Dominant => base + DOMINANT_EMPHASIS_BONUS,
        Emphasis::Normal => base,
    };
    weight += entry_bonus(beat.entry.map(|e| e.kind));
    if first {
        weight += FIRST_TO_APPEAR_BONUS;
    }
    weight
}

/// Weight every candidate element of `scene`, in scene order.
///
/// The first-to-appear bonus goes to the earliest-starting beat (the first
/// in list order on ties). Images not revealed by any beat weigh by role
/// alone.
pub fn element_weights(scene: &Scene) -> Vec<ElementWeight> {
    let first_index = scene
        .beats
        .iter()
        .enumerate()
        .min_by_key(|(i, b)| (b.start_frame, *i))
        .map(|(i, _)| i);

    let mut weights: Vec<ElementWeight> = scene
        .beats
        .iter()
        .enumerate()
        .map(|(i, beat)| ElementWeight {
            element: ElementRef::Beat {
                beat_id: beat.id.clone(),
            },
            weight: beat_weight(beat, scene, Some(i) == first_index),
        })
        .collect();

    for image in &scene.images {
        let revealed = scene
            .beats
            .iter()
            .any(|b| b.image_id.as_deref() == Some(image.image_id.as_str()));
        if !revealed {
            weights.push(ElementWeight {
                element: ElementRef::Image {
                    image_id: image.image_id.clone(),
                },
                weight: image_role_weight(image.role),
            });
        }
    }
    weights
}

/// Assign roles from raw weights and validate the result.
pub fn assign_roles(scene_id: &str, mut weights: Vec<ElementWeight>) -> HierarchySpec {
    weights.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    let mut iter = weights.into_iter();
    let primary = iter.next();

    let mut secondary = Vec::new();
    let mut ambient = Vec::new();
    let mut competitors = 0;
    for element in iter {
        if element.weight >= SECONDARY_THRESHOLD {
            competitors += 1;
            if secondary.len() < MAX_SECONDARY {
                secondary.push(element);
                continue;
            }
        }
        ambient.push(element);
    }

    let mut issues = Vec::new();
    match &primary {
        None => issues.push(HierarchyIssue::NoPrimary),
        Some(p) => {
            if let Some(top) = secondary.first() {
                if p.weight - top.weight < MIN_PRIMARY_GAP {
                    issues.push(HierarchyIssue::InsufficientGap {
                        primary: p.weight,
                        secondary: top.weight,
                    });
                }
            }
        }
    }
    if competitors > MAX_SECONDARY {
        issues.push(HierarchyIssue::TooManyCompetitors { count: competitors });
    }

    HierarchySpec {
        scene_id: scene_id.to_string(),
        primary,
        secondary,
        ambient,
        valid: issues.is_empty(),
        issues,
        repaired: false,
    }
}

/// Compute the hierarchy of a scene. A scene with no beats and no images
/// has no primary and is reported invalid.
pub fn compute_hierarchy(scene: &Scene) -> HierarchySpec {
    assign_roles(&scene.id, element_weights(scene))
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

fn beat_id(element: &ElementRef) -> Option<&str> {
    match element {
        ElementRef::Beat { beat_id } => Some(beat_id),
        ElementRef::Image { .. } => None,
    }
}

fn position_of(beats: &[Beat], id: &str) -> Option<usize> {
    beats.iter().position(|b| b.id == id)
}

fn demote(beat: &mut Beat, scene_duration: Frame) {
    let latest_start = scene_duration.saturating_sub(1);
    beat.start_frame = (beat.start_frame + DEMOTION_DELAY_FRAMES).min(latest_start.max(beat.start_frame));
    let length = beat
        .entry
        .map(|e| (f64::from(e.duration_frames) * DEMOTION_ENTRY_FACTOR).round() as Frame)
        .unwrap_or(DEFAULT_DEMOTED_ENTRY_FRAMES);
    beat.entry = Some(EntrySpec {
        kind: EntryAnimation::FadeIn,
        duration_frames: length,
    });
    beat.emphasis = Emphasis::Subdued;
}

/// Rebalance a scene whose hierarchy is invalid and return the recomputed
/// spec. Valid scenes are returned unchanged.
///
/// - Insufficient gap: the primary beat gets its dominant entry and dominant
///   emphasis; every secondary beat gets its subtle entry.
/// - Too many competitors: the excess is delayed, given a longer fade-in and
///   subdued.
pub fn enforce_hierarchy(scene: &Scene) -> (Scene, HierarchySpec) {
    let spec = compute_hierarchy(scene);
    if spec.valid {
        return (scene.clone(), spec);
    }

    let mut beats = scene.beats.clone();

    for issue in &spec.issues {
        match issue {
            HierarchyIssue::InsufficientGap { .. } => {
                if let Some(id) = spec.primary.as_ref().and_then(|p| beat_id(&p.element)) {
                    if let Some(i) = position_of(&beats, id) {
                        let beat = &mut beats[i];
                        if let Some(entry) = beat.entry.as_mut() {
                            entry.kind = entry.kind.dominant();
                        } else {
                            beat.entry = Some(EntrySpec {
                                kind: EntryAnimation::ScaleIn,
                                duration_frames: DEFAULT_DEMOTED_ENTRY_FRAMES,
                            });
                        }
                        beat.emphasis = Emphasis::Dominant;
                    }
                }
                for element in &spec.secondary {
                    if let Some(i) = beat_id(&element.element).and_then(|id| position_of(&beats, id)) {
                        if let Some(entry) = beats[i].entry.as_mut() {
                            entry.kind = entry.kind.subtle();
                        }
                    }
                }
            }
            HierarchyIssue::TooManyCompetitors { .. } => {
                let excess = spec
                    .ambient
                    .iter()
                    .filter(|e| e.weight >= SECONDARY_THRESHOLD)
                    .filter_map(|e| beat_id(&e.element));
                for id in excess {
                    if let Some(i) = position_of(&beats, id) {
                        demote(&mut beats[i], scene.duration_frames);
                    }
                }
            }
            HierarchyIssue::NoPrimary => {}
        }
    }

    let repaired_scene = scene.with_beats(beats);
    let mut after = compute_hierarchy(&repaired_scene);
    after.repaired = repaired_scene != *scene;
    if after.valid {
        tracing::debug!(scene_id = %scene.id, "Hierarchy repaired");
    } else {
        tracing::warn!(
            scene_id = %scene.id,
            issues = after.issues.len(),
            "Hierarchy issues remain after repair"
        );
    }
    (repaired_scene, after)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
