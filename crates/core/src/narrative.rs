//! Narrative arc planning: splits a scene sequence into phases by fixed
//! percentage boundaries.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fraction of the sequence that is opening.
pub const OPENING_FRACTION: f64 = 0.2;
/// Fraction of the sequence that ends development.
pub const DEVELOPMENT_FRACTION: f64 = 0.6;
/// Fraction of the sequence that ends the climax.
pub const CLIMAX_FRACTION: f64 = 0.85;

/// Largest scene count classified as hook-heavy.
pub const HOOK_HEAVY_MAX_SCENES: usize = 4;
/// Largest scene count classified as balanced.
pub const BALANCED_MAX_SCENES: usize = 7;

// ---------------------------------------------------------------------------
// NarrativePhase
// ---------------------------------------------------------------------------

/// Coarse position in the overall narrative arc. Ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativePhase {
    Opening,
    Development,
    Climax,
    Resolution,
}

impl NarrativePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Development => "development",
            Self::Climax => "climax",
            Self::Resolution => "resolution",
        }
    }
}

/// Informational strategy tag derived from the scene count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcStrategy {
    HookHeavy,
    Balanced,
    BuildUp,
}

// ---------------------------------------------------------------------------
// NarrativeArc
// ---------------------------------------------------------------------------

/// Phase boundaries for a sequence of `scene_count` scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseBoundaries {
    pub opening_end: usize,
    pub development_end: usize,
    pub climax_end: usize,
}

/// Phase assignment for a scene sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeArc {
    pub scene_count: usize,
    pub strategy: ArcStrategy,
    pub boundaries: PhaseBoundaries,
    /// `phases[i]` is the phase of scene `i`.
    pub phases: Vec<NarrativePhase>,
}

impl NarrativeArc {
    /// Phase of scene `index`. Indices past the end resolve to the last phase.
    pub fn phase_of(&self, index: usize) -> NarrativePhase {
        self.phases
            .get(index)
            .copied()
            .unwrap_or(NarrativePhase::Resolution)
    }
}

/// Compute the phase boundaries for `n` scenes.
pub fn phase_boundaries(n: usize) -> PhaseBoundaries {
    let n_f = n as f64;
    PhaseBoundaries {
        opening_end: ((OPENING_FRACTION * n_f).floor() as usize).max(1),
        development_end: (DEVELOPMENT_FRACTION * n_f).floor() as usize,
        climax_end: (CLIMAX_FRACTION * n_f).floor() as usize,
    }
}

/// Phase of scene `index` within a sequence of `n` scenes.
///
/// The last scene is always `Resolution` and the first always `Opening`,
/// regardless of how the percentage boundaries fall for tiny `n`.
pub fn phase_for_index(index: usize, n: usize) -> NarrativePhase {
    if n == 0 {
        return NarrativePhase::Opening;
    }
    if index + 1 >= n && n > 1 {
        return NarrativePhase::Resolution;
    }
    let b = phase_boundaries(n);
    if index < b.opening_end {
        NarrativePhase::Opening
    } else if index < b.development_end {
        NarrativePhase::Development
    } else if index < b.climax_end {
        NarrativePhase::Climax
    } else {
        NarrativePhase::Resolution
    }
}

/// Classify the overall strategy from the scene count.
pub fn classify_strategy(n: usize) -> ArcStrategy {
    if n <= HOOK_HEAVY_MAX_SCENES {
        ArcStrategy::HookHeavy
    } else if n <= BALANCED_MAX_SCENES {
        ArcStrategy::Balanced
    } else {
        ArcStrategy::BuildUp
    }
}

/// Plan the narrative arc for `n` scenes.
pub fn plan_arc(n: usize) -> NarrativeArc {
    NarrativeArc {
        scene_count: n,
        strategy: classify_strategy(n),
        boundaries: phase_boundaries(n),
        phases: (0..n).map(|i| phase_for_index(i, n)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use NarrativePhase::*;

    #[test]
    fn four_scene_arc() {
        let arc = plan_arc(4);
        assert_eq!(
            arc.boundaries,
            PhaseBoundaries {
                opening_end: 1,
                development_end: 2,
                climax_end: 3
            }
        );
        assert_eq!(arc.phases, vec![Opening, Development, Climax, Resolution]);
        assert_eq!(arc.strategy, ArcStrategy::HookHeavy);
    }

    #[test]
    fn single_scene_is_opening() {
        // With one scene the first-scene rule wins; there is no distinct last scene.
        assert_eq!(plan_arc(1).phases, vec![Opening]);
    }

    #[test]
    fn two_scenes_open_and_resolve() {
        assert_eq!(plan_arc(2).phases, vec![Opening, Resolution]);
    }

    #[test]
    fn first_and_last_hold_for_all_sizes() {
        for n in 2..40 {
            let arc = plan_arc(n);
            assert_eq!(arc.phases[0], Opening, "n={n}");
            assert_eq!(arc.phases[n - 1], Resolution, "n={n}");
        }
    }

    #[test]
    fn phases_are_monotonic() {
        for n in 1..40 {
            let arc = plan_arc(n);
            for w in arc.phases.windows(2) {
                assert!(w[0] <= w[1], "n={n}: {:?}", arc.phases);
            }
        }
    }

    #[test]
    fn ten_scene_arc() {
        let arc = plan_arc(10);
        assert_eq!(
            arc.phases,
            vec![
                Opening,
                Opening,
                Development,
                Development,
                Development,
                Development,
                Climax,
                Climax,
                Resolution,
                Resolution
            ]
        );
        assert_eq!(arc.strategy, ArcStrategy::BuildUp);
    }

    #[test]
    fn strategy_thresholds() {
        assert_eq!(classify_strategy(4), ArcStrategy::HookHeavy);
        assert_eq!(classify_strategy(5), ArcStrategy::Balanced);
        assert_eq!(classify_strategy(7), ArcStrategy::Balanced);
        assert_eq!(classify_strategy(8), ArcStrategy::BuildUp);
    }

    #[test]
    fn phase_of_past_end_is_resolution() {
        assert_eq!(plan_arc(3).phase_of(9), Resolution);
    }
}
