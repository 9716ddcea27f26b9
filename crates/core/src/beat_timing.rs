//! Beat timing engine.
//!
//! Produces non-degenerate start/duration pairs for a scene's beats from its
//! pacing, and repairs beat lists whose members all share one start frame.

use serde::{Deserialize, Serialize};

use crate::profiles::Pacing;
use crate::scene::{Beat, Scene};
use crate::types::Frame;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Frames left empty before a lone beat.
pub const LEAD_PAD_FRAMES: Frame = 6;
/// Frames left empty after a lone beat.
pub const TRAIL_PAD_FRAMES: Frame = 6;
/// Fast pacing: each beat starts at this fraction of the previous beat's length.
pub const FAST_OVERLAP_FACTOR: f64 = 0.7;
/// Balanced pacing: beats are spaced at this fraction of `duration / count`.
pub const BALANCED_SPACING_FACTOR: f64 = 0.85;
/// Shortest span any beat is given.
pub const MIN_BEAT_FRAMES: Frame = 1;

// ---------------------------------------------------------------------------
// Timing computation
// ---------------------------------------------------------------------------

/// Start and length of one beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatTiming {
    pub start_frame: Frame,
    pub duration_frames: Frame,
}

fn round_frames(value: f64) -> Frame {
    if value <= 0.0 {
        0
    } else {
        value.round() as Frame
    }
}

/// Compute start/duration pairs for `beat_count` beats in a scene of
/// `duration` frames.
///
/// - **Fast**: beat length `L = D / (0.7 (n - 1) + 1)`, beat `i` starts at `0.7 i L`.
/// - **Calm**: spacing `s = D / (n + 1)`, beat `i` starts at `s i + s / 2`, lasts `s`.
/// - **Balanced**: slot `D / n`, beat `i` starts at `0.85 i D / n`, lasts one slot.
/// - A single beat spans the scene minus the lead and trail pads.
///
/// Starts are strictly increasing and no beat ends past `duration` when
/// `duration` leaves room for it. Returns an empty list for zero beats.
pub fn compute_beat_timings(beat_count: usize, duration: Frame, pacing: Pacing) -> Vec<BeatTiming> {
    if beat_count == 0 {
        return Vec::new();
    }

    if beat_count == 1 {
        let padded = duration.saturating_sub(LEAD_PAD_FRAMES + TRAIL_PAD_FRAMES);
        let start = if padded > 0 { LEAD_PAD_FRAMES } else { 0 };
        let length = if padded > 0 { padded } else { duration };
        return vec![BeatTiming {
            start_frame: start,
            duration_frames: length.max(MIN_BEAT_FRAMES),
        }];
    }

    let n = beat_count as f64;
    let d = f64::from(duration);
    let raw: Vec<(f64, f64)> = match pacing {
        Pacing::Fast => {
            let length = d / (FAST_OVERLAP_FACTOR * (n - 1.0) + 1.0);
            (0..beat_count)
                .map(|i| (i as f64 * FAST_OVERLAP_FACTOR * length, length))
                .collect()
        }
        Pacing::Calm => {
            let spacing = d / (n + 1.0);
            (0..beat_count)
                .map(|i| (spacing * i as f64 + spacing / 2.0, spacing))
                .collect()
        }
        Pacing::Balanced => {
            let slot = d / n;
            (0..beat_count)
                .map(|i| (i as f64 * BALANCED_SPACING_FACTOR * slot, slot))
                .collect()
        }
    };

    let mut timings = Vec::with_capacity(beat_count);
    let mut previous: Option<Frame> = None;
    for (start, length) in raw {
        let mut start_frame = round_frames(start);
        if let Some(prev) = previous {
            start_frame = start_frame.max(prev + 1);
        }
        let mut duration_frames = round_frames(length).max(MIN_BEAT_FRAMES);
        if start_frame < duration && start_frame + duration_frames > duration {
            duration_frames = duration - start_frame;
        }
        previous = Some(start_frame);
        timings.push(BeatTiming {
            start_frame,
            duration_frames: duration_frames.max(MIN_BEAT_FRAMES),
        });
    }
    timings
}

/// Re-time a scene's content beats from its pacing and duration.
///
/// Breathing beats keep their placement; the breathing injector owns them.
pub fn retime_scene(scene: &Scene) -> Scene {
    let content_count = scene.content_beat_count();
    let timings = compute_beat_timings(content_count, scene.duration_frames, scene.rhythm.pacing);
    let mut next = timings.iter();
    let beats = scene
        .beats
        .iter()
        .map(|beat| {
            if beat.is_breathing() {
                return beat.clone();
            }
            match next.next() {
                Some(t) => beat.clone().with_timing(t.start_frame, t.duration_frames),
                None => beat.clone(),
            }
        })
        .collect();
    scene.with_beats(beats)
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// Whether every beat in a multi-beat list starts on the same frame.
pub fn all_share_start(beats: &[Beat]) -> bool {
    match beats.split_first() {
        Some((first, rest)) if !rest.is_empty() => {
            rest.iter().all(|b| b.start_frame == first.start_frame)
        }
        _ => false,
    }
}

/// Spread beats that all share one start evenly across `duration`.
///
/// Beat `i` of `n` starts at `i * (duration / n)` and lasts `duration / n`.
/// Lists that already progress are returned unchanged.
pub fn spread_simultaneous_beats(beats: &[Beat], duration: Frame) -> Vec<Beat> {
    if !all_share_start(beats) {
        return beats.to_vec();
    }
    let span = (duration / beats.len() as Frame).max(MIN_BEAT_FRAMES);
    beats
        .iter()
        .enumerate()
        .map(|(i, beat)| beat.clone().with_timing(i as Frame * span, span))
        .collect()
}

/// Temporal progression: a multi-beat scene has more than one distinct start
/// frame unless its rhythm strategy declares simultaneity intentional.
pub fn has_temporal_progression(scene: &Scene) -> bool {
    scene.beats.len() <= 1
        || scene.rhythm.strategy.allows_simultaneous_beats()
        || scene.distinct_start_count() > 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::test_support::{scene, text_beat};
    use crate::scene::{BeatAction, RhythmStrategy, SceneType};

    fn starts(timings: &[BeatTiming]) -> Vec<Frame> {
        timings.iter().map(|t| t.start_frame).collect()
    }

    // -- compute_beat_timings -------------------------------------------------

    #[test]
    fn zero_beats_is_empty() {
        assert!(compute_beat_timings(0, 90, Pacing::Fast).is_empty());
    }

    #[test]
    fn single_beat_is_padded() {
        let t = compute_beat_timings(1, 90, Pacing::Calm);
        assert_eq!(
            t,
            vec![BeatTiming {
                start_frame: 6,
                duration_frames: 78
            }]
        );
    }

    #[test]
    fn single_beat_in_tiny_scene_still_has_length() {
        let t = compute_beat_timings(1, 8, Pacing::Balanced);
        assert_eq!(t[0].start_frame, 0);
        assert_eq!(t[0].duration_frames, 8);
        let t = compute_beat_timings(1, 0, Pacing::Balanced);
        assert_eq!(t[0].duration_frames, MIN_BEAT_FRAMES);
    }

    #[test]
    fn balanced_spacing() {
        let t = compute_beat_timings(3, 90, Pacing::Balanced);
        assert_eq!(t[0].start_frame, 0);
        assert!((25..=26).contains(&t[1].start_frame));
        assert_eq!(t[2].start_frame, 51);
        assert!(t.iter().all(|b| b.duration_frames == 30));
    }

    #[test]
    fn fast_overlaps_and_stays_in_scene() {
        let t = compute_beat_timings(3, 90, Pacing::Fast);
        assert_eq!(t[0].start_frame, 0);
        assert_eq!(t[1].start_frame, 26);
        assert!((52..=53).contains(&t[2].start_frame));
        assert!(t.iter().all(|b| b.start_frame + b.duration_frames <= 90));
        // Overlap: the second beat starts before the first ends.
        assert!(t[1].start_frame < t[0].start_frame + t[0].duration_frames);
    }

    #[test]
    fn calm_has_half_beat_lead_in() {
        let t = compute_beat_timings(3, 90, Pacing::Calm);
        assert_eq!(starts(&t), vec![11, 34, 56]);
        assert!(t.iter().all(|b| b.duration_frames == 23));
    }

    #[test]
    fn starts_strictly_increase_even_when_crowded() {
        for pacing in [Pacing::Fast, Pacing::Calm, Pacing::Balanced] {
            let t = compute_beat_timings(10, 5, pacing);
            for w in t.windows(2) {
                assert!(w[0].start_frame < w[1].start_frame, "{pacing:?}");
            }
        }
    }

    // -- spread_simultaneous_beats --------------------------------------------

    #[test]
    fn spreads_three_simultaneous_beats() {
        let beats = vec![
            text_beat("a", BeatAction::RevealHeadline, 0, 90),
            text_beat("b", BeatAction::RevealSubtext, 0, 90),
            text_beat("c", BeatAction::ShowCta, 0, 90),
        ];
        let spread = spread_simultaneous_beats(&beats, 90);
        let timing: Vec<(Frame, Frame)> = spread
            .iter()
            .map(|b| (b.start_frame, b.duration_frames))
            .collect();
        assert_eq!(timing, vec![(0, 30), (30, 30), (60, 30)]);
    }

    #[test]
    fn progressing_beats_are_untouched() {
        let beats = vec![
            text_beat("a", BeatAction::RevealHeadline, 0, 30),
            text_beat("b", BeatAction::RevealSubtext, 20, 30),
        ];
        assert_eq!(spread_simultaneous_beats(&beats, 90), beats);
    }

    // -- has_temporal_progression ---------------------------------------------

    #[test]
    fn simultaneous_beats_lack_progression() {
        let s = scene(
            "s",
            SceneType::Hook,
            vec![
                text_beat("a", BeatAction::RevealHeadline, 0, 30),
                text_beat("b", BeatAction::RevealSubtext, 0, 30),
            ],
            90,
        );
        assert!(!has_temporal_progression(&s));
    }

    #[test]
    fn single_moment_strategy_is_exempt() {
        let mut s = scene(
            "s",
            SceneType::Hook,
            vec![
                text_beat("a", BeatAction::RevealHeadline, 0, 30),
                text_beat("b", BeatAction::RevealSubtext, 0, 30),
            ],
            90,
        );
        s.rhythm.strategy = RhythmStrategy::SingleMoment;
        assert!(has_temporal_progression(&s));
    }

    #[test]
    fn retime_skips_breathing_beats() {
        let s = scene(
            "s",
            SceneType::Problem,
            vec![
                text_beat("a", BeatAction::RevealHeadline, 0, 10),
                Beat::new("br", BeatAction::Breathe, 70, 15),
                text_beat("b", BeatAction::RevealSubtext, 0, 10),
            ],
            90,
        );
        let retimed = retime_scene(&s);
        assert_eq!(retimed.beats[1].start_frame, 70);
        assert_eq!(retimed.beats[0].start_frame, 0);
        assert_eq!(retimed.beats[2].start_frame, 38);
    }
}
