//! Seeded jitter source for glitch-style transition tracks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Largest offset, in pixels, on either axis.
pub const MAX_JITTER_PX: f32 = 6.0;

/// One per-frame offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterOffset {
    pub dx: f32,
    pub dy: f32,
}

/// Deterministic pseudo-random offsets. Equal seeds give equal tracks.
pub struct JitterSource {
    rng: StdRng,
}

impl JitterSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One offset with both axes in `[-amplitude, amplitude]`, amplitude
    /// capped at [`MAX_JITTER_PX`].
    pub fn offset(&mut self, amplitude: f32) -> JitterOffset {
        let a = amplitude.clamp(0.0, MAX_JITTER_PX);
        if a == 0.0 {
            return JitterOffset { dx: 0.0, dy: 0.0 };
        }
        JitterOffset {
            dx: self.rng.random_range(-a..=a),
            dy: self.rng.random_range(-a..=a),
        }
    }

    /// One offset per frame.
    pub fn track(&mut self, frames: u32, amplitude: f32) -> Vec<JitterOffset> {
        (0..frames).map(|_| self.offset(amplitude)).collect()
    }
}
