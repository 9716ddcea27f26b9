/// All scene and beat times are integer frame counts.
pub type Frame = u32;

/// Frame rate the renderer assumes unless configured otherwise.
pub const DEFAULT_FPS: u32 = 30;

/// Ceiling for any single frame value read from outside: ten minutes at the
/// default rate. Keeps every scene, beat and video sum far from `u32::MAX`.
pub const MAX_SCENE_FRAMES: Frame = 18_000;

/// Convert seconds to whole frames (rounded, never negative).
pub fn seconds_to_frames(seconds: f64, fps: u32) -> Frame {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * f64::from(fps)).round() as Frame
}

/// Convert frames to seconds. A zero frame rate yields zero.
pub fn frames_to_seconds(frames: Frame, fps: u32) -> f64 {
    if fps == 0 {
        return 0.0;
    }
    f64::from(frames) / f64::from(fps)
}
