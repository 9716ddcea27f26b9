//! Builds the single request sent to the text generator.

use std::fmt::Write;

use beatforge_core::{GenerationRequest, StyleProfile};
use beatforge_llm::TextRequest;

use crate::config::PipelineConfig;

const SYSTEM_PROMPT: &str = r#"You are a motion-design director writing short marketing videos as timed scenes.
Every scene is a sequence of beats: atomic visual actions that each start at their own frame.
Never produce slide-like scenes where everything appears at once on a static background.

Reply with ONE JSON object and nothing else, shaped like:
{
  "concept": "one-line creative concept",
  "emotionalArc": ["curiosity", "tension", "relief", "confidence"],
  "scenes": [
    {
      "id": "scene-1",
      "type": "HOOK | PROBLEM | SOLUTION | FEATURE | BENEFIT | PROOF | CTA",
      "intention": "capture_attention | create_empathy | build_trust | demonstrate_value | evoke_emotion | inform | drive_action",
      "rhythm": { "strategy": "cascade | staccato | crescendo | call_and_response | single_moment | breathing_pause", "rationale": "why" },
      "durationFrames": 90,
      "layoutPosition": "center | left | right | top | bottom",
      "dominantMotion": "none | up | down | left | right",
      "background": { "animation": "static | subtle_drift | slow_pan | gradient_shift | pulse" },
      "images": [{ "imageId": "id from the brief", "role": "hero | product | supporting | background | logo | accent" }],
      "beats": [
        {
          "action": "reveal_headline | reveal_subtext | show_image | show_stat | show_cta | accent",
          "text": "copy for text beats",
          "imageId": "for show_image beats",
          "startFrame": 0,
          "durationFrames": 30,
          "entry": { "kind": "fade_in | slide_up | slide_down | slide_left | slide_right | scale_in | zoom_burst | blur_in | type_on | bounce | mask_reveal", "durationFrames": 12 },
          "hold": "still | slow_zoom | gentle_float | pulse | shimmer"
        }
      ]
    }
  ]
}

Rules:
- The first scene is a HOOK and the last scene is a CTA.
- The emotional arc has at least three stops.
- All times are integer frame counts.
- Only reference image ids listed in the brief."#;

/// Assemble the system instruction and user message for one request.
pub fn build_text_request(
    request: &GenerationRequest,
    style: &StyleProfile,
    config: &PipelineConfig,
) -> TextRequest {
    TextRequest::new(SYSTEM_PROMPT, build_user_message(request, style, config.fps))
        .with_sampling(config.temperature, config.max_tokens)
}

/// The brief plus every style constraint the generator should respect.
pub fn build_user_message(request: &GenerationRequest, style: &StyleProfile, fps: u32) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "Brief: {}", request.prompt.trim());
    if let Some(product) = &request.product {
        let _ = writeln!(msg, "Product: {}", product.trim());
    }
    if let Some(audience) = &request.audience {
        let _ = writeln!(msg, "Audience: {}", audience.trim());
    }
    let _ = writeln!(msg, "Language for all on-screen text: {}", request.language());
    let _ = writeln!(msg);
    let _ = writeln!(msg, "Style: {}", style.style);
    let _ = writeln!(msg, "Scenes: {}", style.target_scene_count);
    let _ = writeln!(
        msg,
        "Beats per scene: {}-{}",
        style.beats_per_scene.min, style.beats_per_scene.max
    );
    let _ = writeln!(
        msg,
        "Scene duration: {}-{} frames at {} fps",
        style.scene_duration.min, style.scene_duration.max, fps
    );
    let _ = writeln!(msg, "Roughly {} frames per beat.", style.base_rhythm_frames);

    if !request.images.is_empty() {
        let _ = writeln!(msg);
        let _ = writeln!(msg, "Images:");
        for image in &request.images {
            let kind = serde_json::to_value(image.kind)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            match &image.description {
                Some(description) => {
                    let _ = writeln!(msg, "- {} ({kind}): {}", image.id, description.trim());
                }
                None => {
                    let _ = writeln!(msg, "- {} ({kind})", image.id);
                }
            }
        }
    }
    msg
}
