//! Style detection from the prompt text.

use beatforge_core::keywords::best_match;
use beatforge_core::{GenerationRequest, VideoStyle};

pub const DYNAMIC_KEYWORDS: &[&str] = &[
    "energetic", "fast", "dynamic", "bold", "sport", "sports", "gaming", "launch", "hype",
    "viral", "tiktok", "exciting",
];

pub const CINEMATIC_KEYWORDS: &[&str] = &[
    "cinematic", "luxury", "story", "emotional", "premium", "elegant", "film", "dramatic",
];

pub const MINIMAL_KEYWORDS: &[&str] = &[
    "minimal", "minimalist", "clean", "simple", "calm", "wellness", "zen", "quiet",
];

pub const CORPORATE_KEYWORDS: &[&str] = &[
    "corporate", "b2b", "professional", "saas", "enterprise", "business", "finance",
    "productivity",
];

/// Style used when no keyword matches.
pub const FALLBACK_STYLE: VideoStyle = VideoStyle::Corporate;

/// How the active style was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSource {
    Forced,
    Keywords,
    Fallback,
}

fn keywords_for(style: VideoStyle) -> &'static [&'static str] {
    match style {
        VideoStyle::Dynamic => DYNAMIC_KEYWORDS,
        VideoStyle::Cinematic => CINEMATIC_KEYWORDS,
        VideoStyle::Minimal => MINIMAL_KEYWORDS,
        VideoStyle::Corporate => CORPORATE_KEYWORDS,
    }
}

/// Keyword-score `prompt` against each style in declaration order.
/// Ties go to the earlier style; no hits yield `None`.
pub fn score_style(prompt: &str) -> Option<VideoStyle> {
    let sets: Vec<&[&str]> = VideoStyle::ALL.iter().map(|s| keywords_for(*s)).collect();
    best_match(prompt, &sets).map(|i| VideoStyle::ALL[i])
}

/// Pick the style for a request. A forced style always wins.
pub fn detect_style(request: &GenerationRequest) -> (VideoStyle, StyleSource) {
    if let Some(style) = request.style {
        return (style, StyleSource::Forced);
    }
    match score_style(&request.prompt) {
        Some(style) => (style, StyleSource::Keywords),
        None => (FALLBACK_STYLE, StyleSource::Fallback),
    }
}
