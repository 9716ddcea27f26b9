use beatforge_core::DEFAULT_FPS;
use beatforge_llm::port::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Seed for transition jitter when none is configured.
pub const DEFAULT_JITTER_SEED: u64 = 0x5EED_BEA7;

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Frame rate all frame counts refer to (default: `30`).
    pub fps: u32,
    /// Seed for the transition jitter tracks.
    pub jitter_seed: u64,
    /// Run one repair pass on scenes that fail the quality judge.
    pub auto_fix: bool,
    /// Repair hierarchy issues instead of only reporting them.
    pub enforce_hierarchy: bool,
    /// Inject and balance breathing beats.
    pub inject_breathing: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            jitter_seed: DEFAULT_JITTER_SEED,
            auto_fix: true,
            enforce_hierarchy: true,
            inject_breathing: true,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default      |
    /// |-------------------------------|--------------|
    /// | `BEATFORGE_FPS`               | `30`         |
    /// | `BEATFORGE_JITTER_SEED`       | fixed        |
    /// | `BEATFORGE_AUTO_FIX`          | `true`       |
    /// | `BEATFORGE_ENFORCE_HIERARCHY` | `true`       |
    /// | `BEATFORGE_INJECT_BREATHING`  | `true`       |
    /// | `BEATFORGE_TEMPERATURE`       | `0.7`        |
    /// | `BEATFORGE_MAX_TOKENS`        | `4096`       |
    ///
    /// Unparsable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let fps = parse_or("BEATFORGE_FPS", &lookup, defaults.fps);
        Self {
            fps: if fps == 0 {
                tracing::warn!("BEATFORGE_FPS must be positive, using default");
                defaults.fps
            } else {
                fps
            },
            jitter_seed: parse_or("BEATFORGE_JITTER_SEED", &lookup, defaults.jitter_seed),
            auto_fix: parse_or("BEATFORGE_AUTO_FIX", &lookup, defaults.auto_fix),
            enforce_hierarchy: parse_or(
                "BEATFORGE_ENFORCE_HIERARCHY",
                &lookup,
                defaults.enforce_hierarchy,
            ),
            inject_breathing: parse_or(
                "BEATFORGE_INJECT_BREATHING",
                &lookup,
                defaults.inject_breathing,
            ),
            temperature: parse_or("BEATFORGE_TEMPERATURE", &lookup, defaults.temperature),
            max_tokens: parse_or("BEATFORGE_MAX_TOKENS", &lookup, defaults.max_tokens),
        }
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Invalid config value, using default");
            default
        }),
        None => default,
    }
}
