use std::path::PathBuf;

use anyhow::{bail, Context};
use beatforge_core::{GenerationRequest, HexColor, VideoStyle};
use clap::Parser;

/// Turn a marketing brief into timed, validated scenes.
///
/// Progress, then exactly one result or error, is written to stdout as
/// newline-delimited JSON. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file holding a full generation request
    #[arg(short, long, conflicts_with = "prompt")]
    pub brief: Option<PathBuf>,

    /// Free-text prompt (instead of --brief)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Force a style: dynamic, cinematic, minimal or corporate
    #[arg(short, long, value_parser = parse_style)]
    pub style: Option<VideoStyle>,

    /// Language for on-screen text
    #[arg(short, long)]
    pub language: Option<String>,

    /// Brand color (#RRGGBB) to derive the palette from
    #[arg(long, value_parser = parse_color)]
    pub brand_color: Option<HexColor>,

    /// Replay a saved generator response instead of calling the API
    #[arg(long)]
    pub response_file: Option<PathBuf>,
}

fn parse_style(raw: &str) -> Result<VideoStyle, String> {
    VideoStyle::parse(raw).ok_or_else(|| format!("unknown style '{raw}'"))
}

fn parse_color(raw: &str) -> Result<HexColor, String> {
    HexColor::parse(raw).map_err(|e| e.to_string())
}

impl Cli {
    /// Build the request from `--brief` or `--prompt`, then apply the
    /// command-line overrides.
    pub fn request(&self) -> anyhow::Result<GenerationRequest> {
        let mut request = match (&self.brief, &self.prompt) {
            (Some(path), _) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading brief {}", path.display()))?;
                serde_json::from_str::<GenerationRequest>(&text)
                    .with_context(|| format!("parsing brief {}", path.display()))?
            }
            (None, Some(prompt)) => GenerationRequest::new(prompt.clone()),
            (None, None) => bail!("either --brief or --prompt is required"),
        };
        if let Some(style) = self.style {
            request.style = Some(style);
        }
        if let Some(language) = &self.language {
            request.language = Some(language.clone());
        }
        if let Some(color) = &self.brand_color {
            request.brand_color = Some(color.clone());
        }
        Ok(request)
    }
}
