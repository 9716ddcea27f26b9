//! Loose DTOs for the generator's JSON.
//!
//! Every field is optional and every kind is a plain string so that one
//! odd value never rejects the whole response. Numbers are read as `f64`
//! because generators emit `90.0` as readily as `90`.

use serde::{Deserialize, Deserializer};

/// `null` reads as the empty value.
fn nullable<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawGeneration {
    pub concept: Option<String>,
    #[serde(alias = "emotional_arc", deserialize_with = "nullable")]
    pub emotional_arc: Vec<String>,
    pub scenes: Option<Vec<RawScene>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawScene {
    pub id: Option<String>,
    #[serde(rename = "type", alias = "sceneType")]
    pub scene_type: Option<String>,
    pub intention: Option<String>,
    pub rhythm: Option<RawRhythm>,
    pub duration_frames: Option<f64>,
    pub duration_seconds: Option<f64>,
    #[serde(deserialize_with = "nullable")]
    pub beats: Vec<RawBeat>,
    pub background: Option<RawBackground>,
    pub typography: Option<RawTypography>,
    #[serde(deserialize_with = "nullable")]
    pub images: Vec<RawSceneImage>,
    pub layout_position: Option<String>,
    pub dominant_motion: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRhythm {
    pub strategy: Option<String>,
    pub pacing: Option<String>,
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBeat {
    pub id: Option<String>,
    #[serde(alias = "type")]
    pub action: Option<String>,
    pub text: Option<String>,
    pub image_id: Option<String>,
    pub start_frame: Option<f64>,
    pub duration_frames: Option<f64>,
    pub entry: Option<RawAnimation>,
    pub hold: Option<String>,
    pub exit: Option<RawAnimation>,
    pub position: Option<String>,
}

/// An animation given either as a bare name or as `{kind, durationFrames}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAnimation {
    Name(String),
    Spec {
        #[serde(alias = "type", alias = "animation")]
        kind: String,
        #[serde(default, rename = "durationFrames", alias = "duration")]
        duration_frames: Option<f64>,
    },
}

impl RawAnimation {
    pub fn kind(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Spec { kind, .. } => kind,
        }
    }

    pub fn duration_frames(&self) -> Option<f64> {
        match self {
            Self::Name(_) => None,
            Self::Spec {
                duration_frames, ..
            } => *duration_frames,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBackground {
    pub gradient: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub colors: Vec<String>,
    pub texture: Option<String>,
    pub texture_opacity: Option<f32>,
    pub animation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTypography {
    pub heading_font: Option<String>,
    pub body_font: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSceneImage {
    #[serde(alias = "id")]
    pub image_id: Option<String>,
    pub role: Option<String>,
    pub framing: Option<String>,
}
