//! Generation request: the immutable input of one pipeline run.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::color::HexColor;
use crate::error::CoreError;
use crate::profiles::VideoStyle;
use crate::scene::ImageKind;

/// Language used when the request names none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// An image the user supplied for the video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProvidedImage {
    #[validate(length(min = 1, max = 200))]
    pub id: String,
    pub kind: ImageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One user ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[validate(length(min = 3, max = 4000))]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ProvidedImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Forces the style instead of detecting it from the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<VideoStyle>,
    /// Derives the palette from this color instead of a preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<HexColor>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            product: None,
            audience: None,
            images: Vec::new(),
            language: None,
            style: None,
            brand_color: None,
        }
    }

    /// Run the field validators and map failures to [`CoreError::Validation`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        let mut seen = std::collections::HashSet::new();
        for image in &self.images {
            if !seen.insert(image.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate image id '{}'",
                    image.id
                )));
            }
        }
        Ok(())
    }

    pub fn language(&self) -> &str {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn image(&self, id: &str) -> Option<&ProvidedImage> {
        self.images.iter().find(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn minimal_request_is_valid() {
        let req = GenerationRequest::new("Launch video for a running shoe");
        assert!(req.check().is_ok());
        assert_eq!(req.language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn short_prompt_is_rejected() {
        let req = GenerationRequest::new("hi");
        assert_matches!(req.check(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_image_id_is_rejected() {
        let mut req = GenerationRequest::new("A video about coffee");
        req.images.push(ProvidedImage {
            id: String::new(),
            kind: ImageKind::Product,
            description: None,
        });
        assert_matches!(req.check(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn duplicate_image_ids_are_rejected() {
        let mut req = GenerationRequest::new("A video about coffee");
        for _ in 0..2 {
            req.images.push(ProvidedImage {
                id: "cup".to_string(),
                kind: ImageKind::Product,
                description: None,
            });
        }
        assert_matches!(req.check(), Err(CoreError::Validation(msg)) if msg.contains("cup"));
    }

    #[test]
    fn deserializes_camel_case_with_style_and_brand() {
        let req: GenerationRequest = serde_json::from_str(
            r##"{"prompt":"Premium tea","style":"cinematic","brandColor":"#AA3300","images":[{"id":"tin","kind":"product"}]}"##,
        )
        .unwrap();
        assert_eq!(req.style, Some(VideoStyle::Cinematic));
        assert_eq!(req.brand_color.as_ref().unwrap().as_str(), "#aa3300");
        assert!(req.image("tin").is_some());
    }
}
