//! Hex color value type used by palettes, backgrounds and typography.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

static HEX_COLOR_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"));

/// Number of leading characters compared by [`HexColor::same_family`].
pub const COLOR_FAMILY_PREFIX_LEN: usize = 3;

/// A `#rrggbb` color, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Parse a `#rrggbb` string (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let trimmed = s.trim();
        if HEX_COLOR_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(CoreError::Validation(format!(
                "Invalid color '{s}'. Expected #RRGGBB"
            )))
        }
    }

    /// Build a color from its channels.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Red, green and blue channels.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |i: usize| u8::from_str_radix(&self.0[i..i + 2], 16).unwrap_or(0);
        (channel(1), channel(3), channel(5))
    }

    /// Relative luminance in `[0.0, 1.0]` (sRGB, linearized).
    pub fn luminance(&self) -> f64 {
        fn linear(c: u8) -> f64 {
            let c = f64::from(c) / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let (r, g, b) = self.rgb();
        0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`, `t = 1` yields `other`.
    pub fn mix(&self, other: &HexColor, t: f64) -> HexColor {
        let t = t.clamp(0.0, 1.0);
        let (r1, g1, b1) = self.rgb();
        let (r2, g2, b2) = other.rgb();
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        HexColor::from_rgb(lerp(r1, r2), lerp(g1, g2), lerp(b1, b2))
    }

    /// Coarse color-family check by string prefix (`#` plus the red channel).
    pub fn same_family(&self, other: &HexColor) -> bool {
        self.0[..COLOR_FAMILY_PREFIX_LEN] == other.0[..COLOR_FAMILY_PREFIX_LEN]
    }
}

impl TryFrom<String> for HexColor {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a color known at compile time. Only used for the built-in tables.
pub(crate) fn builtin(s: &str) -> HexColor {
    HexColor::parse(s).unwrap_or_else(|_| HexColor::from_rgb(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case() {
        assert_eq!(HexColor::parse("#ABCDEF").unwrap().as_str(), "#abcdef");
    }

    #[test]
    fn rejects_short_and_named_colors() {
        assert!(HexColor::parse("#fff").is_err());
        assert!(HexColor::parse("red").is_err());
        assert!(HexColor::parse("").is_err());
    }

    #[test]
    fn luminance_extremes() {
        assert!(HexColor::parse("#000000").unwrap().luminance() < 0.001);
        assert!(HexColor::parse("#ffffff").unwrap().luminance() > 0.999);
    }

    #[test]
    fn mix_halfway() {
        let black = HexColor::parse("#000000").unwrap();
        let white = HexColor::parse("#ffffff").unwrap();
        assert_eq!(black.mix(&white, 0.5).as_str(), "#808080");
        assert_eq!(black.mix(&white, 0.0), black);
    }

    #[test]
    fn family_uses_prefix() {
        let a = HexColor::parse("#1a2b3c").unwrap();
        let b = HexColor::parse("#1aff00").unwrap();
        let c = HexColor::parse("#2a2b3c").unwrap();
        assert!(a.same_family(&b));
        assert!(!a.same_family(&c));
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<HexColor>("\"#12345\"").is_err());
        let c: HexColor = serde_json::from_str("\"#A1B2C3\"").unwrap();
        assert_eq!(c.as_str(), "#a1b2c3");
    }
}
