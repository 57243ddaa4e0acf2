//! RGB colors accepted for text, watermark and canvas fills.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Basic named colors understood by the text renderer.
const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("white", Rgb::new(255, 255, 255)),
    ("black", Rgb::new(0, 0, 0)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("lime", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("gold", Rgb::new(255, 215, 0)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("pink", Rgb::new(255, 192, 203)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
];

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex form accepted by FFmpeg color options (`0xRRGGBB`).
    pub fn to_ffmpeg(&self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"));

        if let Some(hex) = hex {
            return parse_hex(hex).ok_or_else(|| ColorParseError(s.to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgb)| *rgb)
            .ok_or_else(|| ColorParseError(s.to_string()))
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(Rgb::new(
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            // #RGB expands each nibble: #F80 == #FF8800
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Rgb::new(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        _ => None,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized color: {0}")]
pub struct ColorParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!("#FFD700".parse::<Rgb>().unwrap(), Rgb::new(255, 215, 0));
        assert_eq!("0xffd700".parse::<Rgb>().unwrap(), Rgb::new(255, 215, 0));
        assert_eq!("#F80".parse::<Rgb>().unwrap(), Rgb::new(255, 136, 0));
    }

    #[test]
    fn test_parse_named() {
        assert_eq!("white".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("Gold".parse::<Rgb>().unwrap(), Rgb::new(255, 215, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("#GGHHII".parse::<Rgb>().is_err());
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("chartreuse-ish".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_ffmpeg_format() {
        assert_eq!(Rgb::new(255, 215, 0).to_ffmpeg(), "0xFFD700");
        assert_eq!(Rgb::BLACK.to_string(), "#000000");
    }
}
