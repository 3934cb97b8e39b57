//! Color primitives
//!
//! `Rgb` is the only color representation the engine hands out. It serializes
//! as `#RRGGBB` so config files and rule sets stay human-editable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const ORANGE: Self = Self::new(255, 200, 0);

    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string (with or without #).
    /// Accepts `RRGGBB` and Excel-style `AARRGGBB` (alpha dropped).
    /// Returns None if the format is invalid.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let hex = match hex.len() {
            6 => hex,
            8 => hex.get(2..)?,
            _ => return None,
        };
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Convert to CSS hex string (#RRGGBB).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Opaque ARGB hex (`FFRRGGBB`) as used by SpreadsheetML `rgb` attributes.
    pub fn to_argb(self) -> String {
        format!("FF{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert hue/saturation/brightness (all in `[0, 1]`, hue wraps) to RGB.
    ///
    /// Six-sector conversion with `+0.5` rounding on every channel, so that
    /// gradients sampled at the same ratio are bit-for-bit reproducible.
    #[allow(
        clippy::many_single_char_names,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let to_u8 = |c: f32| (c * 255.0 + 0.5).clamp(0.0, 255.0) as u8;
        if saturation.abs() < f32::EPSILON {
            let v = to_u8(brightness);
            return Self::new(v, v, v);
        }
        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));
        let (r, g, b) = match h as u8 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        };
        Self::new(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}'")))
    }
}

/// Material palettes offered for table row tinting.
///
/// Only the two lightest shades are used: 100 for even rows, 50 for odd rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Palette {
    Amber,
    Blue,
    BlueGray,
    Brown,
    Cyan,
    DeepOrange,
    DeepPurple,
    Gray,
    Green,
    Indigo,
    LightBlue,
    LightGreen,
    Lime,
    Orange,
    Pink,
    Purple,
    Red,
    Teal,
    Yellow,
}

impl Palette {
    /// Shade 50 (lightest) of the palette.
    pub const fn shade_50(self) -> Rgb {
        match self {
            Self::Red => Rgb::new(0xFF, 0xEB, 0xEE),
            Self::Pink => Rgb::new(0xFC, 0xE4, 0xEC),
            Self::Purple => Rgb::new(0xF3, 0xE5, 0xF5),
            Self::DeepPurple => Rgb::new(0xED, 0xE7, 0xF6),
            Self::Indigo => Rgb::new(0xE8, 0xEA, 0xF6),
            Self::Blue => Rgb::new(0xE3, 0xF2, 0xFD),
            Self::LightBlue => Rgb::new(0xE1, 0xF5, 0xFE),
            Self::Cyan => Rgb::new(0xE0, 0xF7, 0xFA),
            Self::Teal => Rgb::new(0xE0, 0xF2, 0xF1),
            Self::Green => Rgb::new(0xE8, 0xF5, 0xE9),
            Self::LightGreen => Rgb::new(0xF1, 0xF8, 0xE9),
            Self::Lime => Rgb::new(0xF9, 0xFB, 0xE7),
            Self::Yellow => Rgb::new(0xFF, 0xFD, 0xE7),
            Self::Amber => Rgb::new(0xFF, 0xF8, 0xE1),
            Self::Orange => Rgb::new(0xFF, 0xF3, 0xE0),
            Self::DeepOrange => Rgb::new(0xFB, 0xE9, 0xE7),
            Self::Brown => Rgb::new(0xEF, 0xEB, 0xE9),
            Self::Gray => Rgb::new(0xFA, 0xFA, 0xFA),
            Self::BlueGray => Rgb::new(0xEC, 0xEF, 0xF1),
        }
    }

    /// Shade 100 of the palette.
    pub const fn shade_100(self) -> Rgb {
        match self {
            Self::Red => Rgb::new(0xFF, 0xCD, 0xD2),
            Self::Pink => Rgb::new(0xF8, 0xBB, 0xD0),
            Self::Purple => Rgb::new(0xE1, 0xBE, 0xE7),
            Self::DeepPurple => Rgb::new(0xD1, 0xC4, 0xE9),
            Self::Indigo => Rgb::new(0xC5, 0xCA, 0xE9),
            Self::Blue => Rgb::new(0xBB, 0xDE, 0xFB),
            Self::LightBlue => Rgb::new(0xB3, 0xE5, 0xFC),
            Self::Cyan => Rgb::new(0xB2, 0xEB, 0xF2),
            Self::Teal => Rgb::new(0xB2, 0xDF, 0xDB),
            Self::Green => Rgb::new(0xC8, 0xE6, 0xC9),
            Self::LightGreen => Rgb::new(0xDC, 0xED, 0xC8),
            Self::Lime => Rgb::new(0xF0, 0xF4, 0xC3),
            Self::Yellow => Rgb::new(0xFF, 0xF9, 0xC4),
            Self::Amber => Rgb::new(0xFF, 0xEC, 0xB3),
            Self::Orange => Rgb::new(0xFF, 0xE0, 0xB2),
            Self::DeepOrange => Rgb::new(0xFF, 0xCC, 0xBC),
            Self::Brown => Rgb::new(0xD7, 0xCC, 0xC8),
            Self::Gray => Rgb::new(0xF5, 0xF5, 0xF5),
            Self::BlueGray => Rgb::new(0xCF, 0xD8, 0xDC),
        }
    }

    /// Row background for the given row index: even rows shade 100, odd rows shade 50.
    pub const fn row_color(self, row: usize) -> Rgb {
        if row % 2 == 0 {
            self.shade_100()
        } else {
            self.shade_50()
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let c = Rgb::from_hex("#3399FF").unwrap();
        assert_eq!(c, Rgb::new(51, 153, 255));
        assert_eq!(c.to_hex(), "#3399FF");
    }

    #[test]
    fn test_hex_argb_drops_alpha() {
        assert_eq!(Rgb::from_hex("FF00B050"), Some(Rgb::new(0, 176, 80)));
        assert_eq!(Rgb::new(0, 176, 80).to_argb(), "FF00B050");
    }

    #[test]
    fn test_hex_invalid() {
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_hsb_primaries() {
        assert_eq!(Rgb::from_hsb(0.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::from_hsb(1.0 / 3.0, 1.0, 1.0), Rgb::GREEN);
        assert_eq!(Rgb::from_hsb(0.5, 0.0, 1.0), Rgb::WHITE);
    }

    #[test]
    fn test_hsb_table_red() {
        // hue 0, s=b=0.9: r = 0.9, g = b = 0.09
        assert_eq!(Rgb::from_hsb(0.0, 0.9, 0.9), Rgb::new(230, 23, 23));
    }

    #[test]
    fn test_serde_hex_string() {
        let json = serde_json::to_string(&Rgb::ORANGE).unwrap();
        assert_eq!(json, "\"#FFC800\"");
        let back: Rgb = serde_json::from_str("\"#ffc800\"").unwrap();
        assert_eq!(back, Rgb::ORANGE);
        assert!(serde_json::from_str::<Rgb>("\"orange\"").is_err());
    }

    #[test]
    fn test_palette_row_parity() {
        assert_eq!(Palette::Orange.row_color(0), Rgb::new(0xFF, 0xE0, 0xB2));
        assert_eq!(Palette::Orange.row_color(1), Rgb::new(0xFF, 0xF3, 0xE0));
    }
}
