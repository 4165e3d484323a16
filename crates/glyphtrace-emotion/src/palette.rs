//! Palette derivation from emotion colors.
//!
//! A [`Palette`] is five hex colors derived deterministically from one
//! or two emotion node colors by channel-wise RGB blending and scaling.
//! Palettes are never persisted on their own; they exist to be spliced
//! into an SVG by a colorization strategy.

use serde::{Deserialize, Serialize};

/// Errors raised while parsing hex color strings.
#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    /// The string is not `#RRGGBB`.
    #[error("invalid hex color: {0:?} (expected #RRGGBB)")]
    InvalidHex(String),
}

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Parse a `#RRGGBB` hex string (the leading `#` is required).
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidHex`] for any other shape.
    pub fn parse(hex: &str) -> Result<Self, ColorError> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| ColorError::InvalidHex(hex.to_string()))?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorError::InvalidHex(hex.to_string()))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Format as a lowercase `#rrggbb` string.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise midpoint of two colors, rounding half up so that
    /// `0xFF` and `0x00` blend to `0x80`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn midpoint(self, other: Self) -> Self {
        let mid = |a: u8, b: u8| ((u16::from(a) + u16::from(b)).div_ceil(2)).min(255) as u8;
        Self {
            r: mid(self.r, other.r),
            g: mid(self.g, other.g),
            b: mid(self.b, other.b),
        }
    }

    /// Scale every channel by `factor`, clamping to `[0, 255]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scale(self, factor: f64) -> Self {
        let scaled = |c: u8| (f64::from(c) * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: scaled(self.r),
            g: scaled(self.g),
            b: scaled(self.b),
        }
    }
}

/// Five hex colors derived from one or two emotion colors.
///
/// `primary` is the dominant emotion's color verbatim. `gradient` is
/// the blend midpoint when a secondary color is given, otherwise the
/// primary brightened by 30%. `light`/`dark` are ±20% scalings of the
/// primary. `secondary` defaults to the gradient color when no second
/// emotion is available, so gradient strategies always have three
/// usable stops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Dominant emotion color.
    pub primary: String,
    /// Blend partner (second emotion, or the gradient fallback).
    pub secondary: String,
    /// Midpoint / brightened stop used by gradient strategies.
    pub gradient: String,
    /// Primary scaled ×1.2.
    pub light: String,
    /// Primary scaled ×0.8.
    pub dark: String,
}

impl Palette {
    /// Build a palette from a primary hex color and an optional
    /// secondary. Deterministic: equal inputs produce equal palettes.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidHex`] when either input is not a
    /// `#RRGGBB` string.
    pub fn build(primary_hex: &str, secondary_hex: Option<&str>) -> Result<Self, ColorError> {
        let primary = Rgb::parse(primary_hex)?;

        let gradient = match secondary_hex {
            Some(hex) => primary.midpoint(Rgb::parse(hex)?),
            None => primary.scale(1.3),
        };

        Ok(Self {
            primary: primary_hex.to_string(),
            secondary: secondary_hex.map_or_else(|| gradient.to_hex(), ToString::to_string),
            gradient: gradient.to_hex(),
            light: primary.scale(1.2).to_hex(),
            dark: primary.scale(0.8).to_hex(),
        })
    }
}
