//! RGBA colors: parsing, formatting and the lightening transform used by derived tokens

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build a color from design-tool float channels in `0.0..=1.0`.
    pub fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Self {
        fn ch(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self { r: ch(r), g: ch(g), b: ch(b), a: ch(a) }
    }

    /// Mix every channel toward white by `percent` (0-100).
    ///
    /// Each output channel is `c + (255 - c) * percent / 100`, so the result is
    /// never darker than the input on any channel. Alpha is preserved.
    pub fn lighten(self, percent: f32) -> Self {
        let p = percent.clamp(0.0, 100.0) / 100.0;
        let mix = |c: u8| -> u8 {
            let c = f32::from(c);
            (c + (255.0 - c) * p).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
            a: self.a,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = f32::from(self.a) / 255.0;
            write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, (alpha * 1000.0).round() / 1000.0)
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        let invalid = || Error::InvalidColor(raw.to_string());

        if let Some(hex) = raw.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(invalid)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Color::rgb(r * 17, g * 17, b * 17)),
                [r, g, b, a] => Ok(Color { r: r * 17, g: g * 17, b: b * 17, a: a * 17 }),
                [r1, r2, g1, g2, b1, b2] => Ok(Color::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
                [r1, r2, g1, g2, b1, b2, a1, a2] => Ok(Color {
                    r: r1 * 16 + r2,
                    g: g1 * 16 + g2,
                    b: b1 * 16 + b2,
                    a: a1 * 16 + a2,
                }),
                _ => Err(invalid()),
            };
        }

        let lower = raw.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let parts: Vec<&str> = args
            .split(|c| c == ',' || c == '/' || c == ' ')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(invalid());
        }
        let channel = |p: &str| -> Result<u8> {
            let v: f32 = p.parse().map_err(|_| invalid())?;
            Ok(v.clamp(0.0, 255.0).round() as u8)
        };
        let alpha = match parts.get(3) {
            Some(p) => {
                let v: f32 = match p.strip_suffix('%') {
                    Some(pct) => pct.parse::<f32>().map_err(|_| invalid())? / 100.0,
                    None => p.parse().map_err(|_| invalid())?,
                };
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };
        Ok(Color {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a: alpha,
        })
    }
}

/// Normalize a color string for comparisons (`#3D9DFF` and `rgb(61,157,255)` compare equal).
pub fn normalize(value: &str) -> Option<String> {
    value.parse::<Color>().ok().map(|c| c.to_string())
}
