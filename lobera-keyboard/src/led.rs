//! Lighting types: light mode and per-profile accent colors

use std::fmt;
use std::str::FromStr;

use lobera_transport::protocol::size;
use serde::{Deserialize, Serialize};

use crate::error::KeyboardError;

/// Number of color slots in the colors table
pub const COLOR_SLOTS: usize = size::COLORS / 3;

/// Backlight mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LightMode {
    Off = 0,
    Single = 1,
    Dim = 2,
    Loop = 3,
}

impl LightMode {
    pub const ALL: [Self; 4] = [Self::Off, Self::Single, Self::Dim, Self::Loop];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Single => "single",
            Self::Dim => "dim",
            Self::Loop => "loop",
        }
    }
}

impl TryFrom<u8> for LightMode {
    type Error = KeyboardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|m| *m as u8 == value)
            .ok_or(KeyboardError::UnknownOpcode {
                what: "light mode",
                value,
            })
    }
}

impl FromStr for LightMode {
    type Err = KeyboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                KeyboardError::InvalidArgument(format!(
                    "unknown light mode '{s}' (expected off, single, dim or loop)"
                ))
            })
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From `0xRRGGBB`; the top byte is ignored
    pub const fn from_rgb(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// As `0xRRGGBB`
    pub const fn to_rgb(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const MAGENTA: Self = Self::new(255, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0);
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_rgb())
    }
}

impl FromStr for RgbColor {
    type Err = KeyboardError;

    /// Parse `rrggbb`, `#rrggbb` or `0xrrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex.len() != 6 {
            return Err(KeyboardError::InvalidArgument(format!(
                "color '{s}' must have 6 hex digits"
            )));
        }
        u32::from_str_radix(hex, 16)
            .map(Self::from_rgb)
            .map_err(|_| KeyboardError::InvalidArgument(format!("color '{s}' is not hex")))
    }
}

/// The device's colors table: one accent color per slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileColors(pub [RgbColor; COLOR_SLOTS]);

impl Default for ProfileColors {
    /// Factory colors written by a configuration reset
    fn default() -> Self {
        Self([
            RgbColor::MAGENTA,
            RgbColor::BLUE,
            RgbColor::RED,
            RgbColor::WHITE,
            RgbColor::GREEN,
            RgbColor::YELLOW,
        ])
    }
}

impl ProfileColors {
    /// Parse an 18-byte colors reply; missing bytes read as zero
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut colors = [RgbColor::BLACK; COLOR_SLOTS];
        for (color, chunk) in colors.iter_mut().zip(bytes.chunks(3)) {
            let mut rgb = [0u8; 3];
            rgb[..chunk.len()].copy_from_slice(chunk);
            *color = RgbColor::new(rgb[0], rgb[1], rgb[2]);
        }
        Self(colors)
    }

    pub fn to_bytes(&self) -> [u8; size::COLORS] {
        let mut out = [0u8; size::COLORS];
        for (chunk, c) in out.chunks_mut(3).zip(self.0.iter()) {
            chunk.copy_from_slice(&[c.r, c.g, c.b]);
        }
        out
    }

    pub fn get(&self, slot: usize) -> Option<RgbColor> {
        self.0.get(slot).copied()
    }

    pub fn set(&mut self, slot: usize, color: RgbColor) -> Result<(), KeyboardError> {
        let entry = self.0.get_mut(slot).ok_or_else(|| {
            KeyboardError::InvalidArgument(format!(
                "color slot {slot} out of range 0..={}",
                COLOR_SLOTS - 1
            ))
        })?;
        *entry = color;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_mode_from_byte() {
        assert_eq!(LightMode::try_from(0).unwrap(), LightMode::Off);
        assert_eq!(LightMode::try_from(3).unwrap(), LightMode::Loop);
        assert!(matches!(
            LightMode::try_from(4),
            Err(KeyboardError::UnknownOpcode { value: 4, .. })
        ));
    }

    #[test]
    fn test_light_mode_parse() {
        assert_eq!("Dim".parse::<LightMode>().unwrap(), LightMode::Dim);
        assert!("rainbow".parse::<LightMode>().is_err());
    }

    #[test]
    fn test_rgb_conversions() {
        let c = RgbColor::from_rgb(0x12ab34);
        assert_eq!(c, RgbColor::new(0x12, 0xab, 0x34));
        assert_eq!(c.to_rgb(), 0x12ab34);
        assert_eq!(c.to_string(), "#12ab34");
    }

    #[test]
    fn test_rgb_parse() {
        assert_eq!("ff00ff".parse::<RgbColor>().unwrap(), RgbColor::MAGENTA);
        assert_eq!("#0000FF".parse::<RgbColor>().unwrap(), RgbColor::BLUE);
        assert_eq!("0xffff00".parse::<RgbColor>().unwrap(), RgbColor::YELLOW);
        assert!("fff".parse::<RgbColor>().is_err());
        assert!("gg0000".parse::<RgbColor>().is_err());
    }

    #[test]
    fn test_default_colors_bytes() {
        assert_eq!(
            ProfileColors::default().to_bytes(),
            [
                0xff, 0x00, 0xff, 0x00, 0x00, 0xff, 0xff, 0x00, 0x00, 0xff, 0xff, 0xff, 0x00, 0xff,
                0x00, 0xff, 0xff, 0x00
            ]
        );
    }

    #[test]
    fn test_colors_bytes_roundtrip() {
        let bytes: Vec<u8> = (0..18).collect();
        let colors = ProfileColors::from_bytes(&bytes);
        assert_eq!(colors.get(1), Some(RgbColor::new(3, 4, 5)));
        assert_eq!(colors.to_bytes().to_vec(), bytes);
    }

    #[test]
    fn test_set_slot_range() {
        let mut colors = ProfileColors::default();
        colors.set(5, RgbColor::BLACK).unwrap();
        assert_eq!(colors.get(5), Some(RgbColor::BLACK));
        assert!(colors.set(6, RgbColor::BLACK).is_err());
        assert_eq!(colors.get(6), None);
    }
}
