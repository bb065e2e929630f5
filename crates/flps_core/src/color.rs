//! Color types and utilities

use serde::{Deserialize, Serialize};

/// Luma weights used for every RGB to gray conversion
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// 8-bit RGB triple as stored in the color table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a grayscale color
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// Create from hex value (0xRRGGBB)
    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Packed form used by the device cache: `b << 16 | g << 8 | r`
    pub const fn pack(self) -> u32 {
        (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }

    pub const fn unpack(packed: u32) -> Self {
        Self::new(
            (packed & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            ((packed >> 16) & 0xFF) as u8,
        )
    }

    pub fn is_gray(&self) -> bool {
        self.r == self.g && self.r == self.b
    }

    /// Brightness on the 0-255 scale, unrounded
    pub fn luma(&self) -> f64 {
        LUMA_R * self.r as f64 + LUMA_G * self.g as f64 + LUMA_B * self.b as f64
    }

    /// Gray-equivalent brightness, 0-255
    pub fn gray255(&self) -> u8 {
        (self.luma() + 0.1) as u8
    }

    /// Components scaled to 0.0..=1.0
    pub fn to_unit(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Symbolic color index into the built-in color table
///
/// The associated constants (`ColorIndex::RED`, `ColorIndex::LEFT_BCOL`, ...)
/// are generated together with the table in [`crate::colormap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorIndex(pub u32);

impl ColorIndex {
    /// "No color": setting it leaves the current color untouched
    pub const NONE: ColorIndex = ColorIndex(0x7FFF_FFFF);

    /// First index not occupied by the built-in table
    pub const FREE_COL1: ColorIndex = ColorIndex(256);

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

/// A color as requested by a drawing call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PsColor {
    /// Entry of the color table
    Index(ColorIndex),
    /// Literal RGB value
    Rgb(Rgb),
}

impl PsColor {
    pub const NONE: PsColor = PsColor::Index(ColorIndex::NONE);

    pub fn is_none(&self) -> bool {
        matches!(self, PsColor::Index(i) if i.is_none())
    }
}

impl From<ColorIndex> for PsColor {
    fn from(index: ColorIndex) -> Self {
        PsColor::Index(index)
    }
}

impl From<Rgb> for PsColor {
    fn from(rgb: Rgb) -> Self {
        PsColor::Rgb(rgb)
    }
}

/// How colors reach the page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// `RGB` for chromatic colors, `G` for grays
    #[default]
    Color,
    /// Everything as luma through `G`
    Grayscale,
    /// Luma thresholded to pure black or pure white
    BlackWhite,
}

/// Luma (0.0..=1.0) strictly above which black/white output prints white
pub const BW_THRESHOLD: f64 = 0.62;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_puts_red_in_low_byte() {
        let c = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(c.pack(), 0x56_34_12);
        assert_eq!(Rgb::unpack(c.pack()), c);
    }

    #[test]
    fn from_hex_reads_rrggbb() {
        assert_eq!(Rgb::from_hex(0xFF6347), Rgb::new(255, 99, 71));
    }

    #[test]
    fn gray255_uses_luma_weights() {
        assert_eq!(Rgb::WHITE.gray255(), 255);
        assert_eq!(Rgb::BLACK.gray255(), 0);
        // 0.299 * 255 = 76.245
        assert_eq!(Rgb::new(255, 0, 0).gray255(), 76);
        assert_eq!(Rgb::gray(158).gray255(), 158);
    }

    #[test]
    fn none_index_is_detected() {
        assert!(PsColor::NONE.is_none());
        assert!(!PsColor::from(ColorIndex(0)).is_none());
        assert!(!PsColor::from(Rgb::BLACK).is_none());
    }
}
