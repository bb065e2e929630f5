//! Built-in named color table
//!
//! The table mirrors the toolkit's palette but is tuned for paper rather than
//! screen. Lookups are by symbolic index or by the `FL_*` name used in form
//! files. [`ColorMap::apply_gamma`] rewrites every entry in place; the only
//! way back is a fresh [`ColorMap::builtin`].

use tracing::{debug, trace};

use crate::color::{ColorIndex, Rgb};
use crate::error::{PsError, PsResult};

/// Gamma factors with a smaller magnitude are rejected
pub const MIN_GAMMA: f32 = 1.0e-3;

/// One row of the color table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorEntry {
    pub name: &'static str,
    pub index: ColorIndex,
    pub rgb: Rgb,
}

macro_rules! color_table {
    ($($name:ident = $idx:literal => ($r:literal, $g:literal, $b:literal)),* $(,)?) => {
        impl ColorIndex {
            $(pub const $name: ColorIndex = ColorIndex($idx);)*
        }

        const BUILTIN: &[(&str, ColorIndex, Rgb)] = &[
            $((concat!("FL_", stringify!($name)), ColorIndex($idx), Rgb::new($r, $g, $b)),)*
        ];
    };
}

color_table! {
    BLACK = 0 => (0, 0, 0),
    RED = 1 => (255, 0, 0),
    GREEN = 2 => (0, 255, 0),
    YELLOW = 3 => (255, 255, 0),
    BLUE = 4 => (0, 0, 255),
    MAGENTA = 5 => (255, 0, 255),
    CYAN = 6 => (0, 255, 255),
    WHITE = 7 => (255, 255, 255),
    TOMATO = 8 => (255, 99, 71),
    INDIANRED = 9 => (198, 113, 113),
    SLATEBLUE = 10 => (113, 113, 198),
    COL1 = 11 => (161, 161, 161),
    RIGHT_BCOL = 12 => (41, 41, 41),
    BOTTOM_BCOL = 13 => (89, 89, 89),
    TOP_BCOL = 14 => (204, 204, 204),
    LEFT_BCOL = 15 => (222, 222, 222),
    MCOL = 16 => (191, 191, 191),
    INACTIVE = 17 => (110, 110, 110),
    PALEGREEN = 18 => (113, 198, 113),
    DARKGOLD = 19 => (205, 149, 10),
    ORCHID = 20 => (205, 105, 201),
    DARKCYAN = 21 => (40, 170, 175),
    DARKTOMATO = 22 => (139, 54, 38),
    WHEAT = 23 => (255, 231, 155),
    DARKORANGE = 24 => (255, 128, 0),
    DEEPPINK = 25 => (255, 0, 128),
    CHARTREUSE = 26 => (128, 255, 0),
    DARKVIOLET = 27 => (128, 0, 255),
    SPRINGGREEN = 28 => (0, 255, 128),
    DODGERBLUE = 29 => (0, 128, 255),
    LIGHTER_COL1 = 30 => (204, 204, 204),
    DARKER_COL1 = 31 => (161, 161, 161),
    DOGERBLUE = 29 => (0, 128, 255),
    ALICEBLUE = 32 => (240, 248, 255),
    ANTIQUEWHITE = 33 => (250, 235, 215),
    AQUA = 34 => (0, 255, 255),
    AQUAMARINE = 35 => (127, 255, 212),
    AZURE = 36 => (240, 255, 255),
    BEIGE = 37 => (245, 245, 220),
    BISQUE = 38 => (255, 228, 196),
    BLANCHEDALMOND = 39 => (255, 235, 205),
    BLUEVIOLET = 40 => (138, 43, 226),
    BROWN = 41 => (165, 42, 42),
    BURLYWOOD = 42 => (222, 184, 135),
    CADETBLUE = 43 => (95, 158, 160),
    CHOCOLATE = 44 => (210, 105, 30),
    CORAL = 45 => (255, 127, 80),
    CORNFLOWERBLUE = 46 => (100, 149, 237),
    CORNSILK = 47 => (255, 248, 220),
    CRIMSON = 48 => (220, 20, 60),
    DARKBLUE = 49 => (0, 0, 139),
    DARKGOLDENROD = 50 => (184, 134, 11),
    DARKGRAY = 51 => (169, 169, 169),
    DARKGREEN = 52 => (0, 100, 0),
    DARKGREY = 53 => (169, 169, 169),
    DARKKHAKI = 54 => (189, 183, 107),
    DARKMAGENTA = 55 => (139, 0, 139),
    DARKOLIVEGREEN = 56 => (85, 107, 47),
    DARKORCHID = 57 => (153, 50, 204),
    DARKRED = 58 => (139, 0, 0),
    DARKSALMON = 59 => (233, 150, 122),
    DARKSEAGREEN = 60 => (143, 188, 143),
    DARKSLATEBLUE = 61 => (72, 61, 139),
    DARKSLATEGRAY = 62 => (47, 79, 79),
    DARKSLATEGREY = 63 => (47, 79, 79),
    DARKTURQUOISE = 64 => (0, 206, 209),
    DEEPSKYBLUE = 65 => (0, 191, 255),
    DIMGRAY = 66 => (105, 105, 105),
    DIMGREY = 67 => (105, 105, 105),
    FIREBRICK = 68 => (178, 34, 34),
    FLORALWHITE = 69 => (255, 250, 240),
    FORESTGREEN = 70 => (34, 139, 34),
    FUCHSIA = 71 => (255, 0, 255),
    GAINSBORO = 72 => (220, 220, 220),
    GHOSTWHITE = 73 => (248, 248, 255),
    GOLD = 74 => (255, 215, 0),
    GOLDENROD = 75 => (218, 165, 32),
    GRAY = 76 => (128, 128, 128),
    GREENYELLOW = 77 => (173, 255, 47),
    GREY = 78 => (128, 128, 128),
    HONEYDEW = 79 => (240, 255, 240),
    HOTPINK = 80 => (255, 105, 180),
    INDIGO = 81 => (75, 0, 130),
    IVORY = 82 => (255, 255, 240),
    KHAKI = 83 => (240, 230, 140),
    LAVENDER = 84 => (230, 230, 250),
    LAVENDERBLUSH = 85 => (255, 240, 245),
    LAWNGREEN = 86 => (124, 252, 0),
    LEMONCHIFFON = 87 => (255, 250, 205),
    LIGHTBLUE = 88 => (173, 216, 230),
    LIGHTCORAL = 89 => (240, 128, 128),
    LIGHTCYAN = 90 => (224, 255, 255),
    LIGHTGOLDENRODYELLOW = 91 => (250, 250, 210),
    LIGHTGRAY = 92 => (211, 211, 211),
    LIGHTGREEN = 93 => (144, 238, 144),
    LIGHTGREY = 94 => (211, 211, 211),
    LIGHTPINK = 95 => (255, 182, 193),
    LIGHTSALMON = 96 => (255, 160, 122),
    LIGHTSEAGREEN = 97 => (32, 178, 170),
    LIGHTSKYBLUE = 98 => (135, 206, 250),
    LIGHTSLATEGRAY = 99 => (119, 136, 153),
    LIGHTSLATEGREY = 100 => (119, 136, 153),
    LIGHTSTEELBLUE = 101 => (176, 196, 222),
    LIGHTYELLOW = 102 => (255, 255, 224),
    LIME = 103 => (0, 255, 0),
    LIMEGREEN = 104 => (50, 205, 50),
    LINEN = 105 => (250, 240, 230),
    MAROON = 106 => (128, 0, 0),
    MEDIUMAQUAMARINE = 107 => (102, 205, 170),
    MEDIUMBLUE = 108 => (0, 0, 205),
    MEDIUMORCHID = 109 => (186, 85, 211),
    MEDIUMPURPLE = 110 => (147, 112, 219),
    MEDIUMSEAGREEN = 111 => (60, 179, 113),
    MEDIUMSLATEBLUE = 112 => (123, 104, 238),
    MEDIUMSPRINGGREEN = 113 => (0, 250, 154),
    MEDIUMTURQUOISE = 114 => (72, 209, 204),
    MEDIUMVIOLETRED = 115 => (199, 21, 133),
    MIDNIGHTBLUE = 116 => (25, 25, 112),
    MINTCREAM = 117 => (245, 255, 250),
    MISTYROSE = 118 => (255, 228, 225),
    MOCCASIN = 119 => (255, 228, 181),
    NAVAJOWHITE = 120 => (255, 222, 173),
    NAVY = 121 => (0, 0, 128),
    OLDLACE = 122 => (253, 245, 230),
    OLIVE = 123 => (128, 128, 0),
    OLIVEDRAB = 124 => (107, 142, 35),
    ORANGE = 125 => (255, 165, 0),
    ORANGERED = 126 => (255, 69, 0),
    PALEGOLDENROD = 127 => (238, 232, 170),
    PALETURQUOISE = 128 => (175, 238, 238),
    PALEVIOLETRED = 129 => (219, 112, 147),
    PAPAYAWHIP = 130 => (255, 239, 213),
    PEACHPUFF = 131 => (255, 218, 185),
    PERU = 132 => (205, 133, 63),
    PINK = 133 => (255, 192, 203),
    PLUM = 134 => (221, 160, 221),
    POWDERBLUE = 135 => (176, 224, 230),
    PURPLE = 136 => (128, 0, 128),
    ROSYBROWN = 137 => (188, 143, 143),
    ROYALBLUE = 138 => (65, 105, 225),
    SADDLEBROWN = 139 => (139, 69, 19),
    SALMON = 140 => (250, 128, 114),
    SANDYBROWN = 141 => (244, 164, 96),
    SEAGREEN = 142 => (46, 139, 87),
    SEASHELL = 143 => (255, 245, 238),
    SIENNA = 144 => (160, 82, 45),
    SILVER = 145 => (192, 192, 192),
    SKYBLUE = 146 => (135, 206, 235),
    SLATEGRAY = 147 => (112, 128, 144),
    SLATEGREY = 148 => (112, 128, 144),
    SNOW = 149 => (255, 250, 250),
    STEELBLUE = 150 => (70, 130, 180),
    TAN = 151 => (210, 180, 140),
    TEAL = 152 => (0, 128, 128),
    THISTLE = 153 => (216, 191, 216),
    TURQUOISE = 154 => (64, 224, 208),
    VIOLET = 155 => (238, 130, 238),
    WHITESMOKE = 156 => (245, 245, 245),
    YELLOWGREEN = 157 => (154, 205, 50),
}

/// Mutable copy of the built-in color table owned by one document context
#[derive(Clone, Debug)]
pub struct ColorMap {
    entries: Vec<ColorEntry>,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ColorMap {
    /// Fresh table with the built-in values
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|&(name, index, rgb)| ColorEntry { name, index, rgb })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// RGB value of a symbolic index (first matching row wins)
    pub fn query(&self, index: ColorIndex) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .map(|e| e.rgb)
    }

    /// Table name of a symbolic index
    pub fn name_of(&self, index: ColorIndex) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .map(|e| e.name)
    }

    /// Exact, case-sensitive name lookup
    pub fn find(&self, name: &str) -> Option<ColorIndex> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.index)
    }

    /// Name lookup falling back to reading the string as an integer index
    ///
    /// Like C `atoi`, leading whitespace and an optional sign are accepted,
    /// trailing garbage is ignored and a string without digits yields 0.
    pub fn lookup(&self, name: &str) -> ColorIndex {
        if let Some(index) = self.find(name) {
            return index;
        }
        let index = parse_leading_int(name);
        debug!("color {name:?} not in table, using index {index}");
        ColorIndex(index as u32)
    }

    /// `v' = 0.4 + 255 * (v / 255)^(1 / gamma)` on every channel of every entry
    pub fn apply_gamma(&mut self, gamma: f32) -> PsResult<()> {
        if gamma.abs() < MIN_GAMMA || !gamma.is_finite() {
            return Err(PsError::BadGamma(gamma));
        }

        let exponent = 1.0 / gamma as f64;
        let adjust = |v: u8| -> u8 {
            let out = 0.4 + 255.0 * (v as f64 / 255.0).powf(exponent);
            out.clamp(0.0, 255.0) as u8
        };

        for entry in &mut self.entries {
            let before = entry.rgb;
            entry.rgb = Rgb::new(adjust(before.r), adjust(before.g), adjust(before.b));
            trace!(name = entry.name, ?before, after = ?entry.rgb, "gamma");
        }
        Ok(())
    }
}

fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add((d - b'0') as i64)
        });
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_indices_follow_toolkit_order() {
        assert_eq!(ColorIndex::BLACK, ColorIndex(0));
        assert_eq!(ColorIndex::RED, ColorIndex(1));
        assert_eq!(ColorIndex::WHITE, ColorIndex(7));
        assert_eq!(ColorIndex::COL1, ColorIndex(11));
        assert_eq!(ColorIndex::LEFT_BCOL, ColorIndex(15));
        assert_eq!(ColorIndex::DODGERBLUE, ColorIndex::DOGERBLUE);
        assert_eq!(ColorIndex::ALICEBLUE, ColorIndex(32));
        assert!(ColorIndex::YELLOWGREEN < ColorIndex::FREE_COL1);
    }

    #[test]
    fn query_returns_table_values() {
        let map = ColorMap::builtin();
        assert_eq!(map.query(ColorIndex::TOMATO), Some(Rgb::new(255, 99, 71)));
        assert_eq!(map.query(ColorIndex::COL1), Some(Rgb::gray(161)));
        assert_eq!(map.query(ColorIndex::FREE_COL1), None);
        assert_eq!(map.name_of(ColorIndex::DODGERBLUE), Some("FL_DODGERBLUE"));
    }

    #[test]
    fn lookup_by_name_and_fallback() {
        let map = ColorMap::builtin();
        assert_eq!(map.lookup("FL_RED"), ColorIndex::RED);
        assert_eq!(map.lookup("FL_DOGERBLUE"), ColorIndex::DODGERBLUE);
        assert_eq!(map.lookup("42"), ColorIndex(42));
        assert_eq!(map.lookup("  300xyz"), ColorIndex(300));
        // Case-sensitive: no match, no digits
        assert_eq!(map.lookup("fl_red"), ColorIndex(0));
    }

    #[test]
    fn gamma_one_is_identity() {
        let mut map = ColorMap::builtin();
        map.apply_gamma(1.0).unwrap();
        for (entry, original) in map.entries().iter().zip(ColorMap::builtin().entries()) {
            assert_eq!(entry.rgb, original.rgb, "{}", entry.name);
        }
    }

    #[test]
    fn gamma_round_trip_stays_within_one() {
        let mut map = ColorMap::builtin();
        map.apply_gamma(2.0).unwrap();
        map.apply_gamma(0.5).unwrap();
        for (entry, original) in map.entries().iter().zip(ColorMap::builtin().entries()) {
            for (a, b) in [
                (entry.rgb.r, original.rgb.r),
                (entry.rgb.g, original.rgb.g),
                (entry.rgb.b, original.rgb.b),
            ] {
                assert!(
                    (a as i32 - b as i32).abs() <= 2,
                    "{}: {a} vs {b}",
                    entry.name
                );
            }
        }
    }

    #[test]
    fn gamma_brightens_midtones() {
        let mut map = ColorMap::builtin();
        map.apply_gamma(2.0).unwrap();
        let gray = map.query(ColorIndex::GRAY).unwrap();
        // 255 * sqrt(128 / 255) = 180.66
        assert_eq!(gray, Rgb::gray(181));
        assert_eq!(map.query(ColorIndex::BLACK), Some(Rgb::BLACK));
        assert_eq!(map.query(ColorIndex::WHITE), Some(Rgb::WHITE));
    }

    #[test]
    fn near_zero_gamma_is_rejected_and_table_untouched() {
        let mut map = ColorMap::builtin();
        let err = map.apply_gamma(0.0001).unwrap_err();
        assert!(matches!(err, PsError::BadGamma(_)));
        assert_eq!(map.query(ColorIndex::GRAY), Some(Rgb::gray(128)));
    }
}
