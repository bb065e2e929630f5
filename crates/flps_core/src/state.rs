//! Device state cache
//!
//! Mirrors what the PostScript interpreter currently has set so that
//! repeated requests for the same color, width or dash pattern emit nothing.
//! A `None` slot means "unknown": the next request always emits.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{PsError, PsResult};
use crate::text::FontStyle;

/// Thinnest stroke that still shows up on paper
pub const MIN_LINE_WIDTH: f32 = 0.4;

/// Device units to PostScript line width
pub const LINE_WIDTH_FACTOR: f32 = 0.9;

/// Dash pattern of stroked lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    UserDash,
    UserDoubleDash,
    Dot,
    DotDash,
    Dash,
    LongDash,
}

impl LineStyle {
    /// Map a toolkit line style code; `-1` is an alias for solid
    pub fn from_code(code: i32) -> PsResult<Self> {
        Ok(match code {
            -1 | 0 => LineStyle::Solid,
            1 => LineStyle::UserDash,
            2 => LineStyle::UserDoubleDash,
            3 => LineStyle::Dot,
            4 => LineStyle::DotDash,
            5 => LineStyle::Dash,
            6 => LineStyle::LongDash,
            other => return Err(PsError::UnknownLineStyle(other)),
        })
    }

    pub fn code(self) -> i32 {
        match self {
            LineStyle::Solid => 0,
            LineStyle::UserDash => 1,
            LineStyle::UserDoubleDash => 2,
            LineStyle::Dot => 3,
            LineStyle::DotDash => 4,
            LineStyle::Dash => 5,
            LineStyle::LongDash => 6,
        }
    }

    /// User dash patterns have no printed equivalent and print solid
    pub fn normalized(self) -> Self {
        match self {
            LineStyle::UserDash | LineStyle::UserDoubleDash => LineStyle::Solid,
            other => other,
        }
    }

    /// Prolog operator selecting this pattern
    pub fn operator(self) -> &'static str {
        match self.normalized() {
            LineStyle::Dot => "DT",
            LineStyle::DotDash => "DTD",
            LineStyle::Dash => "D",
            LineStyle::LongDash => "LD",
            _ => "SL",
        }
    }
}

/// Individually invalidatable parts of the cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheSlot {
    Color,
    LineWidth,
    LineStyle,
    Font,
    Symbols,
    All,
}

/// Last values sent to the interpreter
#[derive(Clone, Debug)]
pub struct StateCache {
    color: Option<u32>,
    line_width: Option<f32>,
    previous_line_width: Option<f32>,
    line_style: Option<LineStyle>,
    font: Option<(FontStyle, u32)>,
    defined: FxHashSet<&'static str>,
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCache {
    /// State of a freshly started interpreter: only the dash pattern is known
    pub fn new() -> Self {
        Self {
            color: None,
            line_width: None,
            previous_line_width: None,
            line_style: Some(LineStyle::Solid),
            font: None,
            defined: FxHashSet::default(),
        }
    }

    pub fn invalidate(&mut self, slot: CacheSlot) {
        trace!(?slot, "invalidate cache");
        match slot {
            CacheSlot::Color => self.color = None,
            CacheSlot::LineWidth => self.line_width = None,
            CacheSlot::LineStyle => self.line_style = None,
            CacheSlot::Font => self.font = None,
            CacheSlot::Symbols => self.defined.clear(),
            CacheSlot::All => {
                self.color = None;
                self.line_width = None;
                self.line_style = None;
                self.font = None;
                self.defined.clear();
            }
        }
    }

    pub fn color(&self) -> Option<u32> {
        self.color
    }

    /// Record `packed`; true when it differs from the cached color
    pub fn update_color(&mut self, packed: u32) -> bool {
        if self.color == Some(packed) {
            return false;
        }
        self.color = Some(packed);
        true
    }

    pub fn line_width(&self) -> Option<f32> {
        self.line_width
    }

    pub fn previous_line_width(&self) -> Option<f32> {
        self.previous_line_width
    }

    /// Record `width`, remembering the displaced one; true when it changed
    pub fn update_line_width(&mut self, width: f32) -> bool {
        if self.line_width == Some(width) {
            return false;
        }
        self.previous_line_width = self.line_width;
        self.line_width = Some(width);
        true
    }

    pub fn line_style(&self) -> Option<LineStyle> {
        self.line_style
    }

    pub fn update_line_style(&mut self, style: LineStyle) -> bool {
        let style = style.normalized();
        if self.line_style == Some(style) {
            return false;
        }
        self.line_style = Some(style);
        true
    }

    pub fn font(&self) -> Option<(FontStyle, u32)> {
        self.font
    }

    pub fn update_font(&mut self, style: FontStyle, size: u32) -> bool {
        if self.font == Some((style, size)) {
            return false;
        }
        self.font = Some((style, size));
        true
    }

    pub fn is_defined(&self, macro_name: &str) -> bool {
        self.defined.contains(macro_name)
    }

    /// Mark a macro as emitted; true the first time
    pub fn define(&mut self, macro_name: &'static str) -> bool {
        self.defined.insert(macro_name)
    }
}

/// PostScript line width for a device width
pub fn printed_line_width(width: f32) -> f32 {
    (LINE_WIDTH_FACTOR * width).max(MIN_LINE_WIDTH)
}
