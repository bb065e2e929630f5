//! Font registration and text placement
//!
//! Only the mapping from toolkit font styles to PostScript face names lives
//! here. There are no metrics: centering and right alignment are left to the
//! `Cshow`/`Rshow` prolog procedures, which measure on the printer.

use std::borrow::Cow;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::color::PsColor;
use crate::context::PsContext;
use crate::error::PsResult;
use crate::macros::emit;

/// Toolkit font styles in code order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
    Fixed,
    FixedBold,
    FixedItalic,
    FixedBoldItalic,
    Times,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Misc,
    Symbol,
}

impl FontStyle {
    pub const ALL: [FontStyle; 14] = [
        FontStyle::Normal,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
        FontStyle::Fixed,
        FontStyle::FixedBold,
        FontStyle::FixedItalic,
        FontStyle::FixedBoldItalic,
        FontStyle::Times,
        FontStyle::TimesBold,
        FontStyle::TimesItalic,
        FontStyle::TimesBoldItalic,
        FontStyle::Misc,
        FontStyle::Symbol,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// PostScript face name
    pub fn face(self) -> &'static str {
        match self {
            FontStyle::Normal => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
            FontStyle::BoldItalic => "Helvetica-BoldOblique",
            FontStyle::Fixed => "Courier",
            FontStyle::FixedBold => "Courier-Bold",
            FontStyle::FixedItalic => "Courier-Oblique",
            FontStyle::FixedBoldItalic => "Courier-BoldOblique",
            FontStyle::Times => "Times-Roman",
            FontStyle::TimesBold => "Times-Bold",
            FontStyle::TimesItalic => "Times-Italic",
            FontStyle::TimesBoldItalic => "Times-BoldItalic",
            FontStyle::Misc => "Charter-Roman",
            FontStyle::Symbol => "Symbol",
        }
    }
}

/// Horizontal anchoring of a text run at its reference point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    fn operator(self) -> &'static str {
        match self {
            TextAlign::Left => "Lshow",
            TextAlign::Center => "Cshow",
            TextAlign::Right => "Rshow",
        }
    }
}

/// Backslash-escape the characters that are special inside `( ... )`
pub fn escape_literal(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '(' | ')' | '\\')) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        if matches!(ch, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

impl<W: Write> PsContext<W> {
    /// Select a face and size through the font cache
    pub fn set_font(&mut self, style: FontStyle, size: u32) -> PsResult<()> {
        if !self.cache.update_font(style, size) {
            trace!(?style, size, "font cache hit");
            return Ok(());
        }
        emit!(self, "{} point /{} SetFont\n", size, style.face())
    }

    /// Show `text` anchored at `(x, y)`
    pub fn draw_text(
        &mut self,
        align: TextAlign,
        x: i32,
        y: i32,
        text: &str,
        color: impl Into<PsColor>,
    ) -> PsResult<()> {
        self.set_color(color)?;
        emit!(
            self,
            "{} {} M ({}) {}\n",
            x,
            y,
            escape_literal(text),
            align.operator()
        )
    }
}
