//! Device context - the state of one PostScript document
//!
//! Every drawing entry point is a method on [`PsContext`]. There is no global
//! "current device": a caller printing several documents at once keeps one
//! context per document, or parks one with [`PsContext::switch`] and brings it
//! back with [`PsContext::restore`].
//!
//! ```
//! use flps_core::{ColorIndex, DrawMode, PsConfig, PsContext};
//!
//! let mut ps = PsContext::new(Vec::new(), PsConfig::default());
//! ps.rectangle(DrawMode::Fill, 10, 10, 50, 30, ColorIndex::RED)?;
//! ps.circle(DrawMode::Stroke, 100, 100, 20, ColorIndex::RED)?;
//! let out = String::from_utf8(ps.into_inner()?).unwrap();
//! assert_eq!(out.matches("RGB").count(), 1);
//! # Ok::<(), flps_core::PsError>(())
//! ```

use std::fmt;
use std::io::Write;

use tracing::{debug, trace, warn};

use crate::color::{ColorIndex, ColorMode, PsColor, Rgb, BW_THRESHOLD};
use crate::colormap::ColorMap;
use crate::config::PsConfig;
use crate::emit::{Emitter, G};
use crate::error::{PsError, PsResult};
use crate::macros::emit;
use crate::state::{printed_line_width, CacheSlot, LineStyle, StateCache};
use crate::symbol::SymbolTable;

/// One PostScript document being written
pub struct PsContext<W: Write> {
    pub(crate) out: Emitter<W>,
    pub(crate) config: PsConfig,
    pub(crate) cache: StateCache,
    pub(crate) colors: ColorMap,
    pub(crate) symbols: SymbolTable,
    pub(crate) clip_depth: usize,
    pub(crate) landscape: bool,
}

impl<W: Write> PsContext<W> {
    /// Create the device state for a new document writing to `sink`
    ///
    /// The sink stays owned by the caller in the sense that the context never
    /// opens or closes anything; get it back with [`PsContext::into_inner`].
    pub fn new(sink: W, config: PsConfig) -> Self {
        let mut colors = ColorMap::builtin();
        if config.gamma != 1.0 {
            if let Err(e) = colors.apply_gamma(config.gamma) {
                warn!("{e}, color table left unchanged");
            }
        }

        Self {
            out: Emitter::new(sink, config.pack),
            landscape: matches!(config.orientation, crate::config::Orientation::Landscape),
            config,
            cache: StateCache::new(),
            colors,
            symbols: SymbolTable::builtin(),
            clip_depth: 0,
        }
    }

    pub fn with_defaults(sink: W) -> Self {
        Self::new(sink, PsConfig::default())
    }

    /// Make `next` the active document, returning the one it displaces
    pub fn switch(&mut self, next: PsContext<W>) -> PsContext<W> {
        debug!("switching device context");
        std::mem::replace(self, next)
    }

    /// Bring back a context parked by [`PsContext::switch`]
    ///
    /// Returns the alternate context that was active until now.
    pub fn restore(&mut self, saved: PsContext<W>) -> PsContext<W> {
        debug!("restoring device context");
        std::mem::replace(self, saved)
    }

    pub fn config(&self) -> &PsConfig {
        &self.config
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    /// Number of clip regions currently pushed
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    pub fn is_landscape(&self) -> bool {
        self.landscape
    }

    /// Peek at the sink, e.g. to inspect an in-memory buffer
    ///
    /// Text still sitting on an unterminated packed line is already in the
    /// sink; only the final newline may be missing.
    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }

    /// Flush and hand back the sink
    pub fn into_inner(self) -> PsResult<W> {
        Ok(self.out.into_inner()?)
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Write formatted text through the packer
    pub fn emit(&mut self, args: fmt::Arguments<'_>) -> PsResult<()> {
        Ok(self.out.write_fmt(args)?)
    }

    /// End the current line
    pub fn flush(&mut self) -> PsResult<()> {
        Ok(self.out.flush_line()?)
    }

    /// Write `%text` on a line of its own
    pub fn comment(&mut self, text: &str) -> PsResult<()> {
        self.out.flush_line()?;
        for line in text.lines() {
            self.out.raw_fmt(format_args!("%{line}\n"))?;
        }
        Ok(())
    }

    // =========================================================================
    // Cache
    // =========================================================================

    /// Forget every cached attribute and defined symbol macro
    pub fn reset_cache(&mut self) {
        self.cache.invalidate(CacheSlot::All);
    }

    pub fn invalidate(&mut self, slot: CacheSlot) {
        self.cache.invalidate(slot);
    }

    // =========================================================================
    // Line attributes
    // =========================================================================

    /// Set the stroke width in device units
    ///
    /// Pairs with [`PsContext::reset_line_width`], which restores the width
    /// in effect before this call.
    pub fn set_line_width(&mut self, width: f32) -> PsResult<()> {
        if !self.cache.update_line_width(width) {
            trace!(width, "line width cache hit");
            return Ok(());
        }
        emit!(self, " {:.1} LW\n", printed_line_width(width))
    }

    /// Restore the width that was current before the last change
    pub fn reset_line_width(&mut self) -> PsResult<()> {
        match self.cache.previous_line_width() {
            Some(previous) => self.set_line_width(previous)?,
            None => self.cache.invalidate(CacheSlot::LineWidth),
        }
        if self.config.verbose {
            self.comment("resetline")?;
        }
        Ok(())
    }

    pub fn line_width(&self) -> Option<f32> {
        self.cache.line_width()
    }

    pub fn set_line_style(&mut self, style: LineStyle) -> PsResult<()> {
        if !self.cache.update_line_style(style) {
            return Ok(());
        }
        emit!(self, "{} ", style.operator())
    }

    /// Set the dash style from a raw toolkit code
    ///
    /// Unknown codes are reported and leave the current style active.
    pub fn set_line_style_code(&mut self, code: i32) -> PsResult<()> {
        match LineStyle::from_code(code) {
            Ok(style) => self.set_line_style(style),
            Err(e) => {
                warn!("{e}");
                Ok(())
            }
        }
    }

    /// Current dash style, solid when unknown
    pub fn line_style(&self) -> LineStyle {
        self.cache.line_style().unwrap_or_default()
    }

    // =========================================================================
    // Color
    // =========================================================================

    /// RGB value of a color request; unknown indices print black
    pub fn resolve_color(&self, color: PsColor) -> Rgb {
        match color {
            PsColor::Rgb(rgb) => rgb,
            PsColor::Index(index) => self.colors.query(index).unwrap_or_else(|| {
                debug!(?index, "color index not in table, using black");
                Rgb::BLACK
            }),
        }
    }

    /// Make `color` current, emitting only if it differs from the cached one
    pub fn set_color(&mut self, color: impl Into<PsColor>) -> PsResult<()> {
        let color = color.into();
        if color.is_none() {
            return Ok(());
        }
        let rgb = self.resolve_color(color);
        self.set_rgb(rgb)
    }

    pub fn set_rgb(&mut self, rgb: Rgb) -> PsResult<()> {
        if !self.cache.update_color(rgb.pack()) {
            trace!(?rgb, "color cache hit");
            return Ok(());
        }

        let [r, g, b] = rgb.to_unit();
        let gray = rgb.luma() / 255.0;
        match self.config.color_mode {
            ColorMode::Color if !rgb.is_gray() => {
                emit!(self, "{} {} {} RGB ", G(r, 3), G(g, 3), G(b, 3))
            }
            ColorMode::BlackWhite => emit!(self, "{} G ", u8::from(gray > BW_THRESHOLD)),
            _ => emit!(self, "{} G ", G(gray, 3)),
        }
    }

    /// Color the interpreter currently has, if known
    pub fn current_color(&self) -> Option<Rgb> {
        self.cache.color().map(Rgb::unpack)
    }

    /// Gray-equivalent brightness (0-255) of a color
    pub fn gray255(&self, color: impl Into<PsColor>) -> u8 {
        self.resolve_color(color.into()).gray255()
    }

    /// Color table index for a name, or the name read as a number
    pub fn named_color(&self, name: &str) -> ColorIndex {
        self.colors.lookup(name)
    }

    /// Gamma-correct this document's color table
    ///
    /// Returns `false`, leaving the table unchanged, for a near-zero gamma.
    pub fn apply_gamma(&mut self, gamma: f32) -> bool {
        match self.colors.apply_gamma(gamma) {
            Ok(()) => {
                self.cache.invalidate(CacheSlot::Color);
                true
            }
            Err(e @ PsError::BadGamma(_)) => {
                warn!("{e}");
                false
            }
            Err(e) => {
                warn!("gamma not applied: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unpacked(config: PsConfig) -> PsContext<Vec<u8>> {
        PsContext::new(
            Vec::new(),
            PsConfig {
                pack: false,
                ..config
            },
        )
    }

    fn text(ps: PsContext<Vec<u8>>) -> String {
        String::from_utf8(ps.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn identical_colors_emit_once() {
        let mut ps = unpacked(PsConfig::default());
        for _ in 0..5 {
            ps.set_color(ColorIndex::RED).unwrap();
        }
        ps.set_color(Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(text(ps), "1 0 0 RGB ");
    }

    #[test]
    fn no_color_is_ignored() {
        let mut ps = unpacked(PsConfig::default());
        ps.set_color(ColorIndex::NONE).unwrap();
        assert_eq!(ps.current_color(), None);
        assert_eq!(text(ps), "");
    }

    #[test]
    fn grays_use_setgray_even_in_color_mode() {
        let mut ps = unpacked(PsConfig::default());
        ps.set_color(ColorIndex::COL1).unwrap();
        ps.set_color(ColorIndex::BLACK).unwrap();
        assert_eq!(text(ps), "0.631 G 0 G ");
    }

    #[test]
    fn grayscale_mode_converts_by_luma() {
        let mut ps = unpacked(PsConfig {
            color_mode: ColorMode::Grayscale,
            ..PsConfig::default()
        });
        ps.set_color(ColorIndex::RED).unwrap();
        assert_eq!(text(ps), "0.299 G ");
    }

    #[test]
    fn black_white_threshold_is_strict() {
        let mut ps = unpacked(PsConfig {
            color_mode: ColorMode::BlackWhite,
            ..PsConfig::default()
        });
        ps.set_rgb(Rgb::gray(158)).unwrap();
        ps.set_rgb(Rgb::gray(159)).unwrap();
        ps.set_rgb(Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(text(ps), "0 G 1 G 0 G ");
    }

    #[test]
    fn line_width_pairs_restore_previous() {
        let mut ps = unpacked(PsConfig::default());
        ps.set_line_width(1.0).unwrap();
        ps.set_line_width(3.0).unwrap();
        ps.set_line_width(3.0).unwrap();
        ps.reset_line_width().unwrap();
        assert_eq!(ps.line_width(), Some(1.0));
        ps.set_line_width(0.2).unwrap();
        assert_eq!(text(ps), " 0.9 LW\n 2.7 LW\n 0.9 LW\n 0.4 LW\n");
    }

    #[test]
    fn reset_without_history_only_invalidates() {
        let mut ps = unpacked(PsConfig::default());
        ps.reset_line_width().unwrap();
        assert_eq!(ps.line_width(), None);
        assert_eq!(text(ps), "");
    }

    #[test]
    fn line_style_cache_and_bad_codes() {
        let mut ps = unpacked(PsConfig::default());
        ps.set_line_style(LineStyle::Solid).unwrap();
        ps.set_line_style(LineStyle::Dot).unwrap();
        ps.set_line_style_code(42).unwrap();
        assert_eq!(ps.line_style(), LineStyle::Dot);
        ps.set_line_style_code(-1).unwrap();
        assert_eq!(ps.line_style(), LineStyle::Solid);
        assert_eq!(text(ps), "DT SL ");
    }

    #[test]
    fn reset_cache_forces_reemission() {
        let mut ps = unpacked(PsConfig::default());
        ps.set_color(ColorIndex::BLUE).unwrap();
        ps.reset_cache();
        ps.set_color(ColorIndex::BLUE).unwrap();
        assert_eq!(text(ps), "0 0 1 RGB 0 0 1 RGB ");
    }

    #[test]
    fn gamma_changes_colors_and_drops_color_cache() {
        let mut ps = unpacked(PsConfig::default());
        ps.set_color(ColorIndex::GRAY).unwrap();
        assert!(ps.apply_gamma(2.0));
        assert_eq!(ps.current_color(), None);
        assert_eq!(ps.gray255(ColorIndex::GRAY), 181);
        assert!(!ps.apply_gamma(0.0));
        assert_eq!(ps.gray255(ColorIndex::GRAY), 181);
    }

    #[test]
    fn named_color_lookup() {
        let ps = unpacked(PsConfig::default());
        assert_eq!(ps.named_color("FL_TOMATO"), ColorIndex::TOMATO);
        assert_eq!(ps.named_color("17"), ColorIndex::INACTIVE);
    }

    #[test]
    fn comment_ends_packed_line() {
        let mut ps = PsContext::with_defaults(Vec::new());
        ps.emit(format_args!("1 2 M")).unwrap();
        ps.comment("hello").unwrap();
        ps.emit(format_args!("S")).unwrap();
        assert_eq!(text(ps), "1 2 M\n%hello\nS\n");
    }

    #[test]
    fn switch_and_restore_keep_documents_apart() {
        let mut active = unpacked(PsConfig::default());
        active.set_color(ColorIndex::RED).unwrap();

        let parked = active.switch(unpacked(PsConfig::default()));
        active.set_color(ColorIndex::RED).unwrap();
        assert_eq!(parked.current_color(), Some(Rgb::new(255, 0, 0)));

        let second = active.restore(parked);
        active.set_color(ColorIndex::RED).unwrap();
        assert_eq!(text(second), "1 0 0 RGB ");
        assert_eq!(text(active), "1 0 0 RGB ");
    }
}
