//! Symbol engine
//!
//! Symbols are small iconographic glyphs (arrows, plus signs, ripples) drawn
//! from a label such as `"@#8->"`. A label is `@`, then any number of
//! modifiers, then an optional rotation, then the symbol name:
//!
//! | token        | meaning                                             |
//! |--------------|-----------------------------------------------------|
//! | `-d` / `+d`  | shrink / grow the glyph box by `d` units per side   |
//! | `#`          | square glyph box (the smaller of width and height)  |
//! | `1`..`9`     | compass rotation, laid out like a numeric keypad    |
//! | `0ddd`       | literal rotation angle in degrees                   |
//!
//! An empty name selects the first registered symbol.
//!
//! Path symbols are PostScript procedures defined lazily, once per document,
//! in a unit square centered at the origin. Native symbols are Rust drawers
//! working either in that unit square or in absolute device coordinates.

use std::fmt;
use std::io::Write;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::color::{ColorIndex, PsColor};
use crate::context::PsContext;
use crate::draw::Canvas;
use crate::error::{PsError, PsResult};
use crate::glyphs;
use crate::macros::emit;
use crate::state::CacheSlot;

/// Rotation for the single-digit shorthand; `5` and `6` mean no rotation
const KEYPAD_ROTATIONS: [i32; 10] = [0, 225, 270, 315, 180, 0, 0, 135, 90, 45];

/// Smallest glyph box edge after insets
pub const MIN_GLYPH_SIZE: f32 = 5.0;

/// Border trimmed off every side of the requested box
const GLYPH_MARGIN: f32 = 1.2;

/// Frame a native drawer paints into
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    /// Lower-left corner of the (inset, possibly squared) box
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Rotation in degrees
    pub angle: i32,
    pub color: PsColor,
}

impl Glyph {
    pub fn center(&self) -> (f32, f32) {
        (self.x + 0.5 * self.w, self.y + 0.5 * self.h)
    }
}

/// Native symbol drawer
pub type DrawFn = fn(&mut dyn Canvas, &Glyph) -> PsResult<()>;

/// Coordinate system a native drawer works in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordSpace {
    /// `[-1, 1]` square, already translated, scaled and rotated
    UnitSquare,
    /// Device coordinates; the drawer handles rotation itself
    Absolute,
}

/// How a symbol is drawn
#[derive(Clone, Copy)]
pub enum SymbolBody {
    /// PostScript path building a closed outline in the unit square
    Program(&'static str),
    /// Another symbol drawn after an extra transformation
    Alias {
        target: &'static str,
        transform: &'static str,
    },
    Native { draw: DrawFn, space: CoordSpace },
}

impl fmt::Debug for SymbolBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolBody::Program(program) => f.debug_tuple("Program").field(program).finish(),
            SymbolBody::Alias { target, transform } => f
                .debug_struct("Alias")
                .field("target", target)
                .field("transform", transform)
                .finish(),
            SymbolBody::Native { space, .. } => {
                f.debug_struct("Native").field("space", space).finish_non_exhaustive()
            }
        }
    }
}

/// One registered symbol
#[derive(Clone, Copy, Debug)]
pub struct SymbolDef {
    pub name: &'static str,
    /// Name of the PostScript procedure holding the path
    pub macro_name: &'static str,
    pub body: SymbolBody,
}

impl SymbolDef {
    pub const fn program(name: &'static str, macro_name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            macro_name,
            body: SymbolBody::Program(path),
        }
    }

    /// Mirror of `target`, rotated half a turn
    pub const fn mirror(name: &'static str, target: &'static str) -> Self {
        Self {
            name,
            macro_name: "",
            body: SymbolBody::Alias {
                target,
                transform: "180 rotate",
            },
        }
    }

    pub const fn native(
        name: &'static str,
        macro_name: &'static str,
        draw: DrawFn,
        space: CoordSpace,
    ) -> Self {
        Self {
            name,
            macro_name,
            body: SymbolBody::Native { draw, space },
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(
            self.body,
            SymbolBody::Native {
                space: CoordSpace::Absolute,
                ..
            }
        )
    }
}

/// A symbol with its alias chain followed to the end
#[derive(Clone, Debug)]
pub struct Resolved {
    /// The concrete, non-alias descriptor
    pub def: SymbolDef,
    /// Transformations picked up along the way, outermost first
    pub transforms: SmallVec<[&'static str; 2]>,
}

/// Ordered symbol registry
#[derive(Clone, Debug)]
pub struct SymbolTable {
    entries: IndexMap<&'static str, SymbolDef>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SymbolTable {
    /// Registry without any symbols
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// The standard toolkit symbols; `returnarrow` is the default
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for def in builtin_symbols() {
            table.register(def);
        }
        table
    }

    /// Add a symbol, replacing one of the same name in place
    pub fn register(&mut self, def: SymbolDef) -> Option<SymbolDef> {
        debug!(name = def.name, "register symbol");
        self.entries.insert(def.name, def)
    }

    pub fn get(&self, name: &str) -> Option<&SymbolDef> {
        self.entries.get(name)
    }

    /// First registered symbol, drawn for labels without a name
    pub fn default_symbol(&self) -> Option<&SymbolDef> {
        self.entries.first().map(|(_, def)| def)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up `name` and follow alias links to a concrete descriptor
    pub fn resolve(&self, name: &str) -> PsResult<Resolved> {
        let start = if name.is_empty() {
            self.default_symbol()
        } else {
            self.get(name)
        };
        let mut def = *start.ok_or_else(|| PsError::UnknownSymbol(name.to_string()))?;
        let mut transforms = SmallVec::new();

        for _ in 0..=self.entries.len() {
            match def.body {
                SymbolBody::Alias { target, transform } => {
                    transforms.push(transform);
                    def = *self
                        .get(target)
                        .ok_or_else(|| PsError::UnknownSymbol(target.to_string()))?;
                }
                _ => return Ok(Resolved { def, transforms }),
            }
        }
        Err(PsError::AliasCycle(name.to_string()))
    }
}

/// Parsed form of a symbol label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolLabel<'a> {
    /// Positive shrinks, negative grows
    pub delta: i32,
    pub equal_scale: bool,
    pub rotation: i32,
    pub name: &'a str,
}

impl<'a> SymbolLabel<'a> {
    /// `None` unless the label starts with `@`
    pub fn parse(label: &'a str) -> Option<Self> {
        let bytes = label.as_bytes();
        if bytes.first() != Some(&b'@') {
            return None;
        }

        let mut parsed = SymbolLabel {
            delta: 0,
            equal_scale: false,
            rotation: 0,
            name: "",
        };
        let mut pos = 1;

        loop {
            let digit = bytes
                .get(pos + 1)
                .filter(|d| d.is_ascii_digit())
                .map(|d| i32::from(d - b'0'));
            match (bytes.get(pos).copied(), digit) {
                (Some(b'+'), Some(d)) => {
                    parsed.delta = -d;
                    pos += 2;
                }
                (Some(b'-'), Some(d)) => {
                    parsed.delta = d;
                    pos += 2;
                }
                (Some(b'#'), _) => {
                    parsed.equal_scale = true;
                    pos += 1;
                }
                _ => break,
            }
        }

        match bytes.get(pos).copied() {
            Some(d @ b'1'..=b'9') => {
                parsed.rotation = KEYPAD_ROTATIONS[usize::from(d - b'0')];
                pos += 1;
            }
            Some(b'0') => {
                let angle = bytes
                    .get(pos + 1..pos + 4)
                    .filter(|ds| ds.iter().all(u8::is_ascii_digit));
                match angle {
                    Some(ds) => {
                        parsed.rotation = ds.iter().fold(0, |a, d| a * 10 + i32::from(d - b'0'));
                        pos += 4;
                    }
                    None => pos += 1,
                }
            }
            _ => {}
        }

        parsed.name = &label[pos..];
        Some(parsed)
    }
}

impl<W: Write> PsContext<W> {
    /// Emit the procedure behind a path symbol unless this document has it
    fn define_symbol(&mut self, def: &SymbolDef) -> PsResult<()> {
        if let SymbolBody::Program(path) = def.body {
            if self.cache.define(def.macro_name) {
                debug!(symbol = def.name, "defining symbol macro");
                emit!(self, "/{} {{{}}} BD\n", def.macro_name, path)?;
            } else {
                trace!(symbol = def.name, "symbol macro already defined");
            }
        }
        Ok(())
    }

    /// Draw the symbol named by `label` into the `w` x `h` box at `(x, y)`
    ///
    /// Returns `Ok(false)` when nothing was drawn: the label does not start
    /// with `@` or names an unknown symbol.
    pub fn draw_symbol(
        &mut self,
        label: &str,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: impl Into<PsColor>,
    ) -> PsResult<bool> {
        let Some(parsed) = SymbolLabel::parse(label) else {
            return Ok(false);
        };
        let color = color.into();

        if self.config.verbose {
            self.comment(&format!("Symbol {}: {x} {y} {w} {h}", &label[1..]))?;
        }

        let Resolved { def, transforms } = match self.symbols.resolve(parsed.name) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("{e}");
                if self.config.verbose {
                    self.comment(&format!(" unknown symbol {label}. Not drawn"))?;
                }
                return Ok(false);
            }
        };
        self.define_symbol(&def)?;

        let x = x as f32 + GLYPH_MARGIN;
        let y = y as f32 + GLYPH_MARGIN;
        let w = w as f32 - 2.0 * GLYPH_MARGIN;
        let h = h as f32 - 2.0 * GLYPH_MARGIN;
        let (cx, cy) = (x + 0.5 * w, y + 0.5 * h);

        let (mut sw, mut sh) = (w, h);
        if parsed.equal_scale {
            sw = w.min(h);
            sh = sw;
        }
        let delta = 2.0 * parsed.delta as f32;
        sw = (sw - delta).max(MIN_GLYPH_SIZE);
        sh = (sh - delta).max(MIN_GLYPH_SIZE);

        let unit_square = !def.is_absolute();
        if unit_square {
            emit!(
                self,
                "gsave\n{:.1} {:.1} translate {:.1} {:.1} scale {} rotate ",
                cx,
                cy,
                0.5 * sw,
                0.5 * sh,
                parsed.rotation
            )?;
            emit!(self, "{:.3} LW\n", 3.0 / (sw + sh))?;
        }

        match def.body {
            SymbolBody::Native { draw, .. } => {
                let glyph = Glyph {
                    x: cx - 0.5 * sw,
                    y: cy - 0.5 * sh,
                    w: sw,
                    h: sh,
                    angle: parsed.rotation,
                    color,
                };
                draw(self, &glyph)?;
                if unit_square {
                    emit!(self, "grestore\n")?;
                }
            }
            _ => {
                for transform in &transforms {
                    emit!(self, "{} ", transform)?;
                }
                self.set_color(color)?;
                emit!(self, "{} F ", def.macro_name)?;
                self.set_color(ColorIndex::BLACK)?;
                emit!(self, "{} S\n", def.macro_name)?;
                emit!(self, "grestore\n")?;
            }
        }

        // colors set inside gsave are gone after grestore
        self.cache.invalidate(CacheSlot::Color);
        Ok(true)
    }
}

fn builtin_symbols() -> [SymbolDef; 28] {
    use CoordSpace::{Absolute, UnitSquare};

    const PLUS: &str = "-0.9 -0.13 -0.9 0.13 -0.13 0.13 -0.13 0.9 0.13 0.9 0.13 0.13 0.9 0.13\n\
                        0.9 -0.13 0.13 -0.13 0.13 -0.9 -0.13 -0.9 -0.13 -0.13 12 P";
    const THIN_ARROW: &str = "-0.9 0.02 M 0.65 0.02 LT 0.65 0.15 LT 0.9 0 LT 0.65 -0.15 LT\n\
                              0.65 -0.02 LT -0.9 -0.02 LT C";

    [
        SymbolDef::program(
            "returnarrow",
            "symreturnarrow",
            "-0.8 0.0 -0.1 0.7 -0.1 0.05 0.6 0.05 0.6 0.7 0.7 0.7 0.7 -0.05\n\
             -0.1 -0.05 -0.1 -0.7 9 P",
        ),
        SymbolDef::program(
            "->",
            "symrarrow",
            "-0.8 -0.4 -0.8 0.4 0 0.4 0 0.8 0.8 0 0 -0.8 0 -0.4 7 P",
        ),
        SymbolDef::mirror("<-", "->"),
        SymbolDef::program(">", "symrarrowh", "-0.2 0.7 M 0.5 0.0 LT -0.2 -0.7 LT C"),
        SymbolDef::mirror("<", ">"),
        SymbolDef::program(
            "<->",
            "symdarrow",
            "-0.25 0.4 0.25 0.4 0.25 0.8 0.85 0 0.25 -0.8 0.25 -0.4 -0.25 -0.4\n\
             -0.25 -0.8 -0.85 0 -0.25 0.8 10 P",
        ),
        SymbolDef::program("plus", "symplus", PLUS),
        SymbolDef::program(
            ">>",
            "symdarrowh",
            "0.15 0.7 0.85 0 0.15 -0.7 0.15 -0.001 -0.55 -0.7 -0.55 0.7 0.15 0.001\n\
             7 P",
        ),
        SymbolDef::mirror("<<", ">>"),
        SymbolDef::program("arrow", "symthinarrow", THIN_ARROW),
        SymbolDef::program("circle", "symcircle", "0 0 0.77 0 360 arc"),
        SymbolDef::program(
            "square",
            "symsquare",
            "-0.77 -0.77 M -0.77 0.77 LT 0.77 0.77 LT 0.77 -0.77 LT C",
        ),
        SymbolDef::program(
            "line",
            "symline",
            "-0.97 0.01 M  0.97 0.01 LT 0.97 -0.01 LT -0.08 -0.01 LT C",
        ),
        SymbolDef::program(
            "->|",
            "symarrowbar",
            "-0.75 0.35 -0.1 0.35 -0.1 0.75 0.6 0.001 0.6 0.75 0.75 0.75\n \
             0.75 -0.75 0.6 -0.75 0.6 -0.001 -0.1 -0.75 -0.1 -0.35 -0.75 -0.35 12 P\n",
        ),
        SymbolDef::mirror("|<-", "->|"),
        SymbolDef::program(
            ">|",
            "symarrowheadbar",
            "-0.60 0.7 0.22 0.001 0.22 0.7 0.47 0.7 0.47 -0.7 0.22 -0.7\n \
             0.22 -0.001 -0.60 -0.7 8 P",
        ),
        SymbolDef::mirror("|<", ">|"),
        SymbolDef::native("|>", "symbararrowhead", glyphs::bar_arrowhead, Absolute),
        SymbolDef::native("DnLine", "symdnline", glyphs::down_line, UnitSquare),
        SymbolDef::native("dnline", "symdnline", glyphs::down_line, UnitSquare),
        SymbolDef::native("UpLine", "symupline", glyphs::up_line, UnitSquare),
        SymbolDef::native("upline", "symupline", glyphs::up_line, UnitSquare),
        SymbolDef::native("UpArrow", "symuparrow", glyphs::up_arrow, Absolute),
        SymbolDef::native("DnArrow", "symdnarrow", glyphs::down_arrow, Absolute),
        SymbolDef::native("=", "symRippleLines", glyphs::ripple_lines, Absolute),
        SymbolDef::native("RippleLines", "symRippleLines", glyphs::ripple_lines, Absolute),
        SymbolDef::program("+", "symplus", PLUS),
        SymbolDef::program("-->", "symthinarrow", THIN_ARROW),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PsConfig;
    use pretty_assertions::assert_eq;

    fn ctx(verbose: bool) -> PsContext<Vec<u8>> {
        PsContext::new(
            Vec::new(),
            PsConfig {
                pack: false,
                verbose,
                ..PsConfig::default()
            },
        )
    }

    fn text(ps: PsContext<Vec<u8>>) -> String {
        String::from_utf8(ps.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn label_modifiers_and_rotation() {
        let l = SymbolLabel::parse("@-2#8->").unwrap();
        assert_eq!(
            l,
            SymbolLabel {
                delta: 2,
                equal_scale: true,
                rotation: 90,
                name: "->"
            }
        );

        let l = SymbolLabel::parse("@+30045circle").unwrap();
        assert_eq!((l.delta, l.rotation, l.name), (-3, 45, "circle"));
    }

    #[test]
    fn keypad_digits_map_to_compass_angles() {
        let angles: Vec<i32> = (1..=9)
            .map(|d| {
                let label = format!("@{d}->");
                SymbolLabel::parse(&label).unwrap().rotation
            })
            .collect();
        assert_eq!(angles, vec![225, 270, 315, 180, 0, 0, 135, 90, 45]);
    }

    #[test]
    fn names_starting_with_dash_are_not_modifiers() {
        let l = SymbolLabel::parse("@-->").unwrap();
        assert_eq!((l.delta, l.name), (0, "-->"));
        let l = SymbolLabel::parse("@->").unwrap();
        assert_eq!(l.name, "->");
    }

    #[test]
    fn bare_zero_is_no_rotation() {
        let l = SymbolLabel::parse("@0plus").unwrap();
        assert_eq!((l.rotation, l.name), (0, "plus"));
    }

    #[test]
    fn builtin_table_lists_default_first() {
        let table = SymbolTable::builtin();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names.len(), 28);
        assert_eq!(names[0], "returnarrow");
        assert!(names.contains(&"RippleLines"));
    }

    #[test]
    fn labels_need_the_marker() {
        assert_eq!(SymbolLabel::parse("->"), None);
        assert_eq!(SymbolLabel::parse(""), None);
        assert_eq!(SymbolLabel::parse("@").unwrap().name, "");
    }

    #[test]
    fn builtin_table_order_and_aliases() {
        let table = SymbolTable::builtin();
        assert_eq!(table.len(), 28);
        assert_eq!(table.default_symbol().unwrap().name, "returnarrow");

        let r = table.resolve("|<-").unwrap();
        assert_eq!(r.def.name, "->|");
        assert_eq!(r.transforms.as_slice(), &["180 rotate"]);

        assert!(table.resolve("->").unwrap().transforms.is_empty());
        assert!(matches!(
            table.resolve("nope"),
            Err(PsError::UnknownSymbol(n)) if n == "nope"
        ));
    }

    #[test]
    fn alias_cycles_are_detected() {
        let mut table = SymbolTable::empty();
        table.register(SymbolDef::mirror("a", "b"));
        table.register(SymbolDef::mirror("b", "a"));
        assert!(matches!(table.resolve("a"), Err(PsError::AliasCycle(_))));
    }

    #[test]
    fn path_symbol_output() {
        let mut ps = ctx(false);
        assert!(ps.draw_symbol("@->", 0, 0, 20, 20, ColorIndex::RED).unwrap());
        assert_eq!(ps.current_color(), None);
        assert_eq!(
            text(ps),
            "/symrarrow {-0.8 -0.4 -0.8 0.4 0 0.4 0 0.8 0.8 0 0 -0.8 0 -0.4 7 P} BD\n\
             gsave\n10.0 10.0 translate 8.8 8.8 scale 0 rotate 0.085 LW\n\
             1 0 0 RGB symrarrow F 0 G symrarrow S\ngrestore\n"
        );
    }

    #[test]
    fn mirrored_symbol_rotates_its_target() {
        let mut ps = ctx(false);
        ps.draw_symbol("@<-", 0, 0, 20, 20, ColorIndex::RED).unwrap();
        let out = text(ps);
        assert!(out.starts_with("/symrarrow {"));
        assert!(out.contains("0 rotate 0.085 LW\n180 rotate 1 0 0 RGB symrarrow F "));
    }

    #[test]
    fn equal_scale_and_inset_shrink_the_box() {
        let mut ps = ctx(false);
        ps.draw_symbol("@-2#circle", 0, 0, 40, 20, ColorIndex::BLACK)
            .unwrap();
        // box 37.6 x 17.6, squared to 17.6, then 2 units off each side
        assert!(text(ps).contains("translate 6.8 6.8 scale 0 rotate"));
    }

    #[test]
    fn tiny_boxes_are_clamped() {
        let mut ps = ctx(false);
        ps.draw_symbol("@square", 0, 0, 4, 4, ColorIndex::BLACK)
            .unwrap();
        assert!(text(ps).contains("translate 2.5 2.5 scale"));
    }

    #[test]
    fn unknown_symbol_draws_nothing() {
        let mut ps = ctx(true);
        assert!(!ps.draw_symbol("@bogus", 1, 2, 3, 4, ColorIndex::RED).unwrap());
        assert!(!ps.draw_symbol("bogus", 1, 2, 3, 4, ColorIndex::RED).unwrap());
        assert_eq!(
            text(ps),
            "%Symbol bogus: 1 2 3 4\n% unknown symbol @bogus. Not drawn\n"
        );
    }

    #[test]
    fn native_unit_square_symbol_restores_state() {
        let mut ps = ctx(false);
        ps.draw_symbol("@DnLine", 0, 0, 20, 20, ColorIndex::RED)
            .unwrap();
        let out = text(ps);
        assert!(out.starts_with("gsave\n"));
        assert!(out.ends_with("grestore\n"));
        assert!(!out.contains(" BD\n"));
    }
}
