//! Primitive drawing
//!
//! `(x, y)` and `(w, h)` are in the PostScript coordinate system, in points.
//! Every shape first makes its color current through the state cache.

use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::PsColor;
use crate::context::PsContext;
use crate::error::PsResult;
use crate::geometry::{Point, Rect};
use crate::macros::emit;
use crate::state::CacheSlot;

/// Longest point list handed to the interpreter in one go
///
/// Some interpreters run out of operand stack on long coordinate lists.
pub const MAX_BATCH: usize = 350;

/// Points per output line inside a coordinate list
const POINTS_PER_LINE: usize = 6;

/// Whether a closed shape is outlined or filled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    #[default]
    Stroke,
    Fill,
}

impl DrawMode {
    pub fn from_fill(fill: bool) -> Self {
        if fill {
            DrawMode::Fill
        } else {
            DrawMode::Stroke
        }
    }

    /// Painting operator defined by the prolog
    pub fn operator(self) -> char {
        match self {
            DrawMode::Stroke => 'S',
            DrawMode::Fill => 'F',
        }
    }
}

/// Split a polyline into overlapping batches of at most [`MAX_BATCH`] points
///
/// Every batch after the first starts with the last point of the previous one
/// so the path stays connected; those batches hold one extra point.
pub fn batches(points: &[Point]) -> Vec<&[Point]> {
    let n = points.len();
    let full = n / MAX_BATCH;
    let rest = n % MAX_BATCH;
    let mut out = Vec::with_capacity(full + usize::from(rest > 0));

    for b in 0..full {
        let back = usize::from(b > 0);
        let start = b * MAX_BATCH - back;
        out.push(&points[start..start + MAX_BATCH + back]);
    }
    if rest > 0 {
        let back = usize::from(full > 0);
        let start = full * MAX_BATCH - back;
        out.push(&points[start..]);
    }
    out
}

/// Drawing surface handed to native symbol drawers
pub trait Canvas {
    /// Write raw PostScript
    fn emit_ps(&mut self, args: fmt::Arguments<'_>) -> PsResult<()>;

    fn set_color(&mut self, color: PsColor) -> PsResult<()>;

    fn line(&mut self, from: Point, to: Point, color: PsColor) -> PsResult<()>;

    fn polygon(&mut self, mode: DrawMode, points: &[Point], color: PsColor) -> PsResult<()>;
}

impl<W: Write> Canvas for PsContext<W> {
    fn emit_ps(&mut self, args: fmt::Arguments<'_>) -> PsResult<()> {
        self.emit(args)
    }

    fn set_color(&mut self, color: PsColor) -> PsResult<()> {
        PsContext::set_color(self, color)
    }

    fn line(&mut self, from: Point, to: Point, color: PsColor) -> PsResult<()> {
        PsContext::line(self, from, to, color)
    }

    fn polygon(&mut self, mode: DrawMode, points: &[Point], color: PsColor) -> PsResult<()> {
        PsContext::polygon(self, mode, points, color)
    }
}

impl<W: Write> PsContext<W> {
    fn emit_points(&mut self, points: &[Point]) -> PsResult<()> {
        for (i, p) in points.iter().enumerate() {
            emit!(self, "{} {} ", p.x, p.y)?;
            if (i + 1) % POINTS_PER_LINE == 0 {
                emit!(self, "\n")?;
            }
        }
        Ok(())
    }

    /// Stroke a single segment
    pub fn line(&mut self, from: Point, to: Point, color: impl Into<PsColor>) -> PsResult<()> {
        self.set_color(color)?;
        emit!(self, "{} {} {} {} L S\n", to.x, to.y, from.x, from.y)
    }

    /// Stroke an open polyline, batched around interpreter stack limits
    pub fn lines(&mut self, points: &[Point], color: impl Into<PsColor>) -> PsResult<()> {
        let color = color.into();
        let chunks = batches(points);
        if chunks.len() > 1 {
            debug!(points = points.len(), batches = chunks.len(), "splitting polyline");
        }
        for chunk in chunks {
            self.set_color(color)?;
            self.emit_points(chunk)?;
            emit!(self, "{} lines\n", chunk.len())?;
        }
        Ok(())
    }

    /// Stroke or fill a closed polygon
    pub fn polygon(
        &mut self,
        mode: DrawMode,
        points: &[Point],
        color: impl Into<PsColor>,
    ) -> PsResult<()> {
        self.set_color(color)?;
        self.emit_points(points)?;
        emit!(self, "{} P {}\n", points.len(), mode.operator())
    }

    /// Stroke or fill the `w` x `h` rectangle at `(x, y)`
    pub fn rectangle(
        &mut self,
        mode: DrawMode,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: impl Into<PsColor>,
    ) -> PsResult<()> {
        self.set_color(color)?;
        let [a, b, c, d] = Rect::new(x, y, w, h).corners();
        emit!(
            self,
            "{} {} {} {} {} {} {} {} 4 P",
            a.x,
            a.y,
            b.x,
            b.y,
            c.x,
            c.y,
            d.x,
            d.y
        )?;
        emit!(self, " {}\n", mode.operator())
    }

    /// Ellipse inscribed in the `w` x `h` box at `(x, y)`
    pub fn oval(
        &mut self,
        mode: DrawMode,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: impl Into<PsColor>,
    ) -> PsResult<()> {
        self.pie_slice(mode, x, y, w, h, 0, 3600, color)
    }

    /// Full circle of radius `r` centered at `(x, y)`
    pub fn circle(
        &mut self,
        mode: DrawMode,
        x: i32,
        y: i32,
        r: i32,
        color: impl Into<PsColor>,
    ) -> PsResult<()> {
        self.set_color(color)?;
        emit!(self, "newpath {} {} {} 0 360 arc {}\n", x, y, r, mode.operator())
    }

    /// Circular arc; `t1` and `t2` are in tenths of a degree
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        mode: DrawMode,
        x: i32,
        y: i32,
        r: i32,
        t1: i32,
        t2: i32,
        color: impl Into<PsColor>,
    ) -> PsResult<()> {
        self.set_color(color)?;
        emit!(
            self,
            "newpath {} {} {} {:.1} {:.1} arc {}\n",
            x,
            y,
            r,
            t1 as f32 * 0.1,
            t2 as f32 * 0.1,
            mode.operator()
        )
    }

    /// Elliptical arc in the `w` x `h` box; filled it becomes a pie slice
    ///
    /// The ellipse is a circle of radius `w / 2` scaled vertically by `h / w`
    /// inside a saved graphics state. `t1` and `t2` are tenths of a degree.
    #[allow(clippy::too_many_arguments)]
    pub fn pie_slice(
        &mut self,
        mode: DrawMode,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        t1: i32,
        t2: i32,
        color: impl Into<PsColor>,
    ) -> PsResult<()> {
        if w == 0 {
            debug!(x, y, h, "zero-width oval, nothing drawn");
            return Ok(());
        }

        let sy = h as f32 / w as f32;
        let radius = w as f32 * 0.5;
        let (a1, a2) = (t1 as f32 * 0.1, t2 as f32 * 0.1);

        self.set_color(color)?;
        emit!(
            self,
            "gsave newpath {:.1} {:.1} translate {:.1} {:.1} scale\n",
            x as f32 + 0.5 * w as f32,
            y as f32 + 0.5 * h as f32,
            1.0f32,
            sy
        )?;
        match mode {
            DrawMode::Stroke => emit!(self, "0 0 {:.1} {:.1} {:.1} arc S grestore\n", radius, a1, a2)?,
            DrawMode::Fill => emit!(
                self,
                "0 0 M 0 0 {:.1} {:.1} {:.1} arc C F grestore\n",
                radius,
                a1,
                a2
            )?,
        }

        // grestore brought back whatever color was current before gsave
        self.cache.invalidate(CacheSlot::Color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorIndex;
    use crate::config::PsConfig;
    use pretty_assertions::assert_eq;

    fn ctx() -> PsContext<Vec<u8>> {
        PsContext::new(
            Vec::new(),
            PsConfig {
                pack: false,
                ..PsConfig::default()
            },
        )
    }

    fn text(ps: PsContext<Vec<u8>>) -> String {
        String::from_utf8(ps.into_inner().unwrap()).unwrap()
    }

    fn pts(n: usize) -> Vec<Point> {
        (0..n as i32).map(|i| Point::new(i, 2 * i)).collect()
    }

    #[test]
    fn short_lists_are_one_batch() {
        for n in [0usize, 1, 349, 350] {
            let points = pts(n);
            let b = batches(&points);
            assert_eq!(b.len(), usize::from(n > 0), "n={n}");
        }
    }

    #[test]
    fn long_lists_overlap_by_one_point() {
        for n in [351usize, 700, 701, 1050, 1234] {
            let points = pts(n);
            let b = batches(&points);
            assert_eq!(b.len(), n.div_ceil(MAX_BATCH), "n={n}");
            assert_eq!(b[0].len(), MAX_BATCH);
            for k in 1..b.len() {
                assert_eq!(b[k][0], *b[k - 1].last().unwrap(), "n={n} k={k}");
            }
            assert_eq!(b.last().unwrap().last(), points.last());
            let distinct: usize = b.iter().map(|c| c.len()).sum::<usize>() - (b.len() - 1);
            assert_eq!(distinct, n);
        }
    }

    #[test]
    fn line_is_end_point_first() {
        let mut ps = ctx();
        ps.line(Point::new(1, 2), Point::new(3, 4), ColorIndex::BLACK)
            .unwrap();
        assert_eq!(text(ps), "0 G 3 4 1 2 L S\n");
    }

    #[test]
    fn lines_break_every_six_points() {
        let mut ps = ctx();
        ps.lines(&pts(7), ColorIndex::BLACK).unwrap();
        assert_eq!(
            text(ps),
            "0 G 0 0 1 2 2 4 3 6 4 8 5 10 \n6 12 7 lines\n"
        );
    }

    #[test]
    fn long_polyline_emits_one_command_per_batch() {
        let mut ps = ctx();
        ps.lines(&pts(800), ColorIndex::BLACK).unwrap();
        let out = text(ps);
        assert_eq!(out.matches(" lines\n").count(), 3);
        assert!(out.contains("350 lines\n"));
        assert!(out.contains("351 lines\n"));
        assert!(out.contains("101 lines\n"));
        assert_eq!(out.matches("G ").count(), 1);
    }

    #[test]
    fn polygon_is_not_split() {
        let mut ps = ctx();
        ps.polygon(DrawMode::Fill, &pts(400), ColorIndex::BLACK)
            .unwrap();
        let out = text(ps);
        assert!(out.ends_with("400 P F\n"));
        assert_eq!(out.matches(" P ").count(), 1);
    }

    #[test]
    fn rectangle_uses_generic_polygon() {
        let mut ps = ctx();
        ps.rectangle(DrawMode::Stroke, 10, 10, 50, 30, ColorIndex::BLUE)
            .unwrap();
        assert_eq!(text(ps), "0 0 1 RGB 10 10 10 39 59 39 59 10 4 P S\n");
    }

    #[test]
    fn arc_angles_are_tenths_of_degrees() {
        let mut ps = ctx();
        ps.arc(DrawMode::Stroke, 5, 6, 7, 450, 900, ColorIndex::BLACK)
            .unwrap();
        assert_eq!(text(ps), "0 G newpath 5 6 7 45.0 90.0 arc S\n");
    }

    #[test]
    fn filled_pie_slice_scales_a_circle() {
        let mut ps = ctx();
        ps.pie_slice(DrawMode::Fill, 0, 0, 40, 20, 0, 900, ColorIndex::RED)
            .unwrap();
        assert_eq!(ps.current_color(), None);
        assert_eq!(
            text(ps),
            "1 0 0 RGB gsave newpath 20.0 10.0 translate 1.0 0.5 scale\n\
             0 0 M 0 0 20.0 0.0 90.0 arc C F grestore\n"
        );
    }

    #[test]
    fn oval_is_full_pie_slice_outline() {
        let mut ps = ctx();
        ps.oval(DrawMode::Stroke, 0, 0, 10, 10, ColorIndex::BLACK)
            .unwrap();
        assert!(text(ps).ends_with("0 0 5.0 0.0 360.0 arc S grestore\n"));
    }

    #[test]
    fn zero_width_oval_draws_nothing() {
        let mut ps = ctx();
        ps.oval(DrawMode::Fill, 0, 0, 0, 10, ColorIndex::BLACK)
            .unwrap();
        assert_eq!(text(ps), "");
    }
}
