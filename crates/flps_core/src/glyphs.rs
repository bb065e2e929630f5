//! Native symbol drawers
//!
//! Beveled glyphs need pixel-exact edges, which the unit-square transform
//! cannot give, so most of these work in device coordinates and pick the
//! bevel color of every edge from the rotation themselves.

use crate::color::{ColorIndex, PsColor};
use crate::draw::{Canvas, DrawMode};
use crate::error::PsResult;
use crate::geometry::Point;
use crate::symbol::Glyph;

/// Border width of a bounding frame
const BOUND_WIDTH: f32 = 1.0;

/// Ripple lines are dropped below this box height
const MIN_RIPPLE_HEIGHT: f32 = 14.0;

fn edge(
    canvas: &mut dyn Canvas,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    color: ColorIndex,
) -> PsResult<()> {
    canvas.line(Point::from_f32(x0, y0), Point::from_f32(x1, y1), color.into())
}

/// Inset of the arrow triangles from the glyph box
fn arrow_inset(g: &Glyph) -> f32 {
    (3.0 + (g.w + g.h) * 0.06).trunc()
}

/// Engraved horizontal rule, unit square
pub fn down_line(canvas: &mut dyn Canvas, g: &Glyph) -> PsResult<()> {
    let size = g.w + g.h;
    let t = 0.2;
    let len = if size > 200.0 {
        0.99
    } else if size > 150.0 {
        0.98
    } else {
        0.93
    };

    canvas.emit_ps(format_args!("{:.2} LW ", 3.5 / size))?;
    canvas.set_color(ColorIndex::RIGHT_BCOL.into())?;
    canvas.emit_ps(format_args!("-{len:.3} {t:.2} M {len:.3} {t:.2} LT S\n"))?;
    canvas.set_color(ColorIndex::LEFT_BCOL.into())?;
    canvas.emit_ps(format_args!("-{len:.3} -{t:.2} M {len:.3} -{t:.2} LT S\n"))
}

/// Embossed horizontal rule, unit square
pub fn up_line(canvas: &mut dyn Canvas, g: &Glyph) -> PsResult<()> {
    let t = 0.033;

    canvas.set_color(ColorIndex::LEFT_BCOL.into())?;
    canvas.emit_ps(format_args!("{:.3} LW ", 3.7 / (g.w + g.h)))?;
    canvas.emit_ps(format_args!("-0.9 {t:.3} M 0.9 {t:.3} LT S\n"))?;
    canvas.set_color(ColorIndex::RIGHT_BCOL.into())?;
    canvas.emit_ps(format_args!("0.9 -{t:.3} M 0.9 {t:.3} LT S "))?;
    canvas.emit_ps(format_args!("-0.9 -{t:.3} M 0.9 -{t:.3} LT S\n"))
}

/// Raised triangular arrow
pub fn up_arrow(canvas: &mut dyn Canvas, g: &Glyph) -> PsResult<()> {
    use ColorIndex as C;

    let (xc, yc) = g.center();
    let d = arrow_inset(g);
    let dx = 0.5 * g.w - d;
    let dy = 0.5 * g.h - d;

    match g.angle {
        90 => {
            edge(canvas, (xc, yc + dy), (xc - dx, yc - dy), C::LEFT_BCOL)?;
            edge(canvas, (xc - dx, yc - dy), (xc + dx, yc - dy), C::BOTTOM_BCOL)?;
            edge(canvas, (xc + dx, yc - dy), (xc, yc + dy), C::RIGHT_BCOL)
        }
        180 => {
            edge(canvas, (xc - dx, yc), (xc + dx, yc + dy), C::TOP_BCOL)?;
            edge(canvas, (xc + dx, yc + dy), (xc + dx, yc - dy), C::RIGHT_BCOL)?;
            edge(canvas, (xc + dx, yc - dy), (xc - dx, yc), C::BOTTOM_BCOL)
        }
        270 => {
            edge(canvas, (xc - dx, yc + dy), (xc, yc - dy), C::BOTTOM_BCOL)?;
            edge(canvas, (xc, yc - dy), (xc + dx, yc + dy), C::RIGHT_BCOL)?;
            edge(canvas, (xc + dx, yc + dy), (xc - dx, yc + dy), C::TOP_BCOL)
        }
        _ => {
            edge(canvas, (xc, yc - dy), (xc + dx, yc), C::BOTTOM_BCOL)?;
            edge(canvas, (xc, yc + dy), (xc + dx, yc), C::RIGHT_BCOL)?;
            edge(canvas, (xc, yc - dy), (xc, yc + dy), C::LEFT_BCOL)
        }
    }
}

/// Sunken triangular arrow
pub fn down_arrow(canvas: &mut dyn Canvas, g: &Glyph) -> PsResult<()> {
    use ColorIndex as C;

    let (xc, yc) = g.center();
    let d = arrow_inset(g);
    let dx = 0.5 * g.w - d;
    let dy = 0.5 * g.h - d;

    match g.angle {
        90 => {
            edge(canvas, (xc, yc + dy), (xc - dx, yc - dy), C::RIGHT_BCOL)?;
            edge(canvas, (xc - dx, yc - dy), (xc + dx, yc - dy), C::TOP_BCOL)?;
            edge(canvas, (xc + dx, yc - dy), (xc, yc + dy), C::TOP_BCOL)
        }
        180 => {
            edge(canvas, (xc - dx, yc), (xc + dx, yc + dy), C::RIGHT_BCOL)?;
            edge(canvas, (xc + dx, yc + dy), (xc + dx, yc - dy), C::LEFT_BCOL)?;
            edge(canvas, (xc + dx, yc - dy), (xc - dx, yc), C::TOP_BCOL)
        }
        270 => {
            edge(canvas, (xc - dx, yc + dy), (xc, yc - dy), C::RIGHT_BCOL)?;
            edge(canvas, (xc, yc - dy), (xc + dx, yc + dy), C::LEFT_BCOL)?;
            edge(canvas, (xc + dx, yc + dy), (xc - dx, yc + dy), C::BOTTOM_BCOL)
        }
        _ => {
            edge(canvas, (xc - dx, yc - dy), (xc - dx, yc + dy), C::RIGHT_BCOL)?;
            edge(canvas, (xc - dx, yc - dy), (xc + dx, yc), C::TOP_BCOL)?;
            edge(canvas, (xc - dx, yc + dy), (xc + dx, yc), C::BOTTOM_BCOL)
        }
    }
}

/// Three engraved grip lines across the box
pub fn ripple_lines(canvas: &mut dyn Canvas, g: &Glyph) -> PsResult<()> {
    if g.h < MIN_RIPPLE_HEIGHT {
        return Ok(());
    }

    let (xm, ym) = g.center();
    let mw = BOUND_WIDTH;

    if g.angle == 90 || g.angle == 270 {
        let (y0, y1) = (g.y + mw, g.y + g.h - mw - 1.0);
        let mut xs = xm.trunc() + 5.0;
        for _ in 0..3 {
            edge(canvas, (xs, y0), (xs, y1), ColorIndex::RIGHT_BCOL)?;
            xs -= 1.0;
            edge(canvas, (xs, y0), (xs, y1), ColorIndex::LEFT_BCOL)?;
            xs -= 3.0;
        }
    } else {
        let (x0, x1) = (g.x + mw, g.x + g.w - mw - 1.0);
        let mut ys = ym.trunc() + 5.0;
        for _ in 0..3 {
            edge(canvas, (x0, ys), (x1, ys), ColorIndex::LEFT_BCOL)?;
            ys -= 1.0;
            edge(canvas, (x0, ys), (x1, ys), ColorIndex::RIGHT_BCOL)?;
            ys -= 3.0;
        }
    }
    Ok(())
}

/// Bar followed by a filled arrowhead, rotated in place
pub fn bar_arrowhead(canvas: &mut dyn Canvas, g: &Glyph) -> PsResult<()> {
    let (xc, yc) = g.center();
    let d = arrow_inset(g);
    let dx = (0.5 * (g.w - 2.0 * d)).trunc();
    let dy = (0.5 * (g.h - 2.0 * d)).trunc();

    let dbar = dx * 0.4;
    let mar = 0.2 * dx;
    let xl = -dx + 1.1 * mar;
    let outline = PsColor::from(ColorIndex::RIGHT_BCOL);

    canvas.emit_ps(format_args!(
        "gsave {:.1} {:.1} translate {} rotate\n",
        xc, yc, g.angle
    ))?;

    let bar = [
        Point::from_f32(xl, -dy),
        Point::from_f32(xl + dbar, -dy),
        Point::from_f32(xl + dbar, dy),
        Point::from_f32(xl, dy),
    ];
    canvas.polygon(DrawMode::Fill, &bar, g.color)?;
    canvas.polygon(DrawMode::Stroke, &bar, outline)?;

    let head = [
        Point::from_f32(-mar, -dy),
        Point::from_f32(-mar + dx, 0.0),
        Point::from_f32(-mar, dy),
    ];
    canvas.polygon(DrawMode::Fill, &head, g.color)?;
    canvas.polygon(DrawMode::Stroke, &head, outline)?;

    canvas.emit_ps(format_args!("grestore\n"))
}
