//! Serializable drawing commands
//!
//! A [`DrawCommand`] is one call on [`PsContext`] in data form, so a whole
//! page can be described in TOML or JSON and replayed:
//!
//! ```toml
//! [[page.draw]]
//! op = "rectangle"
//! x = 10
//! y = 10
//! w = 50
//! h = 30
//! fill = true
//! color = "FL_RED"
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::{ColorIndex, PsColor, Rgb};
use crate::colormap::ColorMap;
use crate::context::PsContext;
use crate::draw::DrawMode;
use crate::error::{PsError, PsResult};
use crate::geometry::Point;
use crate::state::LineStyle;
use crate::text::{FontStyle, TextAlign};

/// A color as written in a command: table name, table index or `[r, g, b]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Index(u32),
    Rgb(Rgb),
    Name(String),
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Index(ColorIndex::BLACK.0)
    }
}

impl ColorSpec {
    /// Resolve against a color table
    ///
    /// Names may omit the `FL_` prefix and are matched case-insensitively.
    pub fn resolve(&self, colors: &ColorMap) -> PsResult<PsColor> {
        match self {
            ColorSpec::Index(i) => Ok(ColorIndex(*i).into()),
            ColorSpec::Rgb(rgb) => Ok((*rgb).into()),
            ColorSpec::Name(name) => {
                let upper = name.to_ascii_uppercase();
                let full = if upper.starts_with("FL_") {
                    upper
                } else {
                    format!("FL_{upper}")
                };
                colors
                    .find(&full)
                    .map(PsColor::from)
                    .ok_or_else(|| PsError::UnknownColor(name.clone()))
            }
        }
    }
}

impl From<ColorIndex> for ColorSpec {
    fn from(index: ColorIndex) -> Self {
        ColorSpec::Index(index.0)
    }
}

/// One drawing or state call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Line {
        from: Point,
        to: Point,
        #[serde(default)]
        color: ColorSpec,
    },
    Lines {
        points: Vec<Point>,
        #[serde(default)]
        color: ColorSpec,
    },
    Polygon {
        points: Vec<Point>,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        color: ColorSpec,
    },
    Rectangle {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        color: ColorSpec,
    },
    Oval {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        color: ColorSpec,
    },
    Circle {
        x: i32,
        y: i32,
        r: i32,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        color: ColorSpec,
    },
    /// Angles in tenths of a degree
    Arc {
        x: i32,
        y: i32,
        r: i32,
        t1: i32,
        t2: i32,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        color: ColorSpec,
    },
    PieSlice {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        t1: i32,
        t2: i32,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        color: ColorSpec,
    },
    Symbol {
        label: String,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        #[serde(default)]
        color: ColorSpec,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        #[serde(default)]
        align: TextAlign,
        #[serde(default)]
        color: ColorSpec,
    },
    Font {
        #[serde(default)]
        style: FontStyle,
        size: u32,
    },
    LineWidth {
        width: f32,
    },
    ResetLineWidth,
    LineStyle {
        style: LineStyle,
    },
    Color {
        color: ColorSpec,
    },
    Clip {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    },
    Unclip,
    Comment {
        text: String,
    },
}

impl<W: Write> PsContext<W> {
    fn command_color(&self, spec: &ColorSpec) -> Option<PsColor> {
        match spec.resolve(&self.colors) {
            Ok(color) => Some(color),
            Err(e) => {
                warn!("{e}, command skipped");
                None
            }
        }
    }

    /// Apply one command
    ///
    /// A command naming an unknown color is skipped with a warning; only
    /// output failures are returned as errors.
    pub fn execute(&mut self, command: &DrawCommand) -> PsResult<()> {
        use DrawCommand as C;

        let color = match command {
            C::Line { color, .. }
            | C::Lines { color, .. }
            | C::Polygon { color, .. }
            | C::Rectangle { color, .. }
            | C::Oval { color, .. }
            | C::Circle { color, .. }
            | C::Arc { color, .. }
            | C::PieSlice { color, .. }
            | C::Symbol { color, .. }
            | C::Text { color, .. }
            | C::Color { color } => match self.command_color(color) {
                Some(c) => c,
                None => return Ok(()),
            },
            _ => PsColor::NONE,
        };

        match command {
            C::Line { from, to, .. } => self.line(*from, *to, color),
            C::Lines { points, .. } => self.lines(points, color),
            C::Polygon { points, fill, .. } => {
                self.polygon(DrawMode::from_fill(*fill), points, color)
            }
            C::Rectangle {
                x, y, w, h, fill, ..
            } => self.rectangle(DrawMode::from_fill(*fill), *x, *y, *w, *h, color),
            C::Oval {
                x, y, w, h, fill, ..
            } => self.oval(DrawMode::from_fill(*fill), *x, *y, *w, *h, color),
            C::Circle { x, y, r, fill, .. } => {
                self.circle(DrawMode::from_fill(*fill), *x, *y, *r, color)
            }
            C::Arc {
                x,
                y,
                r,
                t1,
                t2,
                fill,
                ..
            } => self.arc(DrawMode::from_fill(*fill), *x, *y, *r, *t1, *t2, color),
            C::PieSlice {
                x,
                y,
                w,
                h,
                t1,
                t2,
                fill,
                ..
            } => self.pie_slice(DrawMode::from_fill(*fill), *x, *y, *w, *h, *t1, *t2, color),
            C::Symbol {
                label, x, y, w, h, ..
            } => self.draw_symbol(label, *x, *y, *w, *h, color).map(|_| ()),
            C::Text {
                x, y, text, align, ..
            } => self.draw_text(*align, *x, *y, text, color),
            C::Font { style, size } => self.set_font(*style, *size),
            C::LineWidth { width } => self.set_line_width(*width),
            C::ResetLineWidth => self.reset_line_width(),
            C::LineStyle { style } => self.set_line_style(*style),
            C::Color { .. } => self.set_color(color),
            C::Clip { x, y, w, h } => self.push_clip(*x, *y, *w, *h),
            C::Unclip => self.pop_clip(),
            C::Comment { text } => self.comment(text),
        }
    }

    /// Apply commands in order
    pub fn execute_all<'a>(
        &mut self,
        commands: impl IntoIterator<Item = &'a DrawCommand>,
    ) -> PsResult<()> {
        for command in commands {
            self.execute(command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PsConfig;
    use pretty_assertions::assert_eq;

    #[derive(Deserialize)]
    struct Page {
        draw: Vec<DrawCommand>,
    }

    #[test]
    fn color_spec_forms() {
        let colors = ColorMap::builtin();
        let spec = |s: &str| ColorSpec::Name(s.to_string()).resolve(&colors);

        assert_eq!(spec("FL_RED").unwrap(), PsColor::from(ColorIndex::RED));
        assert_eq!(spec("tomato").unwrap(), PsColor::from(ColorIndex::TOMATO));
        assert!(matches!(spec("sepia"), Err(PsError::UnknownColor(_))));
        assert_eq!(
            ColorSpec::Rgb(Rgb::new(1, 2, 3)).resolve(&colors).unwrap(),
            PsColor::Rgb(Rgb::new(1, 2, 3))
        );
    }

    #[test]
    fn commands_from_toml() {
        let page: Page = toml::from_str(
            r#"
[[draw]]
op = "rectangle"
x = 10
y = 10
w = 50
h = 30
fill = true
color = "red"

[[draw]]
op = "line_width"
width = 2.0

[[draw]]
op = "lines"
points = [[0, 0], [5, 5]]
color = [0, 128, 255]

[[draw]]
op = "reset_line_width"
"#,
        )
        .unwrap();

        assert_eq!(
            page.draw[0],
            DrawCommand::Rectangle {
                x: 10,
                y: 10,
                w: 50,
                h: 30,
                fill: true,
                color: ColorSpec::Name("red".into())
            }
        );
        assert_eq!(
            page.draw[2],
            DrawCommand::Lines {
                points: vec![Point::new(0, 0), Point::new(5, 5)],
                color: ColorSpec::Rgb(Rgb::new(0, 128, 255))
            }
        );
        assert_eq!(page.draw[3], DrawCommand::ResetLineWidth);
    }

    #[test]
    fn replay_matches_direct_calls() {
        let config = PsConfig {
            pack: false,
            ..PsConfig::default()
        };
        let commands = [
            DrawCommand::Rectangle {
                x: 10,
                y: 10,
                w: 50,
                h: 30,
                fill: true,
                color: ColorIndex::RED.into(),
            },
            DrawCommand::Circle {
                x: 100,
                y: 100,
                r: 20,
                fill: false,
                color: ColorSpec::Name("FL_RED".into()),
            },
            DrawCommand::Symbol {
                label: "@->".into(),
                x: 0,
                y: 0,
                w: 20,
                h: 20,
                color: ColorIndex::BLUE.into(),
            },
        ];

        let mut replayed = PsContext::new(Vec::new(), config.clone());
        replayed.execute_all(&commands).unwrap();

        let mut direct = PsContext::new(Vec::new(), config);
        direct
            .rectangle(DrawMode::Fill, 10, 10, 50, 30, ColorIndex::RED)
            .unwrap();
        direct
            .circle(DrawMode::Stroke, 100, 100, 20, ColorIndex::RED)
            .unwrap();
        direct
            .draw_symbol("@->", 0, 0, 20, 20, ColorIndex::BLUE)
            .unwrap();

        assert_eq!(
            replayed.into_inner().unwrap(),
            direct.into_inner().unwrap()
        );
    }

    #[test]
    fn unknown_color_skips_the_command() {
        let mut ps = PsContext::new(
            Vec::new(),
            PsConfig {
                pack: false,
                ..PsConfig::default()
            },
        );
        ps.execute(&DrawCommand::Circle {
            x: 1,
            y: 1,
            r: 1,
            fill: false,
            color: ColorSpec::Name("mauve-ish".into()),
        })
        .unwrap();
        ps.execute(&DrawCommand::Comment {
            text: "still here".into(),
        })
        .unwrap();
        assert_eq!(ps.into_inner().unwrap(), b"%still here\n");
    }
}
