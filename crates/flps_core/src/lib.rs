//! flps PostScript backend
//!
//! Renders forms and their iconography as PostScript or EPS text.
//!
//! # Features
//!
//! - Device state cache: color, line width, dash style and font are only
//!   emitted when they change
//! - Packed output, word-wrapped at 70 columns
//! - Primitives (lines, polygons, rectangles, ovals, arcs, pie slices)
//! - Symbol macros defined once per document, with rotation and insets
//! - Built-in named color table with gamma correction
//! - DSC header, prolog, pages and clip regions
//! - Drawing commands that replay from TOML or JSON

mod macros;

pub mod color;
pub mod colormap;
pub mod command;
pub mod config;
pub mod context;
pub mod document;
pub mod draw;
pub mod emit;
pub mod error;
pub mod geometry;
pub mod glyphs;
pub mod state;
pub mod symbol;
pub mod text;

pub use color::{ColorIndex, ColorMode, PsColor, Rgb};
pub use colormap::{ColorEntry, ColorMap};
pub use command::{ColorSpec, DrawCommand};
pub use config::{Orientation, PsConfig};
pub use context::PsContext;
pub use document::DocumentInfo;
pub use draw::{Canvas, DrawMode, MAX_BATCH};
pub use error::{PsError, PsResult};
pub use geometry::{BoundingBox, Point, Rect};
pub use state::{CacheSlot, LineStyle};
pub use symbol::{CoordSpace, Glyph, SymbolDef, SymbolTable};
pub use text::{FontStyle, TextAlign};
