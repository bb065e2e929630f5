//! Output configuration
//!
//! Loaded from TOML, all fields optional:
//!
//! ```toml
//! color_mode = "grayscale"
//! orientation = "landscape"
//! paper_width = 8.27
//! paper_height = 11.69
//! eps = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::color::ColorMode;
use crate::error::PsResult;
use crate::geometry::BoundingBox;

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Page orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Landscape only when the drawing is wider than tall and wider than the paper
    #[default]
    Auto,
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn is_landscape(self, bbox: &BoundingBox, paper_width_pts: f32) -> bool {
        match self {
            Orientation::Portrait => false,
            Orientation::Landscape => true,
            Orientation::Auto => {
                bbox.width() > bbox.height() && bbox.width() as f32 > paper_width_pts
            }
        }
    }
}

/// Device configuration for one document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsConfig {
    pub color_mode: ColorMode,
    pub orientation: Orientation,
    /// Paper width in inches
    pub paper_width: f32,
    /// Paper height in inches
    pub paper_height: f32,
    pub xscale: f32,
    pub yscale: f32,
    /// Word-wrap and collapse whitespace in the output
    pub pack: bool,
    /// Emit an Encapsulated PostScript header
    pub eps: bool,
    /// Annotate the output with comments for symbols and failures
    pub verbose: bool,
    /// Applied to the color table when the context is created
    pub gamma: f32,
}

impl Default for PsConfig {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Color,
            orientation: Orientation::Auto,
            paper_width: 8.5,
            paper_height: 11.0,
            xscale: 1.0,
            yscale: 1.0,
            pack: true,
            eps: false,
            verbose: false,
            gamma: 1.0,
        }
    }
}

impl PsConfig {
    pub fn from_toml_str(content: &str) -> PsResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> PsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn paper_width_points(&self) -> f32 {
        self.paper_width * POINTS_PER_INCH
    }

    pub fn paper_height_points(&self) -> f32 {
        self.paper_height * POINTS_PER_INCH
    }

    /// Bounding box covering the whole sheet
    pub fn paper_bbox(&self) -> BoundingBox {
        BoundingBox::new(
            0,
            0,
            self.paper_width_points().round() as i32,
            self.paper_height_points().round() as i32,
        )
    }
}
