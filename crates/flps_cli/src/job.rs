//! Render job files
//!
//! ```toml
//! [document]
//! title = "login form"
//! bounding_box = [0, 0, 320, 240]
//!
//! [config]
//! color_mode = "grayscale"
//!
//! [[page]]
//! draw = [
//!     { op = "rectangle", x = 10, y = 10, w = 300, h = 220, color = "col1", fill = true },
//!     { op = "symbol", label = "@->", x = 20, y = 20, w = 30, h = 30, color = "red" },
//! ]
//! ```

use anyhow::{Context, Result};
use flps_core::{BoundingBox, DrawCommand, PsConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level job file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct JobFile {
    #[serde(default)]
    pub document: DocumentSection,
    #[serde(default)]
    pub config: PsConfig,
    #[serde(default, rename = "page")]
    pub pages: Vec<PageSpec>,
}

/// Header metadata
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DocumentSection {
    /// Defaults to the job file name
    #[serde(default)]
    pub title: Option<String>,
    /// Defaults to the whole sheet
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

/// One page worth of drawing commands
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PageSpec {
    #[serde(default)]
    pub draw: Vec<DrawCommand>,
}

impl JobFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse job file")
    }

    /// Load a job from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("No job file at {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let job: JobFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(job)
    }

    /// Title for the header, falling back to `fallback`
    pub fn title<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.document.title.as_deref().unwrap_or(fallback)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.document
            .bounding_box
            .unwrap_or_else(|| self.config.paper_bbox())
    }

    /// Number of pages in the header; an empty job still prints one page
    pub fn page_count(&self) -> u32 {
        self.pages.len().max(1) as u32
    }
}
