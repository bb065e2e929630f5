//! flps - render drawing jobs to PostScript
//!
//! - `flps render job.toml -o out.ps` renders every page of a job file
//! - `flps colors [NAME]` lists the built-in color table
//! - `flps symbols` lists the symbol names usable in `@` labels

mod job;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flps_core::{
    ColorMap, ColorMode, ColorSpec, DocumentInfo, PsColor, PsContext, SymbolTable,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::job::JobFile;

/// PostScript output for forms
#[derive(Parser, Debug)]
#[command(name = "flps")]
#[command(about = "Render drawing jobs to PostScript and inspect the color table")]
#[command(version)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a TOML job file
    Render(RenderArgs),
    /// List the color table, or look up one color
    Colors {
        /// Color name, with or without the `FL_` prefix
        name: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the built-in symbols, default first
    Symbols,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Job file
    job: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Encapsulated PostScript header
    #[arg(long)]
    eps: bool,

    /// Print colors as shades of gray
    #[arg(long, conflicts_with = "black_white")]
    grayscale: bool,

    /// Print colors as pure black or white
    #[arg(long)]
    black_white: bool,

    /// Gamma correction applied to the color table
    #[arg(long)]
    gamma: Option<f32>,

    /// Annotate the output with PostScript comments
    #[arg(long)]
    annotate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match cli.command {
        Command::Render(args) => render(&args),
        Command::Colors { name, json } => colors(name.as_deref(), json),
        Command::Symbols => symbols(),
    }
}

fn render(args: &RenderArgs) -> Result<()> {
    let mut job = JobFile::load(&args.job)?;

    let config = &mut job.config;
    config.eps |= args.eps;
    config.verbose |= args.annotate;
    if args.grayscale {
        config.color_mode = ColorMode::Grayscale;
    }
    if args.black_white {
        config.color_mode = ColorMode::BlackWhite;
    }
    if let Some(gamma) = args.gamma {
        config.gamma = gamma;
    }

    let fallback = file_name(&args.job);
    let info = DocumentInfo::new(job.title(&fallback), job.bounding_box())
        .with_pages(job.page_count());
    info!(title = %info.title, pages = info.pages, "rendering");

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let mut ps = PsContext::new(BufWriter::new(sink), job.config.clone());
    ps.emit_header(&info)?;
    ps.emit_prolog()?;

    if job.pages.is_empty() {
        ps.begin_page(1)?;
        ps.end_page()?;
    }
    for (i, page) in job.pages.iter().enumerate() {
        let n = i as u32 + 1;
        debug!(page = n, commands = page.draw.len(), "page");
        ps.begin_page(n)?;
        ps.execute_all(&page.draw)?;
        ps.end_page()?;
    }

    ps.finish()?.flush().context("Failed to flush output")?;

    if let Some(path) = &args.output {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Serialize)]
struct ColorRow {
    name: &'static str,
    index: u32,
    rgb: [u8; 3],
    gray: u8,
}

fn colors(name: Option<&str>, json: bool) -> Result<()> {
    let map = ColorMap::builtin();

    let rows: Vec<ColorRow> = match name {
        Some(name) => {
            let color = ColorSpec::Name(name.to_string()).resolve(&map)?;
            map.entries()
                .iter()
                .filter(|e| PsColor::from(e.index) == color)
                .take(1)
                .map(row)
                .collect()
        }
        None => map.entries().iter().map(row).collect(),
    };

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &rows)?;
        writeln!(out)?;
    } else {
        for r in &rows {
            writeln!(
                out,
                "{:<22} {:>4}  {:>3} {:>3} {:>3}  gray {:>3}",
                r.name, r.index, r.rgb[0], r.rgb[1], r.rgb[2], r.gray
            )?;
        }
    }
    Ok(())
}

fn row(e: &flps_core::ColorEntry) -> ColorRow {
    ColorRow {
        name: e.name,
        index: e.index.0,
        rgb: e.rgb.into(),
        gray: e.rgb.gray255(),
    }
}

fn symbols() -> Result<()> {
    let mut out = io::stdout().lock();
    for name in SymbolTable::builtin().names() {
        writeln!(out, "@{name}")?;
    }
    Ok(())
}
