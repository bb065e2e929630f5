//! Document framing: DSC header, prolog, pages and clipping

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::context::PsContext;
use crate::emit::G;
use crate::error::PsResult;
use crate::geometry::BoundingBox;
use crate::macros::emit;

const CREATOR: &str = concat!("flps V", env!("CARGO_PKG_VERSION"));

/// Operator aliases every document relies on
const PROLOG: &str = "\
/BD {bind def} def
/M {moveto} BD /LT {lineto} BD
/RLT {rlineto} BD
/L {M LT} BD  /C  {closepath} BD
/LW {setlinewidth} BD
/S {stroke} BD /F {fill} BD
/G {setgray} BD /RGB {setrgbcolor} BD
/P  {3 1 roll M 2 exch 1 exch {pop LT} for C} BD
/lines {3 1 roll M 2 exch 1 exch {pop LT} for S} BD
/DTD {[5 4 1 4] 0 setdash} BD
/DT {[1 3] 0 setdash} BD
/LD {[8 5] 0 setdash} BD
/D {[4 4] 0 setdash} BD
/SL {[] 0 setdash} BD
/NP {newpath} BD
";

const FONT_PROLOG: &str = "\
/point {SX SY add 2 div div} BD
/SetFont {findfont exch scalefont setfont} BD
/Lshow {show} BD
/Cshow {dup stringwidth pop -2 div 0 rmoveto show} BD
/Rshow {dup stringwidth pop neg 0 rmoveto show} BD
/CP {currentpoint} BD /SW {stringwidth} BD
";

/// What the header comments describe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    pub pages: u32,
    pub bounding_box: BoundingBox,
    /// `%%For`
    pub user: String,
    /// `%%CreateDate`
    pub created: String,
}

impl DocumentInfo {
    /// Single-page document for the current user, stamped now
    pub fn new(title: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            title: title.into(),
            pages: 1,
            bounding_box,
            user: current_user(),
            created: ctime(unix_now()),
        }
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `ctime`-style UTC timestamp, e.g. `Thu Jan  1 00:00:00 1970`
pub fn ctime(unix_secs: u64) -> String {
    const DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let days = (unix_secs / 86_400) as i64;
    let secs = unix_secs % 86_400;
    let (year, month, day) = civil_from_days(days);

    format!(
        "{} {} {:>2} {:02}:{:02}:{:02} {}",
        DAYS[((days + 4) % 7) as usize],
        MONTHS[(month - 1) as usize],
        day,
        secs / 3600,
        secs % 3600 / 60,
        secs % 60,
        year
    )
}

/// Proleptic Gregorian date of a day count since 1970-01-01
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

impl<W: Write> PsContext<W> {
    /// Write the DSC comment block
    ///
    /// Also settles the page orientation: `auto` turns landscape for a
    /// drawing wider than tall and wider than the paper.
    pub fn emit_header(&mut self, info: &DocumentInfo) -> PsResult<()> {
        self.landscape = self
            .config
            .orientation
            .is_landscape(&info.bounding_box, self.config.paper_width_points());
        debug!(title = %info.title, landscape = self.landscape, "document header");

        let b = &info.bounding_box;
        self.out.flush_line()?;
        if self.config.eps {
            self.out.raw_fmt(format_args!("%!PS-Adobe-3.0 EPSF-2.0\n"))?;
        } else {
            self.out.raw_fmt(format_args!("%!PS-Adobe-1.0\n"))?;
        }
        self.out.raw_fmt(format_args!("%%Title: {}\n", info.title))?;
        self.out.raw_fmt(format_args!("%%For: {}\n", info.user))?;
        self.out.raw_fmt(format_args!("%%CreateDate: {}\n", info.created))?;
        self.out.raw_fmt(format_args!("%%Creator: {CREATOR}\n"))?;
        self.out.raw_fmt(format_args!("%%Pages: {}\n", info.pages))?;
        self.out.raw_fmt(format_args!(
            "%%BoundingBox: {} {} {} {}\n",
            b.x0, b.y0, b.x1, b.y1
        ))?;
        self.out.raw_fmt(format_args!(
            "%%Orientation: {}\n",
            if self.landscape { "Landscape" } else { "Portrait" }
        ))?;
        self.out.raw_fmt(format_args!("%%EndComments\n"))?;
        self.out.raw_fmt(format_args!(
            "% PaperSize: {:.1}x{:.1}in\n",
            self.config.paper_width, self.config.paper_height
        ))?;
        Ok(())
    }

    /// Define the short operator names used by every drawing call
    pub fn emit_prolog(&mut self) -> PsResult<()> {
        emit!(self, "{}", PROLOG)?;
        emit!(
            self,
            "/SX {} def /SY {} def\n",
            G(f64::from(self.config.xscale), 2),
            G(f64::from(self.config.yscale), 2)
        )?;
        emit!(self, "{}", FONT_PROLOG)
    }

    /// Start page `n` (1-based) with nothing assumed about device state
    pub fn begin_page(&mut self, n: u32) -> PsResult<()> {
        self.out.flush_line()?;
        self.out.raw_fmt(format_args!("%%Page: {n} {n}\n"))?;
        self.reset_cache();
        if self.landscape {
            emit!(
                self,
                "{:.1} 0 translate 90 rotate\n",
                self.config.paper_width_points()
            )?;
        }
        Ok(())
    }

    pub fn end_page(&mut self) -> PsResult<()> {
        emit!(self, "showpage\n")?;
        self.out.flush_line()?;
        Ok(())
    }

    /// Close open clips, write the trailer and hand back the sink
    pub fn finish(mut self) -> PsResult<W> {
        if self.clip_depth > 0 {
            warn!(depth = self.clip_depth, "clip regions still open at end of document");
            while self.clip_depth > 0 {
                self.pop_clip()?;
            }
        }
        self.out.flush_line()?;
        self.out.raw_fmt(format_args!("%%Trailer\n%%EOF\n"))?;
        self.into_inner()
    }

    /// Restrict drawing to the `w` x `h` rectangle at `(x, y)`
    pub fn push_clip(&mut self, x: i32, y: i32, w: i32, h: i32) -> PsResult<()> {
        emit!(
            self,
            "gsave NP {} {} M {} 0 RLT 0 {} RLT {} neg 0 RLT C clip NP\n",
            x,
            y,
            w,
            h,
            w
        )?;
        self.clip_depth += 1;
        Ok(())
    }

    /// Drop the innermost clip region
    ///
    /// Everything cached is forgotten since `grestore` rolls back any
    /// attribute changed while the clip was active.
    pub fn pop_clip(&mut self) -> PsResult<()> {
        if self.clip_depth == 0 {
            warn!("pop_clip without an active clip region, ignored");
            return Ok(());
        }
        emit!(self, "grestore\n")?;
        self.clip_depth -= 1;
        self.reset_cache();
        Ok(())
    }
}
