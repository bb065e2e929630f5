//! Buffered PostScript text output
//!
//! In packed mode the emitter word-wraps at [`WRAP_COLUMN`] and collapses runs
//! of whitespace. PostScript does not care about whitespace between operators,
//! but it does inside `( ... )` string literals, so collapsing and wrapping
//! are suspended while a literal is open. The literal tracking is a single toggle: `(` opens,
//! `)` closes, nesting is not counted.

use std::fmt::{self, Write as _};
use std::io::{self, Write};

/// Column past which the next space becomes a line break
pub const WRAP_COLUMN: usize = 70;

/// Text sink with optional packing
pub struct Emitter<W> {
    sink: W,
    pack: bool,
    column: usize,
    last: char,
    literal: bool,
    scratch: String,
}

impl<W: Write> Emitter<W> {
    pub fn new(sink: W, pack: bool) -> Self {
        Self {
            sink,
            pack,
            column: 0,
            last: '\0',
            literal: false,
            scratch: String::with_capacity(256),
        }
    }

    pub fn is_packed(&self) -> bool {
        self.pack
    }

    /// Characters written on the current line
    pub fn column(&self) -> usize {
        self.column
    }

    /// Whether a `(` literal is currently open
    pub fn in_literal(&self) -> bool {
        self.literal
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Format and write through the packer
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let mut text = std::mem::take(&mut self.scratch);
        text.clear();
        text.write_fmt(args)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "formatter error"))?;

        if !self.pack {
            let result = self.write_verbatim(&text);
            self.scratch = text;
            return result;
        }

        let mut out = String::with_capacity(text.len() + 2);
        let mut last = self.last;

        for ch in text.chars() {
            let ch = if ch == '\n' { ' ' } else { ch };

            match ch {
                '(' => self.literal = true,
                ')' => self.literal = false,
                _ => {}
            }

            if ch == ' ' {
                if last == ' ' && !self.literal {
                    continue;
                }
                if self.column == 0 {
                    continue;
                }
                if self.column >= WRAP_COLUMN && !self.literal {
                    out.push('\n');
                    self.column = 0;
                    continue;
                }
            }

            last = ch;
            self.column += 1;
            out.push(ch);
        }

        self.last = last;
        self.scratch = text;
        self.sink.write_all(out.as_bytes())
    }

    /// Terminate the current line if anything is on it
    pub fn flush_line(&mut self) -> io::Result<()> {
        if self.column > 0 {
            self.sink.write_all(b"\n")?;
            self.column = 0;
        }
        Ok(())
    }

    /// Write verbatim, bypassing the packer
    ///
    /// Callers end the current line first when the text must start one.
    pub fn raw_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        let mut text = std::mem::take(&mut self.scratch);
        text.clear();
        text.write_fmt(args)
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "formatter error"))?;
        let result = self.write_verbatim(&text);
        self.scratch = text;
        result
    }

    fn write_verbatim(&mut self, text: &str) -> io::Result<()> {
        match text.rfind('\n') {
            Some(i) => self.column = text[i + 1..].chars().count(),
            None => self.column += text.chars().count(),
        }
        self.sink.write_all(text.as_bytes())
    }

    /// Flush the underlying sink, ending the current line when packed
    ///
    /// Unpacked text is left exactly as written.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.pack {
            self.flush_line()?;
        }
        self.sink.flush()
    }

    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.sink)
    }
}

/// C-style `%.Ng` rendering: `N` significant digits, trailing zeros dropped
#[derive(Clone, Copy, Debug)]
pub struct G(pub f64, pub usize);

impl fmt::Display for G {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let G(value, precision) = *self;
        let precision = precision.max(1);

        if value == 0.0 || !value.is_finite() {
            return write!(f, "{}", if value.is_finite() { 0.0 } else { value });
        }

        // Round first so 0.9996 with 3 digits becomes 1 and not 1.000
        let rounded: f64 = format!("{:.*e}", precision - 1, value)
            .parse()
            .unwrap_or(value);
        let exponent = rounded.abs().log10().floor() as i32;

        if exponent < -4 || exponent >= precision as i32 {
            let s = format!("{:.*e}", precision - 1, rounded);
            let (mantissa, exp) = s.split_once('e').unwrap_or((&s, "0"));
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            return write!(f, "{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs());
        }

        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        let s = format!("{:.*}", decimals, rounded);
        f.write_str(trim_zeros(&s))
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn packed(chunks: &[&str]) -> String {
        let mut e = Emitter::new(Vec::new(), true);
        for chunk in chunks {
            e.write_fmt(format_args!("{chunk}")).unwrap();
        }
        String::from_utf8(e.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn newlines_become_spaces_and_flush_ends_line() {
        assert_eq!(packed(&["1 2 M\n", "3 4 LT\n"]), "1 2 M 3 4 LT \n");
    }

    #[test]
    fn runs_of_spaces_collapse_outside_literals() {
        assert_eq!(packed(&["a    b", "  c"]), "a b c\n");
    }

    #[test]
    fn spaces_inside_literal_are_kept() {
        assert_eq!(packed(&["(a   b) show  x"]), "(a   b) show x\n");
    }

    #[test]
    fn literal_state_follows_parentheses() {
        let mut e = Emitter::new(Vec::new(), true);
        assert!(e.is_packed());
        e.write_fmt(format_args!("(open  ")).unwrap();
        assert!(e.in_literal());
        e.write_fmt(format_args!("shut) ")).unwrap();
        assert!(!e.in_literal());
    }

    #[test]
    fn leading_space_is_dropped() {
        assert_eq!(packed(&["   x"]), "x\n");
    }

    #[test]
    fn long_input_wraps_without_leading_spaces() {
        let input = "ab ".repeat(67);
        assert!(input.len() >= 200);
        let out = packed(&[&input]);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= WRAP_COLUMN + 1, "{line:?}");
            assert!(!line.starts_with(' '), "{line:?}");
        }
        let words: usize = lines.iter().map(|l| l.split_whitespace().count()).sum();
        assert_eq!(words, 67);
    }

    #[test]
    fn unpacked_output_is_verbatim() {
        let mut e = Emitter::new(Vec::new(), false);
        e.write_fmt(format_args!("  a\n\n  b  ")).unwrap();
        assert_eq!(String::from_utf8(e.into_inner().unwrap()).unwrap(), "  a\n\n  b  ");
    }

    #[test]
    fn unpacked_flush_line_ends_a_partial_line() {
        let mut e = Emitter::new(Vec::new(), false);
        e.write_fmt(format_args!("0 G ")).unwrap();
        assert_eq!(e.column(), 4);
        e.flush_line().unwrap();
        e.raw_fmt(format_args!("%%Page: 1 1\n")).unwrap();
        assert_eq!(e.column(), 0);
        e.flush_line().unwrap();
        e.write_fmt(format_args!("S\n")).unwrap();
        assert_eq!(
            String::from_utf8(e.into_inner().unwrap()).unwrap(),
            "0 G \n%%Page: 1 1\nS\n"
        );
    }

    #[test]
    fn literal_is_never_wrapped() {
        let label = "word ".repeat(30);
        let out = packed(&["x ".repeat(40).as_str(), &format!("({label}) show\n")]);
        assert!(out.contains(&format!("({label})")), "{out}");
    }

    #[test]
    fn flush_on_empty_line_writes_nothing() {
        let mut e = Emitter::new(Vec::new(), true);
        e.flush_line().unwrap();
        assert!(e.get_ref().is_empty());
    }

    #[test]
    fn g_format_matches_printf() {
        assert_eq!(G(1.0, 3).to_string(), "1");
        assert_eq!(G(0.0, 3).to_string(), "0");
        assert_eq!(G(161.0 / 255.0, 3).to_string(), "0.631");
        assert_eq!(G(0.5, 3).to_string(), "0.5");
        assert_eq!(G(0.0392, 3).to_string(), "0.0392");
        assert_eq!(G(0.99999, 3).to_string(), "1");
        assert_eq!(G(0.00001234, 3).to_string(), "1.23e-05");
        assert_eq!(G(1.5, 2).to_string(), "1.5");
    }
}
