//! ANSI styling for the prompt, listings and grep matches.

use std::io::{self, Write};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const BRIGHT_RED: &str = "\x1b[91m";
const BRIGHT_GREEN: &str = "\x1b[92m";
const BRIGHT_BLUE: &str = "\x1b[94m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Current directory in the prompt.
    Prompt,
    /// Directory names in `ls`.
    Directory,
    /// File name prefix on grep lines.
    FileName,
    /// The `:` after the grep file name.
    Separator,
    /// A regex match on a grep line.
    Match,
}

impl Style {
    fn codes(self) -> &'static [&'static str] {
        match self {
            Style::Prompt => &[BOLD, BRIGHT_GREEN],
            Style::Directory => &[BOLD, BRIGHT_BLUE],
            Style::FileName => &[MAGENTA],
            Style::Separator => &[CYAN],
            Style::Match => &[BOLD, BRIGHT_RED],
        }
    }
}

/// Turns styles on or off for a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn colored() -> Self {
        Self::new(true)
    }

    pub fn paint(&self, style: Style, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let mut out = style.codes().concat();
        out.push_str(text);
        out.push_str(RESET);
        out
    }

    /// Write `bytes` wrapped in `style` without touching their encoding.
    pub fn paint_bytes(&self, style: Style, bytes: &[u8], out: &mut dyn Write) -> io::Result<()> {
        if self.enabled {
            for code in style.codes() {
                out.write_all(code.as_bytes())?;
            }
        }
        out.write_all(bytes)?;
        if self.enabled {
            out.write_all(RESET.as_bytes())?;
        }
        Ok(())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::colored()
    }
}
