//! ANSI terminal implementation of [`LyricDisplay`].

use karasync_core::{DisplayFragment, LyricDisplay, ScrollBehavior};
use std::io::{self, IsTerminal, Write};
use tracing::warn;

const RESET: &str = "\x1b[0m";
const CURRENT: &str = "\x1b[1;36m";
const WORD: &str = "\x1b[1;33m";
const DIM: &str = "\x1b[2m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Redraws the whole terminal on every content change
pub struct TerminalDisplay {
    ansi: bool,
    status: String,
    body: String,
}

impl TerminalDisplay {
    /// Create a display writing to stdout, using ANSI styling only when stdout is a terminal
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout().is_terminal())
    }

    #[must_use]
    pub const fn new(ansi: bool) -> Self {
        Self {
            ansi,
            status: String::new(),
            body: String::new(),
        }
    }

    /// Text for a fragment, one lyric line per output line
    #[must_use]
    pub fn format_fragment(&self, fragment: &DisplayFragment) -> String {
        match fragment {
            DisplayFragment::Empty => String::new(),
            DisplayFragment::Word(word) => self.styled(WORD, word),
            DisplayFragment::Lines(lines) => lines
                .iter()
                .map(|line| {
                    if line.current {
                        format!("> {}", self.styled(CURRENT, &line.text))
                    } else {
                        format!("  {}", line.text)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.ansi {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn redraw(&self) {
        if let Err(e) = self.write_screen(&mut io::stdout().lock()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }

    fn write_screen(&self, out: &mut impl Write) -> io::Result<()> {
        if self.ansi {
            out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        if !self.status.is_empty() {
            writeln!(out, "{}", self.styled(DIM, &self.status))?;
        }
        writeln!(out, "{}", self.body)?;
        out.flush()
    }
}

impl LyricDisplay for TerminalDisplay {
    fn replace_content(&mut self, fragment: &DisplayFragment) {
        self.body = self.format_fragment(fragment);
        self.redraw();
    }

    fn set_status(&mut self, message: &str) {
        if self.status != message {
            self.status = message.to_string();
            self.redraw();
        }
    }

    // The window is redrawn with the current line in place, nothing to scroll
    fn scroll_to_current(&mut self, _behavior: ScrollBehavior) {}
}
