//! Terminal capability detection and styling

use owo_colors::{OwoColorize, colors::css};

/// Separator width used when the terminal size is unknown.
const DEFAULT_RULE_WIDTH: usize = 40;

/// Separators never grow past this width, however wide the terminal.
const MAX_RULE_WIDTH: usize = 60;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// A horizontal separator sized to the terminal.
pub fn rule() -> String {
    let width = terminal_width()
        .map_or(DEFAULT_RULE_WIDTH, usize::from)
        .min(MAX_RULE_WIDTH);
    "─".repeat(width).dim()
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), |s| s.fg::<css::Green>().to_string())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), |s| s.fg::<css::Orange>().to_string())
    }

    fn info(&self) -> String {
        paint(self.as_ref(), |s| s.fg::<css::LightBlue>().to_string())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), |s| s.dimmed().to_string())
    }
}

fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if supports_color() {
        style(text)
    } else {
        text.to_string()
    }
}
