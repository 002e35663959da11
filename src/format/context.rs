//! Output context and mode detection.
//!
//! Determines whether to use Rich, Plain, JSON, or Quiet output
//! based on CLI flags and terminal detection.
//!
//! # Mode Selection Logic
//!
//! 1. `--json` flag → JSON mode (machine-readable)
//! 2. `--quiet` flag → Quiet mode (minimal output)
//! 3. `--no-color`, `NO_COLOR`, or not a TTY → Plain mode
//! 4. TTY with colors → Rich mode

use std::io::IsTerminal;

use serde::Serialize;

use super::text::terminal_width;
use super::theme::Theme;
use crate::error::Result;

/// Output mode determining formatting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Colors, tables and panels. Used when stdout is a TTY.
    #[default]
    Rich,

    /// Plain text without ANSI escape codes.
    Plain,

    /// JSON for machine consumption.
    Json,

    /// Minimal output; errors only.
    Quiet,
}

impl OutputMode {
    #[must_use]
    pub const fn supports_color(&self) -> bool {
        matches!(self, Self::Rich)
    }

    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Json)
    }

    #[must_use]
    pub const fn is_human_readable(&self) -> bool {
        matches!(self, Self::Rich | Self::Plain)
    }
}

/// Output context providing mode detection and terminal info.
#[derive(Debug, Clone)]
pub struct OutputContext {
    mode: OutputMode,
    width: usize,
    theme: Theme,
}

impl OutputContext {
    #[must_use]
    pub fn new(mode: OutputMode, width: usize) -> Self {
        Self {
            mode,
            width,
            theme: Theme::new(),
        }
    }

    /// Create context from CLI flags.
    ///
    /// Priority order:
    /// 1. `json` → JSON mode
    /// 2. `quiet` → Quiet mode
    /// 3. `no_color`, `NO_COLOR` or not TTY → Plain mode
    /// 4. Otherwise → Rich mode
    #[must_use]
    pub fn from_flags(json: bool, quiet: bool, no_color: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let no_color = no_color || std::env::var_os("NO_COLOR").is_some();

        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else if no_color || !is_tty {
            OutputMode::Plain
        } else {
            OutputMode::Rich
        };

        Self::new(mode, terminal_width())
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.mode.is_structured()
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        matches!(self.mode, OutputMode::Quiet)
    }

    #[must_use]
    pub const fn is_rich(&self) -> bool {
        self.mode.supports_color()
    }

    /// Print `value` as pretty JSON on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json_pretty<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let output = serde_json::to_string_pretty(value)?;
        println!("{output}");
        Ok(())
    }

    /// Print a human-readable line unless quiet or JSON.
    pub fn message(&self, text: &str) {
        if self.mode.is_human_readable() {
            println!("{text}");
        }
    }

    /// Override the output mode.
    #[must_use]
    pub const fn with_mode_override(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the terminal width.
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}
