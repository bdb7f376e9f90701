//! Output formatting for the phpvm CLI.
//!
//! Human-facing status goes to stderr; data the user may want to pipe
//! (version tables, the active version banner) goes to stdout.

use crate::style::Style;
use phpvm_core::error::{Error, Fix};
use std::io::{self, Write};

/// Verbosity level for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Suppress everything, including stdout data.
    Silent,
    /// Only warnings, errors and stdout data.
    Quiet,
    /// Normal output
    #[default]
    Normal,
    /// Verbose output, including subprocess output
    Verbose,
}

impl Verbosity {
    /// Derive verbosity from `-q` occurrences and the `--verbose` flag.
    pub fn from_flags(quiet: u8, verbose: bool) -> Self {
        if quiet >= 2 {
            Self::Silent
        } else if quiet == 1 {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Output handler for consistent CLI output.
#[derive(Debug, Clone, Default)]
pub struct Output {
    verbosity: Verbosity,
}

impl Output {
    /// Create an output handler with specified verbosity.
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Whether spinners and progress bars should be drawn.
    pub fn progress_enabled(&self) -> bool {
        self.verbosity == Verbosity::Normal && !phpvm_core::env::is_ci()
    }

    /// Print a status message with a step title.
    pub fn status(&self, action: &str, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{:>12} {}", Style::bold(Style::success(action)), message);
        }
    }

    /// Print an info message.
    pub fn info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Print a warning message.
    pub fn warn(&self, message: &str) {
        if self.verbosity > Verbosity::Silent {
            eprintln!("{}: {}", Style::warning("warning"), message);
        }
    }

    /// Print verbose output (only shown in verbose mode).
    pub fn verbose(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{}", Style::dim(message));
        }
    }

    /// Print a line of data to stdout.
    pub fn data(&self, line: &str) {
        if self.verbosity > Verbosity::Silent {
            println!("{}", line);
        }
    }

    /// Print a structured error with its context and fixes.
    pub fn print_error(&self, error: &Error) {
        if self.verbosity == Verbosity::Silent {
            return;
        }

        eprintln!("{}: {}", Style::error("error"), error);

        for (label, line) in error_context(error) {
            eprintln!("  {} {}", Style::dim(label), line);
        }

        let fixes = error.fixes();
        if !fixes.is_empty() {
            eprintln!();
            for fix in fixes {
                self.print_fix(fix);
            }
        }
    }

    /// Print a fix suggestion.
    pub fn print_fix(&self, fix: &Fix) {
        if let Some(ref cmd) = fix.command {
            eprintln!("{}: Run `{}`", Style::info("fix"), Style::command(cmd));
            if fix.description != *cmd {
                eprintln!("      {}", Style::dim(&fix.description));
            }
        } else {
            eprintln!("{}: {}", Style::info("fix"), fix.description);
        }
    }

    /// Print a section header to stdout.
    pub fn header(&self, title: &str) {
        if self.verbosity > Verbosity::Silent {
            println!("{}", Style::bold(title));
        }
    }

    /// Flush stdout and stderr.
    pub fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

/// Labelled detail lines printed under an error: the path involved and the
/// underlying cause, or the stderr of a failed command.
fn error_context(error: &Error) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    match error {
        Error::Io { path, source, .. } => {
            if let Some(path) = path {
                lines.push(("-->", path.display().to_string()));
            }
            lines.push(("caused by:", source.to_string()));
        }
        Error::Config { path, source, .. } => {
            if let Some(path) = path {
                lines.push(("-->", path.display().to_string()));
            }
            if let Some(source) = source {
                lines.push(("caused by:", source.to_string()));
            }
        }
        Error::DownloadFailed {
            source: Some(source),
            ..
        } => lines.push(("caused by:", source.to_string())),
        Error::CommandFailed { stderr, .. } => {
            lines.extend(
                stderr
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| ("|", l.to_string())),
            );
        }
        _ => {}
    }
    lines
}
