//! Spinners and byte progress bars for downloads.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

fn draw_target(visible: bool) -> ProgressDrawTarget {
    if visible {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    }
}

/// A spinner for indeterminate progress.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Create a spinner that is only drawn when `visible` is true.
    pub fn with_visibility(message: impl Into<String>, visible: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, draw_target(visible));
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Finish the spinner with a failure message.
    pub fn finish_error(self, message: impl Into<String>) {
        self.bar
            .finish_with_message(format!("{} {}", console::style("✗").red(), message.into()));
    }

    /// Finish and clear the spinner.
    pub fn finish_clear(self) {
        self.bar.finish_and_clear();
    }
}

/// A byte-counting progress bar.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// Create a progress bar for `total` bytes.
    pub fn bytes(total: u64, message: impl Into<String>, visible: bool) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total), draw_target(visible));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/dim}] {bytes}/{total_bytes} ({eta})")
        {
            bar.set_style(style.progress_chars("━━─"));
        }
        bar.set_message(message.into());
        Self { bar }
    }

    /// Set the current position.
    pub fn set_position(&self, pos: u64) {
        self.bar.set_position(pos);
    }

    /// Finish the progress bar with a success line.
    pub fn finish(self, message: impl Into<String>) {
        self.bar.finish_with_message(format!(
            "{} {}",
            console::style("✓").green(),
            message.into()
        ));
    }

    /// Abandon the bar after a failed transfer.
    pub fn abandon(self) {
        self.bar.abandon();
    }
}
