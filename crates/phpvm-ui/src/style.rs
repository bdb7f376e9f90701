//! Styling utilities for terminal output.

use console::{StyledObject, style};

/// Style helper for consistent terminal output.
pub struct Style;

impl Style {
    /// Style text as an error (red).
    pub fn error<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).red().bold()
    }

    /// Style text as a warning (yellow).
    pub fn warning<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).yellow()
    }

    /// Style text as success (green).
    pub fn success<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).green()
    }

    /// Style text as info (cyan).
    pub fn info<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan()
    }

    /// Style text as a command hint (cyan, bold).
    pub fn command<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).cyan().bold()
    }

    /// Style a version identifier (magenta, bold).
    pub fn version<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).magenta().bold()
    }

    /// Style text as dim (for secondary info).
    pub fn dim<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).dim()
    }

    /// Style text as bold.
    pub fn bold<D: std::fmt::Display>(text: D) -> StyledObject<D> {
        style(text).bold()
    }

    /// Human-readable byte count ("12.3 MB").
    pub fn bytes(bytes: u64) -> String {
        let bytes = bytes as f64;
        if bytes < 1_000.0 {
            format!("{:.0} B", bytes)
        } else if bytes < 1_000_000.0 {
            format!("{:.1} KB", bytes / 1_000.0)
        } else {
            format!("{:.1} MB", bytes / 1_000_000.0)
        }
    }
}

/// Apply the color preference from flags and the environment.
pub fn configure_colors(no_color_flag: bool) {
    let enabled = !no_color_flag && !phpvm_core::env::no_color();
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        assert_eq!(Style::bytes(512), "512 B");
        assert_eq!(Style::bytes(2_500), "2.5 KB");
        assert_eq!(Style::bytes(31_400_000), "31.4 MB");
    }
}
