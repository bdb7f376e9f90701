//! Environment variables recognized by phpvm.

/// Environment variable names used by phpvm.
pub struct EnvVars;

impl EnvVars {
    // ─── Global Settings ─────────────────────────────────────────────────────

    /// Installation root (defaults to `~/.phpvm`).
    pub const PHPVM_DIR: &'static str = "PHPVM_DIR";

    /// Path to the phpvm configuration file.
    pub const PHPVM_CONFIG_FILE: &'static str = "PHPVM_CONFIG_FILE";

    /// Enable verbose output.
    pub const PHPVM_VERBOSE: &'static str = "PHPVM_VERBOSE";

    /// Suppress output.
    pub const PHPVM_QUIET: &'static str = "PHPVM_QUIET";

    /// Disable colored output.
    pub const PHPVM_NO_COLOR: &'static str = "PHPVM_NO_COLOR";

    /// Enable JSON log output.
    pub const PHPVM_LOG_JSON: &'static str = "PHPVM_LOG_JSON";

    // ─── Standard Environment Variables ──────────────────────────────────────

    /// Standard NO_COLOR environment variable.
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Standard CLICOLOR environment variable.
    pub const CLICOLOR: &'static str = "CLICOLOR";

    /// CI environment indicator.
    pub const CI: &'static str = "CI";
}

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var(EnvVars::CI).is_ok()
}

/// Check if colors should be disabled based on environment.
pub fn no_color() -> bool {
    std::env::var(EnvVars::NO_COLOR).is_ok()
        || std::env::var(EnvVars::PHPVM_NO_COLOR).is_ok()
        || std::env::var(EnvVars::CLICOLOR)
            .map(|v| v == "0")
            .unwrap_or(false)
}
