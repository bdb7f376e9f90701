//! Error types for phpvm.

use crate::ExitCode;
use std::path::PathBuf;

/// Result type alias using the phpvm Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes for categorizing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Version id absent from the catalog
    VersionNotFound,
    /// No download for the running CPU architecture
    UnsupportedArchitecture,
    /// Network or HTTP status failure
    DownloadFailed,
    /// Permission, space or path issue
    FilesystemError,
    /// No Composer release lists the runtime as compatible
    NoCompatibleTool,
    /// Activation requested for a version that is not on disk
    NotInstalled,
    /// Nothing answers `php -v`
    NoActiveRuntime,
    /// Invalid configuration or catalog
    ConfigError,
    /// Command execution failed
    CommandFailed,
}

/// A fix suggestion for an error.
#[derive(Debug, Clone)]
pub struct Fix {
    /// Description of what this fix does
    pub description: String,
    /// Command to run, if applicable
    pub command: Option<String>,
}

impl Fix {
    /// Create a fix with just a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: None,
        }
    }

    /// Create a fix with a command.
    pub fn with_command(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: Some(command.into()),
        }
    }
}

/// Structured error type for phpvm.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("PHP version {version} not found")]
    VersionNotFound { version: String, fixes: Vec<Fix> },

    #[error("PHP {version} is not available for architecture {arch}: only x64 and arm64 are supported")]
    UnsupportedArchitecture {
        arch: String,
        version: String,
        fixes: Vec<Fix>,
    },

    #[error("download failed for {}: {message}", download_subject(.version, .url))]
    DownloadFailed {
        url: String,
        message: String,
        /// HTTP status, when the server answered at all.
        status: Option<u16>,
        /// PHP version the download belonged to, once known.
        version: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        fixes: Vec<Fix>,
    },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("no compatible Composer version found for PHP {runtime}")]
    NoCompatibleTool { runtime: String },

    #[error("PHP version {version} is not installed")]
    NotInstalled { version: String, fixes: Vec<Fix> },

    #[error("no active PHP runtime: {message}")]
    NoActiveRuntime { message: String, fixes: Vec<Fix> },

    #[error("configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        fixes: Vec<Fix>,
    },

    #[error("command failed: {command}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl Error {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::VersionNotFound { .. } => ErrorCode::VersionNotFound,
            Error::UnsupportedArchitecture { .. } => ErrorCode::UnsupportedArchitecture,
            Error::DownloadFailed { .. } => ErrorCode::DownloadFailed,
            Error::Io { .. } => ErrorCode::FilesystemError,
            Error::NoCompatibleTool { .. } => ErrorCode::NoCompatibleTool,
            Error::NotInstalled { .. } => ErrorCode::NotInstalled,
            Error::NoActiveRuntime { .. } => ErrorCode::NoActiveRuntime,
            Error::Config { .. } => ErrorCode::ConfigError,
            Error::CommandFailed { .. } => ErrorCode::CommandFailed,
        }
    }

    /// Map this error onto a process exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self.code() {
            ErrorCode::ConfigError => ExitCode::ConfigError,
            ErrorCode::FilesystemError | ErrorCode::CommandFailed => ExitCode::GeneralError,
            _ => ExitCode::ToolchainError,
        }
    }

    /// Get suggested fixes for this error.
    pub fn fixes(&self) -> &[Fix] {
        match self {
            Error::VersionNotFound { fixes, .. } => fixes,
            Error::UnsupportedArchitecture { fixes, .. } => fixes,
            Error::DownloadFailed { fixes, .. } => fixes,
            Error::NotInstalled { fixes, .. } => fixes,
            Error::NoActiveRuntime { fixes, .. } => fixes,
            Error::Config { fixes, .. } => fixes,
            _ => &[],
        }
    }

    /// Whether retrying the same operation could succeed.
    ///
    /// Only transport failures and 5xx/429 responses qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::DownloadFailed { status: None, .. } => true,
            Error::DownloadFailed {
                status: Some(code), ..
            } => *code >= 500 || *code == 429,
            _ => false,
        }
    }

    /// Create a version-not-found error pointing at `phpvm list`.
    pub fn version_not_found(version: impl Into<String>) -> Self {
        Error::VersionNotFound {
            version: version.into(),
            fixes: vec![Fix::with_command(
                "See which versions are available",
                "phpvm list",
            )],
        }
    }

    /// Create a not-installed error pointing at `phpvm install`.
    pub fn not_installed(version: impl Into<String>) -> Self {
        let version = version.into();
        Error::NotInstalled {
            fixes: vec![Fix::with_command(
                format!("Install PHP {} first", version),
                format!("phpvm install {}", version),
            )],
            version,
        }
    }

    /// Create a no-active-runtime error.
    pub fn no_active_runtime(message: impl Into<String>) -> Self {
        Error::NoActiveRuntime {
            message: message.into(),
            fixes: vec![
                Fix::with_command("Activate an installed version", "phpvm switch <version>"),
                Fix::new("Make sure ~/.phpvm/bin is on your PATH (restart your shell)"),
            ],
        }
    }

    /// Create an unsupported-architecture error for `version`.
    pub fn unsupported_architecture(arch: impl Into<String>, version: impl Into<String>) -> Self {
        Error::UnsupportedArchitecture {
            arch: arch.into(),
            version: version.into(),
            fixes: vec![
                Fix::with_command("See which versions are available", "phpvm list"),
                Fix::new("Set `catalog` in the config file to a catalog with a download for this machine"),
            ],
        }
    }

    /// Create a download error for a failed transport or status.
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DownloadFailed {
            url: url.into(),
            message: message.into(),
            status: None,
            version: None,
            source: None,
            fixes: vec![],
        }
    }

    /// Create a download error for an HTTP response with a failing status.
    pub fn download_status(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Error::DownloadFailed {
            url: url.into(),
            message: message.into(),
            status: Some(status),
            version: None,
            source: None,
            fixes: vec![],
        }
    }

    /// Name the PHP version a failed download was for and suggest retrying
    /// its installation. Other errors pass through unchanged.
    pub fn for_version(self, php: &str) -> Self {
        match self {
            Error::DownloadFailed {
                url,
                message,
                status,
                source,
                ..
            } => Error::DownloadFailed {
                url,
                message,
                status,
                version: Some(php.to_string()),
                source,
                fixes: vec![Fix::with_command(
                    format!("Retry installing PHP {}", php),
                    format!("phpvm install {}", php),
                )],
            },
            other => other,
        }
    }

    /// Create an I/O error with path context.
    pub fn io(message: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            path: None,
            source: None,
            fixes: vec![],
        }
    }
}

fn download_subject(version: &Option<String>, url: &str) -> String {
    match version {
        Some(version) => format!("PHP {} ({})", version, url),
        None => url.to_string(),
    }
}
