//! Core types shared by the phpvm crates.
//!
//! This crate provides the error taxonomy, environment variable names and
//! the subprocess runner used to talk to installed PHP binaries.

pub mod command;
pub mod env;
pub mod error;

pub use command::{CommandOutput, CommandRunner};
pub use env::EnvVars;
pub use error::{Error, ErrorCode, Fix, Result};

/// Exit codes for the phpvm CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Usage error (bad arguments)
    UsageError = 2,
    /// Configuration error
    ConfigError = 3,
    /// Version, installation or activation error
    ToolchainError = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
