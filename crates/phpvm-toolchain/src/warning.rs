//! Non-fatal problems reported alongside a successful operation.

use phpvm_core::Error;
use std::fmt;
use std::path::PathBuf;

/// A secondary step that did not complete. The primary operation still
/// succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// No Composer release lists this PHP version.
    NoCompatibleTool { runtime: String },
    /// Composer was resolved but could not be installed or bound.
    ToolFailed { runtime: String, reason: String },
    /// The Composer artifact resolved for `runtime` is not on disk.
    ToolArtifactMissing {
        runtime: String,
        tool: String,
        path: PathBuf,
    },
    /// Shell profiles could not be updated.
    ShellUpdateFailed { reason: String },
    /// The post-activation subshell check did not run cleanly.
    VerificationFailed { reason: String },
}

impl Warning {
    /// Downgrade a Composer installation error for `runtime`.
    pub fn from_tool_error(runtime: &str, err: &Error) -> Self {
        match err {
            Error::NoCompatibleTool { runtime } => Warning::NoCompatibleTool {
                runtime: runtime.clone(),
            },
            other => Warning::ToolFailed {
                runtime: runtime.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Suggested follow-up for the user, if any.
    pub fn hint(&self) -> Option<String> {
        match self {
            Warning::NoCompatibleTool { .. } => {
                Some("You can install Composer manually later".to_string())
            }
            Warning::ToolFailed { runtime, .. } => {
                Some(format!("Re-run `phpvm install {}` to retry", runtime))
            }
            Warning::ToolArtifactMissing { runtime, .. } => Some(format!(
                "Re-run `phpvm install {}` to fetch Composer",
                runtime
            )),
            Warning::ShellUpdateFailed { .. } => {
                Some("Add the phpvm bin directory to your PATH manually".to_string())
            }
            Warning::VerificationFailed { .. } => Some(
                "Restart your terminal or run `source ~/.bashrc` (or ~/.zshrc) to apply changes"
                    .to_string(),
            ),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NoCompatibleTool { runtime } => {
                write!(f, "no compatible Composer version found for PHP {}", runtime)
            }
            Warning::ToolFailed { runtime, reason } => {
                write!(f, "failed to set up Composer for PHP {}: {}", runtime, reason)
            }
            Warning::ToolArtifactMissing { tool, path, .. } => {
                write!(f, "Composer {} not found at {}", tool, path.display())
            }
            Warning::ShellUpdateFailed { reason } => {
                write!(f, "could not automatically add to PATH: {}", reason)
            }
            Warning::VerificationFailed { reason } => {
                write!(f, "could not auto-apply PATH changes: {}", reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tool_error() {
        let warning = Warning::from_tool_error(
            "7.4.0",
            &Error::NoCompatibleTool {
                runtime: "7.4.0".into(),
            },
        );
        assert_eq!(
            warning,
            Warning::NoCompatibleTool {
                runtime: "7.4.0".into()
            }
        );

        let warning = Warning::from_tool_error("8.4.1", &Error::download("u", "HTTP 500"));
        assert!(matches!(warning, Warning::ToolFailed { .. }));
        assert!(warning.to_string().contains("8.4.1"));
        assert!(warning.hint().unwrap().contains("phpvm install 8.4.1"));
    }

    #[test]
    fn test_missing_artifact_hint_names_version() {
        let warning = Warning::ToolArtifactMissing {
            runtime: "8.3.14".into(),
            tool: "2.8.11".into(),
            path: PathBuf::from("/x/tools/2.8.11/composer.phar"),
        };
        assert!(warning.to_string().contains("2.8.11"));
        assert_eq!(
            warning.hint().as_deref(),
            Some("Re-run `phpvm install 8.3.14` to fetch Composer")
        );
    }
}
