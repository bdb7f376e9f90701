//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use phpvm_core::EnvVars;
use std::path::PathBuf;

use crate::styles::STYLES;

/// phpvm - PHP version manager
#[derive(Parser, Debug)]
#[command(name = "phpvm")]
#[command(author, version, about = "Install and switch between PHP versions, with Composer")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(styles = STYLES)]
#[command(arg_required_else_help = true)]
#[command(after_help = "Use `phpvm help <command>` for more information about a command.")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true, env = EnvVars::PHPVM_VERBOSE)]
    pub verbose: bool,

    /// Suppress output (use twice for complete silence)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = EnvVars::PHPVM_QUIET)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long, global = true, env = EnvVars::PHPVM_NO_COLOR)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = EnvVars::PHPVM_CONFIG_FILE)]
    pub config_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a PHP version and a compatible Composer
    Install {
        /// PHP version to install (e.g., 8.4.1)
        version: String,
    },

    /// List known PHP versions and which are installed
    #[command(visible_alias = "ls")]
    List,

    /// Show the active PHP version, or switch to another installed one
    #[command(visible_alias = "use")]
    Switch {
        /// PHP version to activate; omit to show the current one
        version: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
