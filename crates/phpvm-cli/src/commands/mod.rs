//! Command implementations.

mod completions;
mod install;
mod list;
mod switch;

use crate::cli::{Cli, Commands, GlobalArgs};
use anyhow::Result;
use phpvm_config::{GlobalConfig, install_root, load_global_config};
use phpvm_core::Error;
use phpvm_toolchain::{Catalog, DownloadOptions, Layout};
use phpvm_ui::{Output, Verbosity};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Run the CLI command.
pub async fn run(cli: Cli) -> Result<i32> {
    let output = Output::with_verbosity(Verbosity::from_flags(
        cli.global.quiet,
        cli.global.verbose,
    ));

    let result = match cli.command {
        Commands::Install { version } => install::run(&cli.global, &version, &output).await,
        Commands::List => list::run(&cli.global, &output),
        Commands::Switch { version: None } => switch::show(&output).await,
        Commands::Switch {
            version: Some(version),
        } => switch::run(&cli.global, &version, &output).await,
        Commands::Completions { shell } => return completions::generate(shell),
    };

    output.flush();
    Ok(match result {
        Ok(()) => 0,
        Err(e) => report(&output, &e),
    })
}

/// Print `error` and return its exit code.
fn report(output: &Output, error: &Error) -> i32 {
    output.print_error(error);
    output.flush();
    error.exit_code().into()
}

/// Settings and catalog shared by the commands.
pub struct Context {
    pub config: GlobalConfig,
    pub layout: Layout,
    pub catalog: Arc<Catalog>,
}

impl Context {
    /// Load the config, then the installation root and catalog it names.
    pub fn load(global: &GlobalArgs) -> phpvm_core::Result<Self> {
        let config = load_global_config(global.config_file.as_deref())?;
        let root = install_root(&config)?;
        debug!("Installation root: {}", root.display());
        let catalog = Catalog::load(config.catalog.as_deref())?;

        Ok(Self {
            layout: Layout::new(root),
            catalog: Arc::new(catalog),
            config,
        })
    }

    /// Download settings from the `[download]` section.
    pub fn download_options(&self, show_progress: bool) -> DownloadOptions {
        let download = &self.config.download;
        DownloadOptions {
            timeout: Duration::from_secs(download.timeout_secs),
            retries: download.retries,
            backoff: Duration::from_millis(download.backoff_ms),
            show_progress,
        }
    }
}
