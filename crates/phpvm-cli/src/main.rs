//! phpvm - PHP version manager
//!
//! Installs PHP binaries with a matching Composer and switches the active
//! version for the current user.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod styles;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    phpvm_ui::configure_colors(cli.global.no_color);
    phpvm_telemetry::init(cli.global.verbose);

    let exit_code = commands::run(cli).await?;

    std::process::exit(exit_code);
}
