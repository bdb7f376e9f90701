//! `phpvm install`.

use super::Context;
use crate::cli::GlobalArgs;
use phpvm_core::Result;
use phpvm_telemetry::TimingGuard;
use phpvm_toolchain::{HttpFetcher, Installer, ToolInstall};
use phpvm_ui::{Output, Style};
use std::sync::Arc;

pub async fn run(global: &GlobalArgs, version: &str, output: &Output) -> Result<()> {
    let _timing = TimingGuard::new("install");
    let context = Context::load(global)?;

    let fetcher = HttpFetcher::new(context.download_options(output.progress_enabled()))?;
    let installer = Installer::new(
        context.layout.clone(),
        context.catalog.clone(),
        Arc::new(fetcher),
    );

    output.status("Installing", &format!("PHP {}", version));
    let report = installer.install(version).await?;

    if report.was_cached {
        output.status(
            "Skipped",
            &format!(
                "PHP {} is already installed at {}",
                version,
                report.install_dir.display()
            ),
        );
    } else {
        output.status(
            "Installed",
            &format!("PHP {} to {}", version, report.install_dir.display()),
        );
    }

    match &report.tool {
        ToolInstall::Installed {
            version: tool,
            downloaded,
            ..
        } => {
            if !downloaded {
                output.verbose(&format!("Composer {} was already downloaded", tool));
            }
            output.status("Linked", &format!("Composer {} to PHP {}", tool, version));
        }
        ToolInstall::AlreadyConfigured => {
            output.info("Composer is already configured for this PHP version");
        }
        ToolInstall::Skipped(warning) => {
            output.warn(&warning.to_string());
            if let Some(hint) = warning.hint() {
                output.info(&hint);
            }
        }
    }

    output.info(&format!(
        "Use {} to activate this version",
        Style::command(format!("phpvm switch {}", version))
    ));
    Ok(())
}
