//! `phpvm switch`.

use super::Context;
use crate::cli::GlobalArgs;
use phpvm_config::home_dir;
use phpvm_core::Result;
use phpvm_telemetry::TimingGuard;
use phpvm_toolchain::{Activator, ShellIntegration, ToolBinding, Warning, current_active};
use phpvm_ui::Output;

/// Print the banner of the PHP on PATH.
pub async fn show(output: &Output) -> Result<()> {
    let banner = current_active().await?;
    output.info("Current PHP version:");
    output.data(&banner);
    Ok(())
}

/// Activate an installed version.
pub async fn run(global: &GlobalArgs, version: &str, output: &Output) -> Result<()> {
    let _timing = TimingGuard::new("switch");
    let context = Context::load(global)?;

    let home = home_dir()?;
    let shell = match context.config.shell.expanded_profiles(&home) {
        Some(profiles) => ShellIntegration::with_profiles(profiles),
        None => ShellIntegration::for_home(&home),
    };

    let activator = Activator::new(context.layout.clone(), context.catalog.clone(), shell)
        .with_verification(context.config.shell.verify);
    let activation = activator.activate(version).await?;

    if let ToolBinding::Bound { version: tool, .. } = &activation.tool {
        output.status("Linked", &format!("Composer {} to PHP {}", tool, version));
    }
    output.status("Switched", &format!("to PHP {}", version));

    for warning in &activation.warnings {
        output.warn(&warning.to_string());
        if let Some(hint) = warning.hint() {
            output.info(&hint);
        }
    }

    let bin_dir = context.layout.bin_dir();
    let shell_failed = activation
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ShellUpdateFailed { .. }));

    if activation.path_added {
        output.status("Added", &format!("{} to your PATH", bin_dir.display()));
        if let Some(ref verification) = activation.verification {
            output.info("Verification:");
            for line in verification.lines() {
                output.info(&format!("  {}", line));
            }
        }
    } else if !shell_failed {
        output.info(&format!("{} is already in your PATH", bin_dir.display()));
    }

    Ok(())
}
