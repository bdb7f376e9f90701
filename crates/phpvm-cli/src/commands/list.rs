//! `phpvm list`.

use super::Context;
use crate::cli::GlobalArgs;
use phpvm_core::Result;
use phpvm_toolchain::list_catalog;
use phpvm_ui::{Output, Style};

pub fn run(global: &GlobalArgs, output: &Output) -> Result<()> {
    let context = Context::load(global)?;
    let entries = list_catalog(&context.catalog, &context.layout);

    output.header("Available PHP versions:");
    output.data(&format!("  {:<12} {:<12}", "Version", "Released"));

    for entry in &entries {
        let marker = if entry.installed { "*" } else { " " };
        let state = if entry.active {
            Style::success("active").to_string()
        } else {
            String::new()
        };
        let line = format!(
            "{} {} {:<12} {}",
            marker,
            Style::version(format!("{:<12}", entry.runtime.version)),
            entry.runtime.released.to_string(),
            state
        );
        output.data(line.trim_end());
    }

    output.info("");
    output.info(&format!(
        "Use {} to install a specific version",
        Style::command("phpvm install <version>")
    ));
    output.info("* = Already installed");
    Ok(())
}
