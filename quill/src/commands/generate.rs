use std::sync::Arc;

use clap::Args;
use eyre::{Result, eyre};
use quill_codegen::SymbolTable;
use quill_codegen::admins::InventoryAdministrator;

use super::{TreeArgs, UnwrapOrExit};

#[derive(Args)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub tree: TreeArgs,

    /// Delete previously generated output before generating
    #[arg(long)]
    pub clean: bool,
}

impl GenerateCommand {
    pub async fn run(&self) -> Result<()> {
        let mut orchestrator = self
            .tree
            .orchestrator()
            .administrator(InventoryAdministrator::new());

        orchestrator
            .bind_symbols(Arc::new(SymbolTable::permissive()))
            .unwrap_or_exit();
        orchestrator.discover().unwrap_or_exit();
        orchestrator.initialize_administrators()?;

        if orchestrator.collect().await?.is_cancelled() {
            return Err(eyre!("run cancelled during collection; no output was written"));
        }
        orchestrator.run_deferred_callbacks()?;

        if self.clean {
            orchestrator.clear_output()?;
        }
        if orchestrator.generate().await?.is_cancelled() {
            return Err(eyre!("run cancelled before generation; no output was written"));
        }
        orchestrator.close_writers()?;

        let report = orchestrator.report();
        println!("Modules ({}):", report.projects.len());
        for (namespace, directory) in &report.projects {
            println!("  {namespace} ({})", directory.display());
        }

        if report.warning_count() > 0 {
            println!();
            println!("{} warning(s); rerun with RUST_LOG=warn for details", report.warning_count());
        }
        if report.has_errors() {
            return Err(eyre!(
                "generation finished with {} error(s)",
                report.error_count()
            ));
        }
        Ok(())
    }
}
