use std::sync::Arc;

use clap::Args;
use eyre::Result;
use quill_codegen::SymbolTable;

use super::{TreeArgs, UnwrapOrExit};

#[derive(Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub tree: TreeArgs,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let mut orchestrator = self.tree.orchestrator();

        orchestrator
            .bind_symbols(Arc::new(SymbolTable::permissive()))
            .unwrap_or_exit();
        orchestrator.discover().unwrap_or_exit();

        let report = orchestrator.report();
        println!("Modules ({}):", report.projects.len());
        for (namespace, directory) in &report.projects {
            println!("  {namespace} ({})", directory.display());
        }

        if !report.diagnostics.is_empty() {
            println!();
            println!("Diagnostics:");
            for diagnostic in &report.diagnostics {
                println!("  {diagnostic}");
            }
        }
        Ok(())
    }
}
