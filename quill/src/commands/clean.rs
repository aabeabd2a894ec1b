use std::sync::Arc;

use clap::Args;
use eyre::Result;
use quill_codegen::SymbolTable;

use super::{TreeArgs, UnwrapOrExit};

#[derive(Args)]
pub struct CleanCommand {
    #[command(flatten)]
    pub tree: TreeArgs,
}

impl CleanCommand {
    pub fn run(&self) -> Result<()> {
        let mut orchestrator = self.tree.orchestrator();

        orchestrator
            .bind_symbols(Arc::new(SymbolTable::permissive()))
            .unwrap_or_exit();
        orchestrator.discover().unwrap_or_exit();
        orchestrator.clear_output()?;

        let report = orchestrator.report();
        println!(
            "Removed generated output for {} module(s)",
            report.projects.len()
        );
        Ok(())
    }
}
