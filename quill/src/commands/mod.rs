mod check;
mod clean;
mod generate;

use std::path::PathBuf;
use std::sync::Arc;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use clean::CleanCommand;
use eyre::Result;
use generate::GenerateCommand;
use quill_codegen::{
    DEFAULT_COMMON_PROJECT, DEFAULT_SOURCE_EXTENSION, Orchestrator, OrchestratorConfig,
    PipelineError,
};
use quill_core::{FsOutput, NamespacePath};

/// Extension trait for exiting on fatal pipeline errors with pretty
/// formatting.
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for quill_codegen::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(PipelineError::Scan(e)) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
    }
}

/// Arguments shared by every command that walks a module tree.
#[derive(clap::Args)]
pub(crate) struct TreeArgs {
    /// Root directory scanned for module manifests
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Root namespace of the tree
    #[arg(short, long)]
    pub namespace: NamespacePath,

    /// Project aliased as the common pseudo-project
    #[arg(long, default_value = DEFAULT_COMMON_PROJECT)]
    pub common: NamespacePath,

    /// Disable common-project aliasing (the root is used instead)
    #[arg(long, conflicts_with = "common")]
    pub no_common: bool,

    /// Extension of module source files
    #[arg(long, default_value = DEFAULT_SOURCE_EXTENSION)]
    pub source_ext: String,

    /// Name of the generated output directory
    #[arg(long, default_value = "Generated")]
    pub generated_dir: String,
}

impl TreeArgs {
    fn config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new(self.namespace.clone(), self.root.clone())
            .common_project((!self.no_common).then(|| self.common.clone()))
            .source_extension(&self.source_ext)
    }

    pub fn orchestrator(&self) -> Orchestrator {
        let backend = Arc::new(FsOutput::with_generated_dir(&self.generated_dir));
        Orchestrator::new(self.config(), backend)
    }
}

#[derive(Parser)]
#[command(name = "quill")]
#[command(version)]
#[command(about = "Generate per-module artifacts from manifest-described source trees")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run().await,
            Commands::Check(cmd) => cmd.run(),
            Commands::Clean(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Discover modules and generate artifacts
    Generate(GenerateCommand),

    /// Discover modules and report what would be registered
    Check(CheckCommand),

    /// Delete previously generated output
    Clean(CleanCommand),
}
