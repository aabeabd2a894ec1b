use quill_core::{NamespacePath, WriterError};
use thiserror::Error;

use crate::orchestrator::PipelineState;

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal pipeline errors. Recoverable conditions (malformed manifests,
/// duplicate namespaces, missing editor folders, per-unit failures)
/// surface as diagnostics instead and never abort the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configured root namespace is missing from the compiled unit.
    /// Raised before discovery; nothing else has happened yet.
    #[error("root namespace `{0}` was not found in the compiled unit")]
    RootNamespaceNotFound(NamespacePath),

    /// A phase was invoked out of order. Phases run in a fixed sequence
    /// and none is re-enterable within one run.
    #[error("`{phase}` requires pipeline state `{expected}`, but the pipeline is `{actual}`")]
    PhaseOrder {
        phase: &'static str,
        expected: PipelineState,
        actual: PipelineState,
    },

    #[error("administrator `{name}` failed to initialize: {reason}")]
    AdministratorInit {
        name: &'static str,
        reason: eyre::Report,
    },

    /// The manifest walk itself failed (unreadable tree). Individual
    /// malformed manifests are skipped, not fatal.
    #[error("manifest scan failed")]
    Scan(#[source] Box<quill_manifest::Error>),

    #[error(transparent)]
    Writer(#[from] WriterError),
}
