//! The administrator plugin contract.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use quill_core::NamespacePath;

use crate::callbacks::DeferredCallback;
use crate::context::RunContext;

/// A pluggable pipeline component.
///
/// Administrators are registered on the orchestrator before a run starts
/// and live for exactly one run; none is added or removed mid-run.
/// Collection and generation fan out concurrently across administrators,
/// so neither step may assume another administrator has already run.
/// Cross-administrator coordination belongs in deferred callbacks, which
/// execute only after every collection step has finished.
///
/// Errors returned from `collect` and `generate` are recorded as
/// diagnostics against this administrator without failing its siblings;
/// an `initialize` error is fatal to the run.
#[async_trait]
pub trait Administrator: Send + Sync {
    /// Name used in diagnostics and logs.
    fn name(&self) -> &'static str;

    /// Namespaces this administrator expects the compiled unit to
    /// expose. Misses are reported as warnings when symbols are bound.
    fn required_namespaces(&self) -> Vec<NamespacePath> {
        Vec::new()
    }

    /// One-time setup, invoked sequentially in registration order.
    #[allow(unused_variables)]
    fn initialize(&self, ctx: &RunContext) -> Result<()> {
        Ok(())
    }

    /// Gather whatever this administrator needs from the project model.
    async fn collect(&self, ctx: Arc<RunContext>) -> Result<()>;

    /// Callbacks emitted during collection, handed over once after all
    /// collection has completed. Called exactly once per run.
    fn deferred_callbacks(&self) -> Vec<DeferredCallback> {
        Vec::new()
    }

    /// Write generated artifacts through the project writers.
    async fn generate(&self, ctx: Arc<RunContext>) -> Result<()>;
}
