//! The pipeline orchestrator.
//!
//! Drives one generation run through a fixed sequence of phases:
//!
//! ```text
//! bind_symbols → discover → initialize_administrators → collect
//!     → run_deferred_callbacks → generate → close_writers
//! ```
//!
//! Collection and generation fan out across projects and administrators
//! on the tokio runtime; everything else runs sequentially on the calling
//! task. A cooperative cancellation observed during collection moves the
//! pipeline to a terminal `Cancelled` state from which callbacks and
//! generation are unreachable, so no partial output is ever finalized.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quill_core::{NamespacePath, OutputBackend};
use quill_manifest::ManifestScanner;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::admin::Administrator;
use crate::callbacks::CallbackQueue;
use crate::cancel::CancelToken;
use crate::config::OrchestratorConfig;
use crate::context::RunContext;
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::discover::register_from_descriptor;
use crate::error::{PipelineError, Result};
use crate::project::Project;
use crate::registry::ProjectRegistry;
use crate::symbols::{SymbolHandle, SymbolResolver};

/// Pipeline states, entered in strict order. No state is re-enterable;
/// a fresh orchestrator is required per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Created,
    SymbolsBound,
    Discovered,
    PseudoProjectsReady,
    AdministratorsInitialized,
    Collected,
    CallbacksRun,
    Generated,
    OutputClosed,
    /// Terminal: a cancellation was observed during collection.
    Cancelled,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Created => "created",
            PipelineState::SymbolsBound => "symbols-bound",
            PipelineState::Discovered => "discovered",
            PipelineState::PseudoProjectsReady => "pseudo-projects-ready",
            PipelineState::AdministratorsInitialized => "administrators-initialized",
            PipelineState::Collected => "collected",
            PipelineState::CallbacksRun => "callbacks-run",
            PipelineState::Generated => "generated",
            PipelineState::OutputClosed => "output-closed",
            PipelineState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Outcome of a cancellable phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum PhaseOutcome {
    Completed,
    Cancelled,
}

impl PhaseOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PhaseOutcome::Cancelled)
    }
}

/// Summary of a run, for rendering by callers.
#[derive(Debug)]
pub struct RunReport {
    pub state: PipelineState,
    /// (namespace, directory) pairs in registration order.
    pub projects: Vec<(String, PathBuf)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity.is_warning()).count()
    }
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    backend: Arc<dyn OutputBackend>,
    administrators: Vec<Arc<dyn Administrator>>,
    state: PipelineState,
    cancel: CancelToken,
    diagnostics: DiagnosticSink,
    resolver: Option<Arc<dyn SymbolResolver>>,
    root_symbol: Option<SymbolHandle>,
    context: Option<Arc<RunContext>>,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig, backend: Arc<dyn OutputBackend>) -> Self {
        Self {
            config,
            backend,
            administrators: Vec::new(),
            state: PipelineState::Created,
            cancel: CancelToken::new(),
            diagnostics: DiagnosticSink::new(),
            resolver: None,
            root_symbol: None,
            context: None,
        }
    }

    /// Register an administrator. Registration order is initialization
    /// and callback-gathering order.
    pub fn administrator(mut self, admin: impl Administrator + 'static) -> Self {
        self.administrators.push(Arc::new(admin));
        self
    }

    /// A handle for requesting cooperative cancellation of this run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    /// The run context, available once discovery has completed.
    pub fn context(&self) -> Option<&Arc<RunContext>> {
        self.context.as_ref()
    }

    /// Summary of the run so far.
    pub fn report(&self) -> RunReport {
        RunReport {
            state: self.state,
            projects: self
                .context
                .as_ref()
                .map(|ctx| ctx.registry().snapshot())
                .unwrap_or_default(),
            diagnostics: self.diagnostics.snapshot(),
        }
    }

    fn expect_state(&self, phase: &'static str, expected: PipelineState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PipelineError::PhaseOrder {
                phase,
                expected,
                actual: self.state,
            })
        }
    }

    fn run_context(&self) -> Arc<RunContext> {
        self.context
            .clone()
            .expect("run context exists once discovery has completed")
    }

    /// Attach the compiled unit's symbol resolver to this run.
    ///
    /// Fails with [`PipelineError::RootNamespaceNotFound`] if the
    /// configured root namespace does not resolve; that aborts the run
    /// before discovery. Administrators' required namespaces are checked
    /// here too, but a miss is only a warning.
    pub fn bind_symbols(&mut self, resolver: Arc<dyn SymbolResolver>) -> Result<()> {
        self.expect_state("bind_symbols", PipelineState::Created)?;

        let root_symbol = resolver
            .resolve_namespace(&self.config.root_namespace)
            .ok_or_else(|| {
                PipelineError::RootNamespaceNotFound(self.config.root_namespace.clone())
            })?;

        for admin in &self.administrators {
            for required in admin.required_namespaces() {
                if resolver.resolve_namespace(&required).is_none() {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            "bind_symbols",
                            format!(
                                "administrator `{}` requires namespace `{required}`, which the compiled unit does not expose",
                                admin.name(),
                            ),
                        )
                        .about(required.as_str()),
                    );
                }
            }
        }

        self.resolver = Some(resolver);
        self.root_symbol = Some(root_symbol);
        self.state = PipelineState::SymbolsBound;
        Ok(())
    }

    /// Scan the root tree for manifests and populate the registry:
    /// qualifying modules, their editor siblings, then the root and
    /// common pseudo-projects.
    pub fn discover(&mut self) -> Result<()> {
        self.expect_state("discover", PipelineState::SymbolsBound)?;
        let resolver = self
            .resolver
            .clone()
            .expect("resolver is bound in the symbols-bound state");
        let root_symbol = self
            .root_symbol
            .clone()
            .expect("root symbol is resolved in the symbols-bound state");

        let scanner = ManifestScanner::new(&self.config.root_directory);
        let descriptors = scanner.scan().map_err(PipelineError::Scan)?;

        let mut registry = ProjectRegistry::new(self.config.common_project.clone());
        for descriptor in &descriptors {
            register_from_descriptor(
                &mut registry,
                descriptor,
                &self.config,
                resolver.as_ref(),
                self.backend.as_ref(),
                &self.diagnostics,
            );
        }
        self.state = PipelineState::Discovered;

        let root_project = Project::new(
            self.config.root_directory.clone(),
            self.config.root_namespace.clone(),
            Some(root_symbol.clone()),
            self.backend.scoped_writer(&self.config.root_directory),
        );
        registry.finalize_pseudo_projects(root_project, &self.diagnostics);
        info!(
            manifests = descriptors.len(),
            projects = registry.len(),
            "discovery complete"
        );

        self.context = Some(Arc::new(RunContext::new(
            self.config.clone(),
            registry,
            resolver,
            root_symbol,
            self.diagnostics.clone(),
            self.cancel.clone(),
        )));
        self.state = PipelineState::PseudoProjectsReady;
        Ok(())
    }

    /// One-time administrator setup, strictly sequential in registration
    /// order. Administrators may depend on ordering or shared external
    /// state here, unlike in the concurrent phases.
    pub fn initialize_administrators(&mut self) -> Result<()> {
        self.expect_state(
            "initialize_administrators",
            PipelineState::PseudoProjectsReady,
        )?;
        let ctx = self.run_context();
        for admin in &self.administrators {
            admin
                .initialize(&ctx)
                .map_err(|reason| PipelineError::AdministratorInit {
                    name: admin.name(),
                    reason,
                })?;
            debug!(administrator = admin.name(), "initialized");
        }
        self.state = PipelineState::AdministratorsInitialized;
        Ok(())
    }

    /// Run every project's and every administrator's collection step.
    ///
    /// The two groups, and all members within each group, run
    /// concurrently; there is no ordering guarantee anywhere in this
    /// phase. Per-unit failures become error diagnostics without failing
    /// sibling units. The cancellation token is checked after each group
    /// joins; if set, the pipeline ends in `Cancelled` and downstream
    /// phases are unreachable.
    pub async fn collect(&mut self) -> Result<PhaseOutcome> {
        self.expect_state("collect", PipelineState::AdministratorsInitialized)?;
        let ctx = self.run_context();

        let mut project_tasks: JoinSet<(NamespacePath, std::io::Result<usize>)> = JoinSet::new();
        for project in ctx.registry().projects() {
            let project = project.clone();
            let extension = ctx.config().source_extension.clone();
            project_tasks.spawn_blocking(move || {
                let outcome = project.collect_sources(&extension);
                (project.namespace().clone(), outcome)
            });
        }

        let mut admin_tasks: JoinSet<(&'static str, eyre::Result<()>)> = JoinSet::new();
        for admin in &self.administrators {
            let admin = admin.clone();
            let ctx = ctx.clone();
            admin_tasks.spawn(async move {
                let name = admin.name();
                (name, admin.collect(ctx).await)
            });
        }

        while let Some(joined) = project_tasks.join_next().await {
            match joined {
                Ok((namespace, Ok(count))) => {
                    debug!(%namespace, sources = count, "project collected");
                }
                Ok((namespace, Err(e))) => self.diagnostics.push(
                    Diagnostic::error(
                        "collect",
                        format!("project `{namespace}` failed to collect sources: {e}"),
                    )
                    .about(namespace.as_str()),
                ),
                Err(join) => self.diagnostics.push(Diagnostic::error(
                    "collect",
                    format!("a project collection task panicked: {join}"),
                )),
            }
        }
        if self.cancel.is_cancelled() {
            // In-flight administrators keep running detached; their
            // results are discarded along with the rest of the phase.
            admin_tasks.detach_all();
            self.state = PipelineState::Cancelled;
            info!("collection cancelled");
            return Ok(PhaseOutcome::Cancelled);
        }

        while let Some(joined) = admin_tasks.join_next().await {
            match joined {
                Ok((name, Ok(()))) => debug!(administrator = name, "administrator collected"),
                Ok((name, Err(e))) => self.diagnostics.push(
                    Diagnostic::error(
                        "collect",
                        format!("administrator `{name}` failed during collect: {e:#}"),
                    )
                    .about(name),
                ),
                Err(join) => self.diagnostics.push(Diagnostic::error(
                    "collect",
                    format!("an administrator collection task panicked: {join}"),
                )),
            }
        }
        if self.cancel.is_cancelled() {
            self.state = PipelineState::Cancelled;
            info!("collection cancelled");
            return Ok(PhaseOutcome::Cancelled);
        }

        self.state = PipelineState::Collected;
        Ok(PhaseOutcome::Completed)
    }

    /// Gather every deferred callback emitted during collection and run
    /// them sequentially in ascending priority order (ties in emission
    /// order) on the calling task. Callback bodies may rely on all
    /// collection work having completed.
    pub fn run_deferred_callbacks(&mut self) -> Result<()> {
        self.expect_state("run_deferred_callbacks", PipelineState::Collected)?;

        let mut queue = CallbackQueue::new();
        for admin in &self.administrators {
            for callback in admin.deferred_callbacks() {
                queue.push(callback);
            }
        }
        let ran = queue.drain_run();
        debug!(callbacks = ran, "deferred callbacks complete");

        self.state = PipelineState::CallbacksRun;
        Ok(())
    }

    /// Run every administrator's generation step concurrently. An
    /// administrator must not depend on another's generated output
    /// existing yet. Per-unit failures become error diagnostics.
    pub async fn generate(&mut self) -> Result<PhaseOutcome> {
        self.expect_state("generate", PipelineState::CallbacksRun)?;
        if self.cancel.is_cancelled() {
            self.state = PipelineState::Cancelled;
            return Ok(PhaseOutcome::Cancelled);
        }
        let ctx = self.run_context();

        let mut tasks: JoinSet<(&'static str, eyre::Result<()>)> = JoinSet::new();
        for admin in &self.administrators {
            let admin = admin.clone();
            let ctx = ctx.clone();
            tasks.spawn(async move {
                let name = admin.name();
                (name, admin.generate(ctx).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(()))) => debug!(administrator = name, "administrator generated"),
                Ok((name, Err(e))) => self.diagnostics.push(
                    Diagnostic::error(
                        "generate",
                        format!("administrator `{name}` failed during generate: {e:#}"),
                    )
                    .about(name),
                ),
                Err(join) => self.diagnostics.push(Diagnostic::error(
                    "generate",
                    format!("an administrator generation task panicked: {join}"),
                )),
            }
        }

        self.state = PipelineState::Generated;
        Ok(PhaseOutcome::Completed)
    }

    /// Delete prior generated output for every project and for the root
    /// pseudo-project. Callers invoke this before `generate` when a
    /// clean rebuild is wanted; valid any time between discovery and
    /// generation.
    pub fn clear_output(&self) -> Result<()> {
        if self.state < PipelineState::PseudoProjectsReady
            || self.state > PipelineState::CallbacksRun
        {
            return Err(PipelineError::PhaseOrder {
                phase: "clear_output",
                expected: PipelineState::PseudoProjectsReady,
                actual: self.state,
            });
        }
        let ctx = self.run_context();

        for project in ctx.registry().projects() {
            project.writer().clear()?;
        }
        if !ctx.registry().root_is_registered() {
            ctx.registry().root().writer().clear()?;
        }
        debug!("previous generated output cleared");
        Ok(())
    }

    /// Flush and close every project writer and the root pseudo-project
    /// writer, each exactly once. The common pseudo-project aliases one
    /// of them and is never closed separately.
    pub fn close_writers(&mut self) -> Result<()> {
        self.expect_state("close_writers", PipelineState::Generated)?;
        let ctx = self.run_context();

        for project in ctx.registry().projects() {
            project.writer().close()?;
        }
        if !ctx.registry().root_is_registered() {
            ctx.registry().root().writer().close()?;
        }

        self.state = PipelineState::OutputClosed;
        info!("generated output flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quill_core::FsOutput;
    use tempfile::TempDir;

    use super::*;
    use crate::symbols::SymbolTable;

    fn orchestrator_in(temp: &TempDir) -> Orchestrator {
        let config = OrchestratorConfig::new(
            NamespacePath::parse("Root").unwrap(),
            temp.path().to_path_buf(),
        );
        Orchestrator::new(config, Arc::new(FsOutput::new()))
    }

    #[test]
    fn phases_enforce_ordering() {
        let temp = TempDir::new().unwrap();
        let mut orchestrator = orchestrator_in(&temp);

        let err = orchestrator.discover().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::PhaseOrder {
                phase: "discover",
                ..
            }
        ));
    }

    #[test]
    fn bind_symbols_requires_the_root_namespace() {
        let temp = TempDir::new().unwrap();
        let mut orchestrator = orchestrator_in(&temp);

        let err = orchestrator
            .bind_symbols(Arc::new(SymbolTable::new()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::RootNamespaceNotFound(_)));
        assert_eq!(orchestrator.state(), PipelineState::Created);
    }

    #[test]
    fn bind_symbols_cannot_run_twice() {
        let temp = TempDir::new().unwrap();
        let mut orchestrator = orchestrator_in(&temp);

        orchestrator
            .bind_symbols(Arc::new(SymbolTable::permissive()))
            .unwrap();
        let err = orchestrator
            .bind_symbols(Arc::new(SymbolTable::permissive()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::PhaseOrder { .. }));
    }

    #[tokio::test]
    async fn empty_tree_promotes_root_and_completes() {
        let temp = TempDir::new().unwrap();
        let mut orchestrator = orchestrator_in(&temp);

        orchestrator
            .bind_symbols(Arc::new(SymbolTable::permissive()))
            .unwrap();
        orchestrator.discover().unwrap();
        orchestrator.initialize_administrators().unwrap();
        assert!(!orchestrator.collect().await.unwrap().is_cancelled());
        orchestrator.run_deferred_callbacks().unwrap();
        assert!(!orchestrator.generate().await.unwrap().is_cancelled());
        orchestrator.close_writers().unwrap();

        let report = orchestrator.report();
        assert_eq!(report.state, PipelineState::OutputClosed);
        assert_eq!(report.projects.len(), 1);
        assert!(!report.has_errors());
    }
}
