//! Pipeline orchestrator core for the Quill generator.
//!
//! The [`Orchestrator`] drives one generation run over a tree of modules
//! discovered from manifests: it binds the compiled unit's symbols,
//! registers projects (plus the root and common pseudo-projects), then
//! fans the registered [`Administrator`]s out through the collect /
//! deferred-callback / generate phases and finally flushes every
//! project's writer.
//!
//! # Example
//!
//! ```ignore
//! let config = OrchestratorConfig::new(root_namespace, root_dir);
//! let mut orchestrator = Orchestrator::new(config, Arc::new(FsOutput::new()))
//!     .administrator(InventoryAdministrator::new());
//!
//! orchestrator.bind_symbols(Arc::new(SymbolTable::permissive()))?;
//! orchestrator.discover()?;
//! orchestrator.initialize_administrators()?;
//! if orchestrator.collect().await?.is_cancelled() {
//!     return Ok(());
//! }
//! orchestrator.run_deferred_callbacks()?;
//! orchestrator.generate().await?;
//! orchestrator.close_writers()?;
//! ```

mod admin;
pub mod admins;
mod callbacks;
mod cancel;
mod config;
mod context;
mod diagnostic;
mod discover;
mod error;
mod orchestrator;
mod project;
mod registry;
mod symbols;

pub use admin::Administrator;
pub use callbacks::{CallbackQueue, DeferredCallback};
pub use cancel::CancelToken;
pub use config::{DEFAULT_COMMON_PROJECT, DEFAULT_SOURCE_EXTENSION, OrchestratorConfig};
pub use context::RunContext;
pub use diagnostic::{Diagnostic, DiagnosticSink, Severity};
pub use error::{PipelineError, Result};
pub use orchestrator::{Orchestrator, PhaseOutcome, PipelineState, RunReport};
pub use project::Project;
pub use registry::ProjectRegistry;
pub use symbols::{SymbolHandle, SymbolResolver, SymbolTable};
