use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::config::OrchestratorConfig;
use crate::diagnostic::DiagnosticSink;
use crate::registry::ProjectRegistry;
use crate::symbols::{SymbolHandle, SymbolResolver};

/// Shared state handed to every administrator and concurrent unit.
///
/// Built once at the end of discovery; the registry inside is frozen, so
/// concurrent readers need no locking. The diagnostic sink and the
/// cancellation token are the only pieces a unit may act on.
pub struct RunContext {
    config: OrchestratorConfig,
    registry: ProjectRegistry,
    symbols: Arc<dyn SymbolResolver>,
    root_symbol: SymbolHandle,
    diagnostics: DiagnosticSink,
    cancel: CancelToken,
}

impl RunContext {
    pub(crate) fn new(
        config: OrchestratorConfig,
        registry: ProjectRegistry,
        symbols: Arc<dyn SymbolResolver>,
        root_symbol: SymbolHandle,
        diagnostics: DiagnosticSink,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config,
            registry,
            symbols,
            root_symbol,
            diagnostics,
            cancel,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    pub fn symbols(&self) -> &dyn SymbolResolver {
        self.symbols.as_ref()
    }

    /// Handle of the configured root namespace.
    pub fn root_symbol(&self) -> &SymbolHandle {
        &self.root_symbol
    }

    pub fn diagnostics(&self) -> &DiagnosticSink {
        &self.diagnostics
    }

    /// The run's cancellation token. Long-running administrator steps
    /// should observe it at safe points.
    pub fn cancel(&self) -> &CancelToken {
        &self.cancel
    }
}
