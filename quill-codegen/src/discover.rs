//! Per-manifest registration: qualification, symbol resolution, and
//! editor-sibling derivation.

use quill_core::OutputBackend;
use quill_manifest::{EDITOR_PLATFORM, ModuleDescriptor};
use tracing::debug;

use crate::config::OrchestratorConfig;
use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::project::Project;
use crate::registry::ProjectRegistry;
use crate::symbols::SymbolResolver;

/// Register whatever projects one manifest gives rise to: the module
/// itself when it qualifies, and its editor sibling when declared.
pub(crate) fn register_from_descriptor(
    registry: &mut ProjectRegistry,
    descriptor: &ModuleDescriptor,
    config: &OrchestratorConfig,
    resolver: &dyn SymbolResolver,
    backend: &dyn OutputBackend,
    diagnostics: &DiagnosticSink,
) {
    let namespace = descriptor.name().clone();
    let symbol = resolver.resolve_namespace(&namespace);
    if symbol.is_none() {
        diagnostics.push(
            Diagnostic::warning(
                "discover",
                format!(
                    "namespace `{namespace}` from the manifest in `{}` was not found in the compiled unit",
                    descriptor.directory().display(),
                ),
            )
            .about(namespace.as_str()),
        );
    }

    if descriptor.qualifies(&config.source_extension) {
        let project = Project::new(
            descriptor.directory().to_path_buf(),
            namespace.clone(),
            symbol.clone(),
            backend.scoped_writer(descriptor.directory()),
        );
        registry.register(project, diagnostics);
    } else {
        debug!(%namespace, "manifest backs no real module, skipping base registration");
    }

    if !descriptor.declares_editor() {
        return;
    }

    // An editor sibling exists only if the compiled unit exposes a child
    // `Editor` namespace under the module's own namespace.
    let Some(parent) = symbol else { return };
    let Some(editor_symbol) = resolver.child_namespace(&parent, EDITOR_PLATFORM) else {
        debug!(%namespace, "no child Editor namespace, skipping editor sibling");
        return;
    };

    let editor_dir = descriptor.editor_directory();
    if !editor_dir.is_dir() {
        diagnostics.push(
            Diagnostic::warning(
                "discover",
                format!("module `{namespace}` declares the Editor platform but has no `Editor` folder"),
            )
            .about(namespace.as_str()),
        );
        return;
    }

    let editor_namespace = namespace
        .insert_after_root(EDITOR_PLATFORM)
        .expect("`Editor` is a valid namespace segment");
    let project = Project::new(
        editor_dir.clone(),
        editor_namespace,
        Some(editor_symbol),
        backend.scoped_writer(&editor_dir),
    );
    registry.register(project, diagnostics);
}
