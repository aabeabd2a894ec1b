//! The project registry.
//!
//! Owns every discovered project plus the two pseudo-projects: the root
//! (always synthesized, represents the tree root) and the common project
//! (an alias of a registered project, or of the root when none matches).
//! The registry is mutated only during the sequential discovery phase and
//! is read-only afterwards, which makes it safe to share across the
//! concurrent collection and generation phases.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use quill_core::NamespacePath;

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::project::Project;

pub struct ProjectRegistry {
    projects: IndexMap<NamespacePath, Arc<Project>>,
    common_name: Option<NamespacePath>,
    root: Option<Arc<Project>>,
    common: Option<Arc<Project>>,
    root_promoted: bool,
}

impl ProjectRegistry {
    /// `common_name` is the namespace aliased as the common project;
    /// `None` disables common resolution (the root is used instead).
    pub fn new(common_name: Option<NamespacePath>) -> Self {
        Self {
            projects: IndexMap::new(),
            common_name,
            root: None,
            common: None,
            root_promoted: false,
        }
    }

    /// Register a project.
    ///
    /// First registration of a namespace wins: a duplicate is reported as
    /// a warning and dropped, and the return value says whether the
    /// project was stored. Registering the project named by the common
    /// name marks it as the common project.
    pub fn register(&mut self, project: Project, diagnostics: &DiagnosticSink) -> bool {
        let namespace = project.namespace().clone();
        if let Some(existing) = self.projects.get(&namespace) {
            diagnostics.push(
                Diagnostic::warning(
                    "discover",
                    format!(
                        "duplicate module namespace `{namespace}`: keeping `{}`, ignoring `{}`",
                        existing.directory().display(),
                        project.directory().display(),
                    ),
                )
                .about(namespace.as_str()),
            );
            return false;
        }

        let project = Arc::new(project);
        if self.common_name.as_ref() == Some(&namespace) {
            self.common = Some(project.clone());
        }
        self.projects.insert(namespace, project);
        true
    }

    /// Synthesize the pseudo-projects once manifest registration is done.
    ///
    /// With zero registered projects the given root project is promoted
    /// to be both the sole project and the root pseudo-project; otherwise
    /// it stays a distinct wrapper around the root writer. The common
    /// alias then resolves to a registered project, or falls back to the
    /// root (with a warning when a common name was configured but never
    /// matched).
    pub fn finalize_pseudo_projects(&mut self, root_project: Project, diagnostics: &DiagnosticSink) {
        let root = Arc::new(root_project);
        if self.projects.is_empty() {
            self.projects.insert(root.namespace().clone(), root.clone());
            self.root_promoted = true;
        }
        self.root = Some(root);

        if self.common.is_none() {
            if let Some(name) = &self.common_name {
                diagnostics.push(
                    Diagnostic::warning(
                        "discover",
                        format!("no project named `{name}`: common falls back to the root"),
                    )
                    .about(name.as_str()),
                );
            }
            self.common = self.root.clone();
        }
    }

    pub fn projects(&self) -> impl Iterator<Item = &Arc<Project>> {
        self.projects.values()
    }

    pub fn get(&self, namespace: &NamespacePath) -> Option<&Arc<Project>> {
        self.projects.get(namespace)
    }

    pub fn contains(&self, namespace: &NamespacePath) -> bool {
        self.projects.contains_key(namespace)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// The root pseudo-project.
    ///
    /// # Panics
    ///
    /// Panics if pseudo-projects have not been finalized.
    pub fn root(&self) -> &Arc<Project> {
        self.root
            .as_ref()
            .expect("pseudo-projects not finalized: did discovery run?")
    }

    /// The common pseudo-project: a registered project or the root.
    ///
    /// # Panics
    ///
    /// Panics if pseudo-projects have not been finalized.
    pub fn common(&self) -> &Arc<Project> {
        self.common
            .as_ref()
            .expect("pseudo-projects not finalized: did discovery run?")
    }

    /// Whether the root pseudo-project was promoted into the project set
    /// (the zero-manifest case). Callers closing writers use this to
    /// avoid closing the root writer twice.
    pub fn root_is_registered(&self) -> bool {
        self.root_promoted
    }

    /// (namespace, directory) pairs in registration order.
    pub fn snapshot(&self) -> Vec<(String, PathBuf)> {
        self.projects
            .iter()
            .map(|(namespace, project)| {
                (namespace.to_string(), project.directory().to_path_buf())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use quill_core::{FsOutput, OutputBackend};
    use tempfile::TempDir;

    use super::*;

    fn project(dir: &TempDir, namespace: &str) -> Project {
        Project::new(
            dir.path().to_path_buf(),
            NamespacePath::parse(namespace).unwrap(),
            None,
            FsOutput::new().scoped_writer(dir.path()),
        )
    }

    fn common_name() -> Option<NamespacePath> {
        Some(NamespacePath::parse("Common").unwrap())
    }

    #[test]
    fn duplicate_namespace_keeps_first_and_warns() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let sink = DiagnosticSink::new();

        let mut registry = ProjectRegistry::new(common_name());
        assert!(registry.register(project(&first, "Game"), &sink));
        assert!(!registry.register(project(&second, "Game"), &sink));

        assert_eq!(registry.len(), 1);
        assert_eq!(sink.warning_count(), 1);
        let kept = registry.get(&NamespacePath::parse("Game").unwrap()).unwrap();
        assert_eq!(kept.directory(), first.path());
    }

    #[test]
    fn registering_the_common_name_marks_common() {
        let dir = TempDir::new().unwrap();
        let root_dir = TempDir::new().unwrap();
        let sink = DiagnosticSink::new();

        let mut registry = ProjectRegistry::new(common_name());
        registry.register(project(&dir, "Common"), &sink);
        registry.finalize_pseudo_projects(project(&root_dir, "Root"), &sink);

        assert_eq!(registry.common().namespace().as_str(), "Common");
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn missing_common_falls_back_to_root_with_warning() {
        let dir = TempDir::new().unwrap();
        let root_dir = TempDir::new().unwrap();
        let sink = DiagnosticSink::new();

        let mut registry = ProjectRegistry::new(common_name());
        registry.register(project(&dir, "Game"), &sink);
        registry.finalize_pseudo_projects(project(&root_dir, "Root"), &sink);

        assert!(Arc::ptr_eq(registry.common(), registry.root()));
        assert_eq!(sink.warning_count(), 1);
    }

    #[test]
    fn disabled_common_falls_back_silently() {
        let dir = TempDir::new().unwrap();
        let root_dir = TempDir::new().unwrap();
        let sink = DiagnosticSink::new();

        let mut registry = ProjectRegistry::new(None);
        registry.register(project(&dir, "Game"), &sink);
        registry.finalize_pseudo_projects(project(&root_dir, "Root"), &sink);

        assert!(Arc::ptr_eq(registry.common(), registry.root()));
        assert_eq!(sink.warning_count(), 0);
    }

    #[test]
    fn zero_projects_promotes_the_root() {
        let root_dir = TempDir::new().unwrap();
        let sink = DiagnosticSink::new();

        let mut registry = ProjectRegistry::new(None);
        registry.finalize_pseudo_projects(project(&root_dir, "Root"), &sink);

        assert_eq!(registry.len(), 1);
        assert!(registry.root_is_registered());
        assert!(Arc::ptr_eq(registry.projects().next().unwrap(), registry.root()));
    }

    #[test]
    fn snapshot_preserves_registration_order() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let root_dir = TempDir::new().unwrap();
        let sink = DiagnosticSink::new();

        let mut registry = ProjectRegistry::new(None);
        registry.register(project(&a, "B"), &sink);
        registry.register(project(&b, "A"), &sink);
        registry.finalize_pseudo_projects(project(&root_dir, "Root"), &sink);

        let names: Vec<_> = registry.snapshot().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
