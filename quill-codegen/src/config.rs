use std::path::PathBuf;

use quill_core::NamespacePath;

/// Default namespace aliased as the common project.
pub const DEFAULT_COMMON_PROJECT: &str = "Common";

/// Default extension of module source files.
pub const DEFAULT_SOURCE_EXTENSION: &str = "rs";

/// Configuration for one orchestrator run. Plain data, explicitly passed;
/// there is no ambient global configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Namespace representing the tree root.
    pub root_namespace: NamespacePath,

    /// Directory scanned for module manifests.
    pub root_directory: PathBuf,

    /// Namespace aliased as the common pseudo-project. `None` disables
    /// common resolution; the root pseudo-project is used instead.
    pub common_project: Option<NamespacePath>,

    /// Extension of module source files, used by the real-module
    /// qualification rule and the project inventories.
    pub source_extension: String,
}

impl OrchestratorConfig {
    pub fn new(root_namespace: NamespacePath, root_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_namespace,
            root_directory: root_directory.into(),
            common_project: Some(
                NamespacePath::parse(DEFAULT_COMMON_PROJECT)
                    .expect("default common project name is a valid namespace"),
            ),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
        }
    }

    pub fn common_project(mut self, name: Option<NamespacePath>) -> Self {
        self.common_project = name;
        self
    }

    pub fn source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }
}
