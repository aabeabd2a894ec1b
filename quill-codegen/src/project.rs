//! Registered modules.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use quill_core::{ModuleWriter, NamespacePath};

use crate::symbols::SymbolHandle;

/// A registered module: a directory with its own namespace and an
/// exclusively owned output writer.
///
/// `root_symbol` is `None` when the compiled unit does not expose the
/// module's namespace; administrators must tolerate that. The source
/// inventory is cached by the project's own collection task and is
/// read-only for everyone else.
pub struct Project {
    directory: PathBuf,
    namespace: NamespacePath,
    root_symbol: Option<SymbolHandle>,
    writer: Arc<dyn ModuleWriter>,
    sources: RwLock<Vec<PathBuf>>,
}

impl Project {
    pub fn new(
        directory: PathBuf,
        namespace: NamespacePath,
        root_symbol: Option<SymbolHandle>,
        writer: Arc<dyn ModuleWriter>,
    ) -> Self {
        Self {
            directory,
            namespace,
            root_symbol,
            writer,
            sources: RwLock::new(Vec::new()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn namespace(&self) -> &NamespacePath {
        &self.namespace
    }

    pub fn root_symbol(&self) -> Option<&SymbolHandle> {
        self.root_symbol.as_ref()
    }

    pub fn writer(&self) -> &Arc<dyn ModuleWriter> {
        &self.writer
    }

    /// Collection step: cache this module's source-file inventory.
    ///
    /// Skips the generated output directory and any direct `Editor`
    /// subdirectory (an editor sibling is its own project). Returns the
    /// number of sources found.
    pub fn collect_sources(&self, source_extension: &str) -> io::Result<usize> {
        let mut found = Vec::new();
        self.walk(&self.directory, true, source_extension, &mut found)?;
        found.sort();

        let count = found.len();
        *self.sources.write() = found;
        Ok(count)
    }

    fn walk(
        &self,
        dir: &Path,
        is_module_root: bool,
        source_extension: &str,
        found: &mut Vec<PathBuf>,
    ) -> io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if path == self.writer.target() {
                    continue;
                }
                if is_module_root && path.file_name().is_some_and(|n| n == "Editor") {
                    continue;
                }
                self.walk(&path, false, source_extension, found)?;
            } else if path.extension().is_some_and(|ext| ext == source_extension) {
                found.push(path);
            }
        }
        Ok(())
    }

    /// The cached source inventory, in path order.
    pub fn sources(&self) -> Vec<PathBuf> {
        self.sources.read().clone()
    }

    pub fn source_count(&self) -> usize {
        self.sources.read().len()
    }
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("namespace", &self.namespace)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use quill_core::{FsOutput, OutputBackend};
    use tempfile::TempDir;

    use super::*;

    fn project_in(dir: &Path) -> Project {
        Project::new(
            dir.to_path_buf(),
            NamespacePath::parse("Game").unwrap(),
            None,
            FsOutput::new().scoped_writer(dir),
        )
    }

    #[test]
    fn collects_sources_recursively() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.rs"), "").unwrap();
        fs::create_dir_all(temp.path().join("inner")).unwrap();
        fs::write(temp.path().join("inner/b.rs"), "").unwrap();
        fs::write(temp.path().join("notes.md"), "").unwrap();

        let project = project_in(temp.path());
        assert_eq!(project.collect_sources("rs").unwrap(), 2);
        assert_eq!(project.source_count(), 2);
    }

    #[test]
    fn skips_generated_output_and_editor_subdirectory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.rs"), "").unwrap();
        fs::create_dir_all(temp.path().join("Generated")).unwrap();
        fs::write(temp.path().join("Generated/gen.rs"), "").unwrap();
        fs::create_dir_all(temp.path().join("Editor")).unwrap();
        fs::write(temp.path().join("Editor/tool.rs"), "").unwrap();

        let project = project_in(temp.path());
        assert_eq!(project.collect_sources("rs").unwrap(), 1);
    }

    #[test]
    fn nested_editor_directories_are_not_special() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("inner/Editor")).unwrap();
        fs::write(temp.path().join("inner/Editor/deep.rs"), "").unwrap();

        let project = project_in(temp.path());
        assert_eq!(project.collect_sources("rs").unwrap(), 1);
    }

    #[test]
    fn recollect_replaces_the_inventory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.rs"), "").unwrap();

        let project = project_in(temp.path());
        project.collect_sources("rs").unwrap();
        fs::write(temp.path().join("b.rs"), "").unwrap();
        assert_eq!(project.collect_sources("rs").unwrap(), 2);
    }
}
