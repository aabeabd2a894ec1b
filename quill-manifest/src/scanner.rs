//! Manifest discovery: walking a source tree for module manifests.

use std::fs;
use std::path::{Path, PathBuf};

use quill_core::NamespacePath;
use tracing::{debug, warn};

use crate::{Error, ModuleManifest, Result};

/// File extension of module manifests.
pub const MANIFEST_EXTENSION: &str = "manifest";

/// Platform tag that makes a module eligible for an editor sibling.
pub const EDITOR_PLATFORM: &str = "Editor";

/// A module described by one manifest file. Immutable.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    name: NamespacePath,
    directory: PathBuf,
    include_platforms: Vec<String>,
}

impl ModuleDescriptor {
    pub fn name(&self) -> &NamespacePath {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn include_platforms(&self) -> &[String] {
        &self.include_platforms
    }

    pub fn declares_platform(&self, tag: &str) -> bool {
        self.include_platforms.iter().any(|p| p == tag)
    }

    pub fn declares_editor(&self) -> bool {
        self.declares_platform(EDITOR_PLATFORM)
    }

    /// Whether this manifest backs a real module: its directory directly
    /// contains at least one source file, or any subdirectory other than
    /// one literally named `Editor`. Manifests qualifying for neither are
    /// pure editor-only stubs.
    pub fn qualifies(&self, source_extension: &str) -> bool {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(directory = %self.directory.display(), error = %e, "module directory unreadable");
                return false;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if path.file_name().is_some_and(|n| n != EDITOR_PLATFORM) {
                    return true;
                }
            } else if path.extension().is_some_and(|ext| ext == source_extension) {
                return true;
            }
        }
        false
    }

    /// The `Editor` subdirectory this module's editor sibling would live in.
    pub fn editor_directory(&self) -> PathBuf {
        self.directory.join(EDITOR_PLATFORM)
    }
}

/// Walks a root directory for `*.manifest` files and turns each into a
/// [`ModuleDescriptor`].
///
/// One pass, re-invokable: scanning the same unchanged tree twice yields
/// the same descriptors in the same order. A file that fails to parse, or
/// that resolves to an invalid module name, is logged and skipped without
/// aborting the scan.
pub struct ManifestScanner {
    root: PathBuf,
}

impl ManifestScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and produce a descriptor per parseable manifest,
    /// ordered by module directory.
    pub fn scan(&self) -> Result<Vec<ModuleDescriptor>> {
        let mut found = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let entries = fs::read_dir(&dir).map_err(|e| {
                Box::new(Error::Io {
                    path: dir.clone(),
                    source: e,
                })
            })?;

            for entry in entries {
                let entry = entry.map_err(|e| {
                    Box::new(Error::Io {
                        path: dir.clone(),
                        source: e,
                    })
                })?;
                let path = entry.path();

                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION) {
                    match self.descriptor(&path) {
                        Ok(descriptor) => found.push(descriptor),
                        Err(e) => {
                            warn!(manifest = %path.display(), error = %e, "skipping malformed manifest");
                        }
                    }
                }
            }
        }

        found.sort_by(|a, b| a.directory.cmp(&b.directory));
        Ok(found)
    }

    fn descriptor(&self, manifest_path: &Path) -> Result<ModuleDescriptor> {
        let content = fs::read_to_string(manifest_path).map_err(|e| {
            Box::new(Error::Io {
                path: manifest_path.to_path_buf(),
                source: e,
            })
        })?;
        let filename = manifest_path.display().to_string();
        let manifest = ModuleManifest::parse_str(&content, &filename)?;

        let raw_name = match manifest.name {
            Some(name) => name,
            None => manifest_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let name = NamespacePath::parse(&raw_name)
            .map_err(|e| Error::invalid_name(&raw_name, e, &content, &filename))?;

        let directory = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        Ok(ModuleDescriptor {
            name,
            directory,
            include_platforms: manifest.include_platforms,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_manifest(dir: &Path, file: &str, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn scan_finds_manifests_in_nested_directories() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("A"), "A.manifest", "");
        write_manifest(&temp.path().join("Nested/B"), "B.manifest", "name = \"B\"");

        let descriptors = ManifestScanner::new(temp.path()).scan().unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name().as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn name_defaults_to_file_stem() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("Combat"), "Combat.manifest", "");

        let descriptors = ManifestScanner::new(temp.path()).scan().unwrap();
        assert_eq!(descriptors[0].name().as_str(), "Combat");
        assert_eq!(descriptors[0].directory(), temp.path().join("Combat"));
    }

    #[test]
    fn malformed_manifest_is_skipped_not_fatal() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("Good"), "Good.manifest", "");
        write_manifest(&temp.path().join("Bad"), "Bad.manifest", "name = [broken");

        let descriptors = ManifestScanner::new(temp.path()).scan().unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name().as_str(), "Good");
    }

    #[test]
    fn invalid_module_name_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("Odd"), "Odd.manifest", "name = \"not a name\"");

        let descriptors = ManifestScanner::new(temp.path()).scan().unwrap();
        assert!(descriptors.is_empty());
    }

    #[test]
    fn scan_is_repeatable() {
        let temp = TempDir::new().unwrap();
        write_manifest(&temp.path().join("A"), "A.manifest", "");
        write_manifest(&temp.path().join("B"), "B.manifest", "");

        let scanner = ManifestScanner::new(temp.path());
        let first: Vec<_> = scanner.scan().unwrap().iter().map(|d| d.name().to_string()).collect();
        let second: Vec<_> = scanner.scan().unwrap().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn qualifies_with_direct_source_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("A");
        write_manifest(&dir, "A.manifest", "");
        fs::write(dir.join("lib.rs"), "").unwrap();

        let descriptors = ManifestScanner::new(temp.path()).scan().unwrap();
        assert!(descriptors[0].qualifies("rs"));
    }

    #[test]
    fn qualifies_with_non_editor_subdirectory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("A");
        write_manifest(&dir, "A.manifest", "");
        fs::create_dir_all(dir.join("Impl")).unwrap();

        let descriptors = ManifestScanner::new(temp.path()).scan().unwrap();
        assert!(descriptors[0].qualifies("rs"));
    }

    #[test]
    fn editor_only_stub_does_not_qualify() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("A");
        write_manifest(&dir, "A.manifest", "includePlatforms = [\"Editor\"]");
        fs::create_dir_all(dir.join("Editor")).unwrap();

        let descriptors = ManifestScanner::new(temp.path()).scan().unwrap();
        assert!(!descriptors[0].qualifies("rs"));
        assert!(descriptors[0].declares_editor());
    }
}
