// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod scanner;

use std::path::Path;

pub use error::{Error, Result};
pub use scanner::{EDITOR_PLATFORM, MANIFEST_EXTENSION, ManifestScanner, ModuleDescriptor};
use serde::Deserialize;

/// One module manifest file.
///
/// Manifests are TOML, conventionally named `<module>.manifest`. Both keys
/// are optional; a missing `name` falls back to the manifest's file stem.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleManifest {
    /// Dotted module namespace.
    pub name: Option<String>,

    /// Platform tags the module declares. The tag `Editor` makes the
    /// module eligible for an editor sibling.
    #[serde(default, rename = "includePlatforms")]
    pub include_platforms: Vec<String>,
}

impl ModuleManifest {
    /// Parse a manifest from a string, with a filename for error reporting.
    pub fn parse_str(content: &str, filename: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::parse(e, content, filename))
    }

    /// Parse a manifest file from the given path.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Self::parse_str(&content, &path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_keys() {
        let manifest = ModuleManifest::parse_str(
            r#"
            name = "Game.Combat"
            includePlatforms = ["Editor", "Standalone"]
        "#,
            "Combat.manifest",
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("Game.Combat"));
        assert_eq!(manifest.include_platforms, ["Editor", "Standalone"]);
    }

    #[test]
    fn both_keys_are_optional() {
        let manifest = ModuleManifest::parse_str("", "Empty.manifest").unwrap();
        assert!(manifest.name.is_none());
        assert!(manifest.include_platforms.is_empty());
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = ModuleManifest::parse_str("name = [unclosed", "Bad.manifest").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }
}
