use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for manifest operations (boxed to keep the Ok path small).
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse module manifest")]
    #[diagnostic(code(quill::malformed_manifest))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("manifest resolves to invalid module name `{name}`")]
    #[diagnostic(
        code(quill::invalid_module_name),
        help("set an explicit dotted `name` key, e.g. `name = \"Game.Combat\"`")
    )]
    InvalidName {
        #[source_code]
        src: NamedSource<String>,
        name: String,
        #[source]
        source: quill_core::IdentError,
    },
}

impl Error {
    /// Create a parse error carrying the offending source.
    pub fn parse(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    /// Create an invalid-name error carrying the offending source.
    pub fn invalid_name(
        name: impl Into<String>,
        source: quill_core::IdentError,
        src: &str,
        filename: &str,
    ) -> Box<Self> {
        Box::new(Error::InvalidName {
            src: NamedSource::new(filename, src.to_string()),
            name: name.into(),
            source,
        })
    }
}
