//! Output contracts for generated code.
//!
//! A [`ModuleWriter`] is scoped to one module's generated output location.
//! Writes are buffered in memory; nothing reaches the backing store until
//! [`ModuleWriter::close`] flushes it. [`ModuleWriter::clear`] removes
//! output left behind by a previous run and is safe to call before any
//! write. Closing twice is a programming error and fails loudly.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    /// `close` was called on a writer that already flushed.
    #[error("generated output at `{0}` was already closed")]
    AlreadyClosed(PathBuf),

    /// `write` was called after `close`.
    #[error("generated output at `{0}` is closed and no longer accepts writes")]
    WriteAfterClose(PathBuf),

    #[error("failed to write generated output at `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type WriterResult<T> = Result<T, WriterError>;

/// A writer for one module's generated output.
///
/// Implementations must be internally synchronized: several administrators
/// may write through the same writer concurrently during generation.
pub trait ModuleWriter: Send + Sync {
    /// Buffer `text` into `file`, a path relative to the generated output
    /// location. Repeated writes to the same file append.
    fn write(&self, file: &str, text: &str) -> WriterResult<()>;

    /// Delete output produced by a previous generation pass.
    fn clear(&self) -> WriterResult<()>;

    /// Flush all buffered files and close the writer. Exactly once.
    fn close(&self) -> WriterResult<()>;

    /// The directory this writer generates into.
    fn target(&self) -> &Path;
}

/// Backing store that hands out per-module writers.
pub trait OutputBackend: Send + Sync {
    fn scoped_writer(&self, directory: &Path) -> Arc<dyn ModuleWriter>;
}

/// Filesystem-backed output: each module's generated files live under
/// `<module>/<generated-dir>/`, deleted wholesale on `clear`.
#[derive(Debug, Clone)]
pub struct FsOutput {
    generated_dir: String,
}

impl FsOutput {
    pub fn new() -> Self {
        Self {
            generated_dir: "Generated".to_string(),
        }
    }

    /// Override the generated directory name.
    pub fn with_generated_dir(name: impl Into<String>) -> Self {
        Self {
            generated_dir: name.into(),
        }
    }

    pub fn generated_dir(&self) -> &str {
        &self.generated_dir
    }
}

impl Default for FsOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for FsOutput {
    fn scoped_writer(&self, directory: &Path) -> Arc<dyn ModuleWriter> {
        Arc::new(FsWriter {
            target: directory.join(&self.generated_dir),
            state: Mutex::new(FsWriterState {
                buffers: IndexMap::new(),
                closed: false,
            }),
        })
    }
}

struct FsWriter {
    target: PathBuf,
    state: Mutex<FsWriterState>,
}

struct FsWriterState {
    buffers: IndexMap<String, String>,
    closed: bool,
}

impl ModuleWriter for FsWriter {
    fn write(&self, file: &str, text: &str) -> WriterResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(WriterError::WriteAfterClose(self.target.clone()));
        }
        state.buffers.entry(file.to_string()).or_default().push_str(text);
        Ok(())
    }

    fn clear(&self) -> WriterResult<()> {
        if self.target.exists() {
            std::fs::remove_dir_all(&self.target).map_err(|source| WriterError::Io {
                path: self.target.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn close(&self) -> WriterResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(WriterError::AlreadyClosed(self.target.clone()));
        }
        state.closed = true;

        for (file, contents) in state.buffers.drain(..) {
            let path = self.target.join(&file);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| WriterError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, contents)
                .map_err(|source| WriterError::Io { path, source })?;
        }
        Ok(())
    }

    fn target(&self) -> &Path {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn writer_for(dir: &Path) -> Arc<dyn ModuleWriter> {
        FsOutput::new().scoped_writer(dir)
    }

    #[test]
    fn writes_are_buffered_until_close() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(temp.path());

        writer.write("modules.txt", "one\n").unwrap();
        assert!(!temp.path().join("Generated").exists());

        writer.close().unwrap();
        let written = fs::read_to_string(temp.path().join("Generated/modules.txt")).unwrap();
        assert_eq!(written, "one\n");
    }

    #[test]
    fn repeated_writes_append() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(temp.path());

        writer.write("modules.txt", "one\n").unwrap();
        writer.write("modules.txt", "two\n").unwrap();
        writer.close().unwrap();

        let written = fs::read_to_string(temp.path().join("Generated/modules.txt")).unwrap();
        assert_eq!(written, "one\ntwo\n");
    }

    #[test]
    fn clear_is_safe_before_any_write() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(temp.path());
        writer.clear().unwrap();
    }

    #[test]
    fn clear_removes_previous_output() {
        let temp = TempDir::new().unwrap();
        let stale = temp.path().join("Generated");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("old.txt"), "stale").unwrap();

        let writer = writer_for(temp.path());
        writer.clear().unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn double_close_is_an_error() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(temp.path());

        writer.close().unwrap();
        assert!(matches!(
            writer.close(),
            Err(WriterError::AlreadyClosed(_))
        ));
    }

    #[test]
    fn write_after_close_is_an_error() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(temp.path());

        writer.close().unwrap();
        assert!(matches!(
            writer.write("a.txt", "text"),
            Err(WriterError::WriteAfterClose(_))
        ));
    }

    #[test]
    fn close_without_writes_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let writer = writer_for(temp.path());

        writer.close().unwrap();
        assert!(!temp.path().join("Generated").exists());
    }

    #[test]
    fn custom_generated_dir_name() {
        let temp = TempDir::new().unwrap();
        let writer = FsOutput::with_generated_dir("out").scoped_writer(temp.path());

        writer.write("a.txt", "text").unwrap();
        writer.close().unwrap();
        assert!(temp.path().join("out/a.txt").exists());
    }
}
