//! Core value types and output contracts shared across the quill workspace.

mod ident;
mod writer;

pub use ident::{IdentError, NamespacePath};
pub use writer::{FsOutput, ModuleWriter, OutputBackend, WriterError, WriterResult};
