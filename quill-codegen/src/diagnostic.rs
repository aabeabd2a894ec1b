//! Run diagnostics.
//!
//! Recoverable conditions (duplicate namespaces, missing editor folders,
//! per-unit collection failures) never abort the pipeline; they are
//! recorded here and surfaced in the run report. The sink is shared by
//! every concurrent unit, so it is internally synchronized.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic produced by a pipeline phase.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The phase that produced this diagnostic.
    pub phase: String,
    pub message: String,
    /// What the diagnostic is about: a namespace, a directory.
    pub subject: Option<String>,
}

impl Diagnostic {
    pub fn error(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            phase: phase.into(),
            message: message.into(),
            subject: None,
        }
    }

    pub fn warning(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            phase: phase.into(),
            message: message.into(),
            subject: None,
        }
    }

    pub fn info(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            phase: phase.into(),
            message: message.into(),
            subject: None,
        }
    }

    /// Attach the subject this diagnostic is about.
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(subject) = &self.subject {
            write!(f, " ({subject})")?;
        }
        Ok(())
    }
}

/// Thread-safe diagnostic collection shared across concurrent units.
///
/// Pushing also emits the diagnostic as a tracing event at the matching
/// level, so warnings reach the log as they happen rather than only in
/// the final report.
#[derive(Clone, Default)]
pub struct DiagnosticSink {
    inner: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => error!(phase = %diagnostic.phase, "{}", diagnostic.message),
            Severity::Warning => warn!(phase = %diagnostic.phase, "{}", diagnostic.message),
            Severity::Info => info!(phase = %diagnostic.phase, "{}", diagnostic.message),
        }
        self.inner.lock().push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.inner.lock().iter().any(|d| d.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.inner.lock().iter().filter(|d| d.severity.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.inner.lock().iter().filter(|d| d.severity.is_warning()).count()
    }

    /// Clone out the diagnostics recorded so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_counts_by_severity() {
        let sink = DiagnosticSink::new();
        sink.push(Diagnostic::error("collect", "boom"));
        sink.push(Diagnostic::warning("discover", "odd"));
        sink.push(Diagnostic::info("discover", "fine"));

        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.snapshot().len(), 3);
    }

    #[test]
    fn display_includes_subject() {
        let diag = Diagnostic::warning("discover", "duplicate module").about("Game.Combat");
        assert_eq!(diag.to_string(), "warning: duplicate module (Game.Combat)");
    }

    #[test]
    fn sink_clones_share_storage() {
        let sink = DiagnosticSink::new();
        let clone = sink.clone();
        clone.push(Diagnostic::info("collect", "from a unit"));
        assert_eq!(sink.snapshot().len(), 1);
    }
}
