use oxc_span::Span;
use thiserror::Error;
use tracing::warn;

// ---------------------------------------------------------------------------
// Non-fatal conditions
// ---------------------------------------------------------------------------

/// A condition that degrades output but does not stop translation by itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// A source shape with no destination representation.
    #[error("{}..{}: unsupported construct: {reason}", .span.start, .span.end)]
    Unsupported { span: Span, reason: String },

    /// A reference the symbol source could not resolve.
    #[error("{}..{}: cannot resolve `{name}`", .span.start, .span.end)]
    SymbolResolution { span: Span, name: String },
}

impl Diagnostic {
    pub fn unsupported(span: Span, reason: impl Into<String>) -> Self {
        Diagnostic::Unsupported {
            span,
            reason: reason.into(),
        }
    }

    pub fn unresolved(span: Span, name: impl Into<String>) -> Self {
        Diagnostic::SymbolResolution {
            span,
            name: name.into(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Diagnostic::Unsupported { span, .. } | Diagnostic::SymbolResolution { span, .. } => {
                *span
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    /// An internal invariant was violated. Abandons the current unit.
    #[error("{}..{}: structural error: {message}", .span.start, .span.end)]
    Structural { span: Span, message: String },

    /// Fail-fast mode escalated the first reported diagnostic.
    #[error("aborted: {0}")]
    Aborted(Diagnostic),

    /// Batch mode finished with diagnostics.
    #[error("{} diagnostic(s) reported", .diagnostics.len())]
    Batch { diagnostics: Vec<Diagnostic> },
}

impl TranslateError {
    pub fn structural(span: Span, message: impl Into<String>) -> Self {
        TranslateError::Structural {
            span,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// Abort on the first diagnostic.
    FailFast,
    /// Collect everything and fail once at the end.
    #[default]
    Batch,
}

/// The single position-keyed sink for non-fatal conditions.
#[derive(Debug, Default)]
pub struct Reporter {
    mode: ReportMode,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new(mode: ReportMode) -> Self {
        Self {
            mode,
            diagnostics: Vec::new(),
        }
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Record a diagnostic. Identical reports (same kind, position and text)
    /// are kept once, since the same type is often rendered more than once.
    pub fn report(&mut self, diagnostic: Diagnostic) -> Result<(), TranslateError> {
        if self.diagnostics.contains(&diagnostic) {
            return Ok(());
        }
        warn!(%diagnostic, "diagnostic");
        match self.mode {
            ReportMode::FailFast => Err(TranslateError::Aborted(diagnostic)),
            ReportMode::Batch => {
                self.diagnostics.push(diagnostic);
                Ok(())
            }
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Drain the collected diagnostics, sorted by position.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        diagnostics.sort_by_key(|d| (d.span().start, d.span().end));
        diagnostics
    }

    /// The aggregate failure for everything collected, if anything was.
    pub fn finish(mut self) -> Result<(), TranslateError> {
        if self.diagnostics.is_empty() {
            Ok(())
        } else {
            Err(TranslateError::Batch {
                diagnostics: self.take(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_mode_collects() {
        let mut reporter = Reporter::new(ReportMode::Batch);
        assert!(reporter.report(Diagnostic::unresolved(Span::new(10, 12), "B")).is_ok());
        assert!(reporter.report(Diagnostic::unsupported(Span::new(1, 4), "mapped type")).is_ok());
        assert_eq!(reporter.diagnostics().len(), 2);

        match reporter.finish() {
            Err(TranslateError::Batch { diagnostics }) => {
                assert_eq!(diagnostics.len(), 2);
                // Sorted by position.
                assert_eq!(diagnostics[0].span(), Span::new(1, 4));
            }
            other => panic!("expected batch failure, got {other:?}"),
        }
    }

    #[test]
    fn test_fail_fast_aborts_on_first() {
        let mut reporter = Reporter::new(ReportMode::FailFast);
        let err = reporter
            .report(Diagnostic::unsupported(Span::new(0, 1), "conditional type"))
            .unwrap_err();
        assert!(matches!(err, TranslateError::Aborted(Diagnostic::Unsupported { .. })));
    }

    #[test]
    fn test_duplicates_are_kept_once() {
        let mut reporter = Reporter::new(ReportMode::Batch);
        for _ in 0..3 {
            reporter.report(Diagnostic::unresolved(Span::new(5, 6), "X")).unwrap();
        }
        assert_eq!(reporter.diagnostics().len(), 1);
    }

    #[test]
    fn test_clean_reporter_finishes_ok() {
        assert!(Reporter::new(ReportMode::Batch).finish().is_ok());
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::unresolved(Span::new(3, 7), "Foo");
        assert_eq!(d.to_string(), "3..7: cannot resolve `Foo`");
    }
}
