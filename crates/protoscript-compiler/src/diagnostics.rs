//! Diagnostic infrastructure for emission-time error reporting
//!
//! Descriptors arrive without source spans, so diagnostics are
//! message-only: a stable numeric code, a severity, and a message.
//! Diagnostics are collected in a sink rather than returned as errors,
//! so one offending member never aborts the rest of the program.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use serde::{Deserialize, Serialize};

/// Reflection requested on a constructor with no callable script entity.
pub const CODE_CTOR_NOT_REFLECTABLE: u16 = 7200;
/// Reflection requested on a method, field, property, or event with no
/// callable script entity.
pub const CODE_MEMBER_NOT_REFLECTABLE: u16 = 7201;
/// A specific accessor of a reflectable member is unusable.
pub const CODE_ACCESSOR_NOT_REFLECTABLE: u16 = 7202;
/// A generic argument list names a type whose arguments are dropped.
pub const CODE_ERASED_GENERIC_ARGUMENT: u16 = 7536;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// One collected diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable numeric code (e.g. 7201).
    pub code: u16,
    pub severity: DiagnosticSeverity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
        }
    }

    pub fn warning(code: u16, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
        }
    }

    fn to_codespan(&self) -> CsDiagnostic<usize> {
        let severity = match self.severity {
            DiagnosticSeverity::Error => Severity::Error,
            DiagnosticSeverity::Warning => Severity::Warning,
        };
        CsDiagnostic::new(severity)
            .with_code(format!("PS{}", self.code))
            .with_message(&self.message)
    }
}

/// Collects diagnostics across a whole compilation input.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, code: u16, message: impl Into<String>) {
        self.push(Diagnostic::error(code, message));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Render every collected diagnostic to the given stream.
    pub fn emit_to(&self, writer: &mut dyn WriteColor) -> Result<(), codespan_reporting::files::Error> {
        // No source files; codespan still needs a files database.
        let files: SimpleFiles<String, String> = SimpleFiles::new();
        let config = term::Config::default();
        for diagnostic in &self.diagnostics {
            term::emit(writer, &config, &files, &diagnostic.to_codespan())?;
        }
        Ok(())
    }

    /// Render every collected diagnostic to stderr with colors.
    pub fn emit(&self) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        self.emit_to(&mut writer)
    }
}
