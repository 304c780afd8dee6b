//! Accumulates [`BindError`]s into [`nova_core::Diagnostic`]s.
//!
//! Every stage gets a `&mut DiagnosticSink` instead of returning a
//! `Result`; this is what lets name resolution keep going after the first
//! unresolved reference instead of aborting the whole compilation.

use nova_core::{Diagnostic, FileId, Location, Severity};

use crate::error::BindError;

#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, file: FileId, line: u32, column: u32, error: &BindError) {
        self.diagnostics.push(Diagnostic::new(
            Location { file, line, column },
            Severity::Error,
            error.kind(),
            error.args(),
            error.to_string(),
        ));
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporting_does_not_clear_earlier_diagnostics() {
        let mut sink = DiagnosticSink::new();
        let file = FileId::new(0);
        sink.report(file, 1, 1, &BindError::SymbolNotFound("Foo".into()));
        sink.report(file, 2, 5, &BindError::CyclicHierarchy("Bar".into()));
        assert_eq!(sink.diagnostics().len(), 2);
        assert!(sink.has_errors());
    }
}
