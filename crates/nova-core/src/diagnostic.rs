//! Diagnostics primitives shared across the header compiler.
//!
//! A diagnostic always carries a resolved source location: a file, and a
//! 1-based line/column, rather than a raw byte range. Binder stages compute
//! the byte range during analysis and resolve it to a location eagerly, so
//! callers never need the source text again just to print an error.

use crate::FileId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A source position resolved to 1-based line/column, as printed to users.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Location {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RelatedDiagnostic {
    pub location: Location,
    pub message: String,
}

/// A single compiler diagnostic.
///
/// `kind` names the taxonomy variant that produced this diagnostic (e.g.
/// `"SymbolNotFound"`), and `args` is the ordered list of human-readable
/// values substituted into that variant's message template. Keeping `kind`
/// and `args` apart from the final rendered `message` lets tooling match on
/// the stable kind without parsing prose.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub kind: &'static str,
    pub args: Vec<String>,
    pub message: String,
    pub related: Vec<RelatedDiagnostic>,
}

impl Diagnostic {
    pub fn new(
        location: Location,
        severity: Severity,
        kind: &'static str,
        args: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            severity,
            kind,
            args,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn add_related(&mut self, location: Location, message: impl Into<String>) {
        self.related.push(RelatedDiagnostic {
            location,
            message: message.into(),
        });
    }
}
