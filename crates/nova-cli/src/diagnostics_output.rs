//! Renders a [`Diagnostic`] list in the formats a build graph's CI wiring
//! expects: human-readable text for a terminal, raw JSON for tooling, and
//! GitHub Actions workflow commands for inline PR annotations.

use nova_core::{Diagnostic, Severity};
use serde::Serialize;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticsFormat {
    /// One line per diagnostic, file:line:col: severity message.
    Human,
    /// The raw diagnostic list, pretty-printed.
    Json,
    /// `::error file=...,line=...,col=...::message` workflow commands.
    Github,
}

pub fn print_diagnostics(
    diagnostics: &[Diagnostic],
    files: &[std::path::PathBuf],
    format: DiagnosticsFormat,
) -> anyhow::Result<()> {
    match format {
        DiagnosticsFormat::Human => print_human(diagnostics, files),
        DiagnosticsFormat::Json => print_json(diagnostics, files)?,
        DiagnosticsFormat::Github => print_github(diagnostics, files),
    }
    Ok(())
}

fn file_path<'a>(files: &'a [std::path::PathBuf], diagnostic: &Diagnostic) -> &'a str {
    files
        .get(diagnostic.location.file.index() as usize)
        .and_then(|p| p.to_str())
        .unwrap_or("<unknown>")
}

fn print_human(diagnostics: &[Diagnostic], files: &[std::path::PathBuf]) {
    for d in diagnostics {
        let severity = match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        println!(
            "{}:{}:{}: {}[{}] {}",
            file_path(files, d),
            d.location.line,
            d.location.column,
            severity,
            d.kind,
            d.message
        );
        for related in &d.related {
            println!("  note: {}", related.message);
        }
    }
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    println!("{errors} error(s), {} total diagnostic(s)", diagnostics.len());
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    file: &'a str,
    line: u32,
    column: u32,
    severity: &'static str,
    kind: &'static str,
    args: &'a [String],
    message: &'a str,
}

fn print_json(diagnostics: &[Diagnostic], files: &[std::path::PathBuf]) -> anyhow::Result<()> {
    let out: Vec<_> = diagnostics
        .iter()
        .map(|d| JsonDiagnostic {
            file: file_path(files, d),
            line: d.location.line,
            column: d.location.column,
            severity: match d.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "info",
            },
            kind: d.kind,
            args: &d.args,
            message: &d.message,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_github(diagnostics: &[Diagnostic], files: &[std::path::PathBuf]) {
    for d in diagnostics {
        let kind = match d.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "notice",
        };
        let file = github_escape_property(file_path(files, d));
        let message = github_escape_data(&format!("[{}] {}", d.kind, d.message));
        println!(
            "::{kind} file={file},line={},col={}::{message}",
            d.location.line, d.location.column
        );
    }
}

fn github_escape_data(input: &str) -> String {
    input
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn github_escape_property(input: &str) -> String {
    github_escape_data(input).replace(':', "%3A").replace(',', "%2C")
}
