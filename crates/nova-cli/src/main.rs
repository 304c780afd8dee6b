mod diagnostics_output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use nova_binder::{CompilationUnit, ImportDecl, MapScope, ModuleDecl};
use nova_classpath::{ClasspathEntry, ClasspathIndex};
use nova_core::FileId;
use serde::Deserialize;

use diagnostics_output::DiagnosticsFormat;

/// Header compiler: binds a set of parsed compilation units against a
/// classpath and lowers every declared type to class-file bytes.
#[derive(Parser)]
#[command(name = "nova", version, about = "Nova header compiler")]
struct Cli {
    /// Directory of `*.json` compilation-unit files, one file per source
    /// file (there is no source parser in this tool; a front end upstream
    /// is expected to have already produced these trees).
    #[arg(long)]
    sources: PathBuf,

    /// A classpath entry: a directory of `.class` files or a `.jar`
    /// archive. May be repeated; entries are searched in order, first
    /// match wins.
    #[arg(long)]
    classpath: Vec<PathBuf>,

    /// Package whose classpath members are implicitly in scope everywhere
    /// (the language-root import), e.g. `java/lang`.
    #[arg(long, default_value = "java/lang")]
    root_package: String,

    /// Directory class files are written to, one `internal/name.class`
    /// per declared type. Not written at all if any diagnostic fires.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value = "human")]
    format: DiagnosticsFormat,
}

/// The on-disk shape of one compilation unit. Mirrors
/// [`nova_binder::CompilationUnit`] minus `file`, which this driver assigns
/// from the unit's position in the sorted file listing rather than reading
/// it off the wire.
#[derive(Deserialize)]
struct SourceUnit {
    package: Option<String>,
    #[serde(default)]
    imports: Vec<ImportDecl>,
    types: Vec<nova_binder::ClassDecl>,
    #[serde(default)]
    module: Option<ModuleDecl>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    std::process::exit(run(cli)?);
}

fn run(cli: Cli) -> Result<i32> {
    let (units, files) = load_units(&cli.sources)?;

    let entries = classpath_entries(&cli.classpath);
    let index = ClasspathIndex::build(&entries).context("failed to read classpath")?;
    let root_imports = root_import_scope(&index, &cli.root_package);

    let output = nova_binder::compile(&units, &index, &root_imports);

    diagnostics_output::print_diagnostics(&output.diagnostics, &files, cli.format)?;

    if !output.diagnostics.is_empty() {
        return Ok(1);
    }

    write_classes(&cli.out, &output.classes)?;
    if !output.modules.is_empty() {
        tracing::info!(count = output.modules.len(), "wrote module-info unit(s)");
    }

    Ok(0)
}

/// Reads every `*.json` file under `dir` (sorted, so `FileId` assignment is
/// stable across runs) and returns the parsed units alongside a
/// `FileId`-indexed path table for diagnostic rendering.
fn load_units(dir: &Path) -> Result<(Vec<CompilationUnit>, Vec<PathBuf>)> {
    let paths = nova_core::collect_files_with_extension(dir, "json")
        .with_context(|| format!("failed to list sources under {}", dir.display()))?;

    let mut units = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let unit: SourceUnit = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        units.push(CompilationUnit {
            file: FileId::new(index as u32),
            package: unit.package,
            imports: unit.imports,
            types: unit.types,
            module: unit.module,
        });
    }

    Ok((units, paths))
}

fn classpath_entries(paths: &[PathBuf]) -> Vec<ClasspathEntry> {
    paths
        .iter()
        .map(|p| {
            if p.is_dir() {
                ClasspathEntry::ClassDir(p.clone())
            } else {
                ClasspathEntry::Jar(p.clone())
            }
        })
        .collect()
}

fn root_import_scope(index: &ClasspathIndex, root_package: &str) -> MapScope {
    let mut scope = MapScope::new();
    for symbol in index.class_symbols() {
        if symbol.package() == root_package {
            scope.insert(symbol.simple_name(), symbol.clone());
        }
    }
    scope
}

fn write_classes(out: &Path, classes: &indexmap::IndexMap<String, Vec<u8>>) -> Result<()> {
    for (internal_name, bytes) in classes {
        let path = out.join(format!("{internal_name}.class"));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
