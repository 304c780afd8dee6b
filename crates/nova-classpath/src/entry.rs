//! Classpath entries: directories of `.class` files and `.jar` archives.
//!
//! Unlike a build system's classpath model, a header compiler only ever
//! reads entries once per compilation, so there's no fingerprinting or
//! on-disk cache here — just a walk that hands every class's raw bytes to
//! the caller.

use std::ffi::OsStr;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use crate::error::ClasspathError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
}

impl ClasspathEntry {
    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) => p,
        }
    }

    /// Yields every `.class` file this entry contains, parsed plus its
    /// original bytes, skipping `module-info.class` and
    /// `package-info.class` (neither describes a type).
    pub fn read_classes(
        &self,
    ) -> Result<Vec<(nova_classfile::ClassFile, Vec<u8>)>, ClasspathError> {
        match self {
            ClasspathEntry::ClassDir(dir) => read_class_dir(dir),
            ClasspathEntry::Jar(path) => read_jar(path),
        }
    }
}

fn is_ignored_class(internal_name: &str) -> bool {
    internal_name == "module-info"
        || internal_name == "package-info"
        || internal_name.ends_with("/package-info")
}

fn read_class_dir(
    dir: &Path,
) -> Result<Vec<(nova_classfile::ClassFile, Vec<u8>)>, ClasspathError> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension() != Some(OsStr::new("class")) {
            continue;
        }
        paths.push(entry.into_path());
    }
    paths.sort();

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = std::fs::read(&path)?;
        let cf = nova_classfile::ClassFile::parse(&bytes)?;
        if is_ignored_class(&cf.this_class) {
            continue;
        }
        out.push((cf, bytes));
    }
    Ok(out)
}

fn read_jar(path: &Path) -> Result<Vec<(nova_classfile::ClassFile, Vec<u8>)>, ClasspathError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let mut archive = zip::ZipArchive::new(file)?;

    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !entry.is_file() || !entry.name().ends_with(".class") {
            continue;
        }
        // Multi-release jars keep version-specific overrides under
        // `META-INF/versions/<n>/...`; without a target release to
        // reconcile against, the base entry is always authoritative.
        if entry.name().starts_with("META-INF/") {
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        let cf = nova_classfile::ClassFile::parse(&bytes)?;
        if is_ignored_class(&cf.this_class) {
            continue;
        }
        out.push((cf, bytes));
    }
    Ok(out)
}
