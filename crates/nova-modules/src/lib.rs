//! The module-declaration data model: `requires`, `exports`, `opens`,
//! `uses`, and `provides` directives decoded from a `module-info` class
//! file, or bound directly from a module declaration's source syntax.
//!
//! This crate only holds the data; [`nova-classfile`](../nova_classfile)
//! decodes it from the binary `Module` attribute and the module binder
//! stage constructs it from source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fully-qualified name of a module, e.g. `com.example.app`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a module's name was determined.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ModuleKind {
    /// Declared explicitly by a module descriptor.
    Explicit,
    /// Derived from a classpath entry's filename or manifest, for a
    /// classpath entry that carries no module descriptor of its own.
    Automatic,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Requires {
    pub module: ModuleName,
    pub is_transitive: bool,
    pub is_static: bool,
    /// Set for a `requires` directive the binder synthesizes rather than
    /// one written in source, e.g. the implicit `requires java.base`.
    pub is_mandated: bool,
}

impl Requires {
    /// The implicit `requires java.base;` every module carries even when
    /// its source declares no such directive.
    pub fn mandated_java_base() -> Self {
        Self {
            module: ModuleName::new("java.base"),
            is_transitive: false,
            is_static: false,
            is_mandated: true,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Exports {
    pub package: String,
    /// Empty means exported unconditionally to every module.
    pub to: Vec<ModuleName>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Opens {
    pub package: String,
    /// Empty means opened unconditionally to every module.
    pub to: Vec<ModuleName>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Uses {
    pub service: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Provides {
    pub service: String,
    pub implementations: Vec<String>,
}

/// A fully-bound module declaration.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub kind: ModuleKind,
    pub name: ModuleName,
    pub is_open: bool,
    pub requires: Vec<Requires>,
    pub exports: Vec<Exports>,
    pub opens: Vec<Opens>,
    pub uses: Vec<Uses>,
    pub provides: Vec<Provides>,
}

impl ModuleInfo {
    /// Whether `package` is exported to `requesting_module`, accounting for
    /// both unconditional and qualified exports.
    pub fn exports_to(&self, package: &str, requesting_module: &ModuleName) -> bool {
        self.exports.iter().any(|e| {
            e.package == package && (e.to.is_empty() || e.to.contains(requesting_module))
        })
    }
}
