//! Module binder: binds a `module-info` unit's `requires`/`exports`/
//! `opens`/`uses`/`provides` directives into a [`nova_modules::ModuleInfo`].
//!
//! This is a parallel path off the main class-binding pipeline: it never
//! touches `TypeBoundClass`, only resolving the type names that appear in
//! `uses`/`provides` through the module's own scope.

use nova_core::FileId;
use nova_modules::{Exports, ModuleInfo, ModuleKind, ModuleName, Opens, Provides, Requires, Uses};

use crate::diagnostics::DiagnosticSink;
use crate::error::BindError;
use crate::scope::CompilationUnitScope;
use crate::tree::ModuleDecl;

pub struct ModuleBinder<'a> {
    scope: &'a CompilationUnitScope,
}

impl<'a> ModuleBinder<'a> {
    pub fn new(scope: &'a CompilationUnitScope) -> Self {
        Self { scope }
    }

    pub fn bind(&self, decl: &ModuleDecl, sink: &mut DiagnosticSink, file: FileId) -> ModuleInfo {
        let mut requires: Vec<Requires> = decl
            .requires
            .iter()
            .map(|r| Requires {
                module: ModuleName::new(r.module.clone()),
                is_transitive: r.is_transitive,
                is_static: r.is_static,
                is_mandated: false,
            })
            .collect();

        if !requires.iter().any(|r| r.module.as_str() == "java.base") {
            requires.push(Requires::mandated_java_base());
        }

        let exports = decl
            .exports
            .iter()
            .map(|e| Exports {
                package: e.package.clone(),
                to: e.to.iter().cloned().map(ModuleName::new).collect(),
            })
            .collect();

        let opens = decl
            .opens
            .iter()
            .map(|o| Opens {
                package: o.package.clone(),
                to: o.to.iter().cloned().map(ModuleName::new).collect(),
            })
            .collect();

        let uses = decl
            .uses
            .iter()
            .map(|segments| Uses {
                service: self.resolve_service(segments, sink, file),
            })
            .collect();

        let provides = decl
            .provides
            .iter()
            .map(|p| Provides {
                service: self.resolve_service(&p.service, sink, file),
                implementations: p
                    .implementations
                    .iter()
                    .map(|impl_segments| self.resolve_service(impl_segments, sink, file))
                    .collect(),
            })
            .collect();

        ModuleInfo {
            kind: ModuleKind::Explicit,
            name: ModuleName::new(decl.name.clone()),
            is_open: decl.is_open,
            requires,
            exports,
            opens,
            uses,
            provides,
        }
    }

    /// `uses`/`provides` name a type, not an expression, so there's no
    /// type-parameter scope to thread through; a miss is reported as
    /// `ModuleNotFound` since from a module descriptor's point of view an
    /// unresolvable service type is a module-graph error, not an ordinary
    /// unresolved reference.
    fn resolve_service(&self, segments: &[String], sink: &mut DiagnosticSink, file: FileId) -> String {
        match self.scope.resolve(segments) {
            Some(hit) if hit.remaining.is_empty() => {
                hit.symbol.internal_name().replace('/', ".").replace('$', ".")
            }
            _ => {
                let name = segments.join(".");
                sink.report(file, 1, 1, &BindError::ModuleNotFound(name.clone()));
                name
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::ClassSymbol;

    fn empty_decl() -> ModuleDecl {
        ModuleDecl {
            name: "com.example.app".to_string(),
            is_open: false,
            requires: Vec::new(),
            exports: Vec::new(),
            opens: Vec::new(),
            uses: Vec::new(),
            provides: Vec::new(),
        }
    }

    #[test]
    fn missing_java_base_is_synthesized_as_mandated() {
        let scope = CompilationUnitScope::new();
        let binder = ModuleBinder::new(&scope);
        let mut sink = DiagnosticSink::new();
        let info = binder.bind(&empty_decl(), &mut sink, FileId::new(0));
        let java_base: Vec<_> = info
            .requires
            .iter()
            .filter(|r| r.module.as_str() == "java.base")
            .collect();
        assert_eq!(java_base.len(), 1);
        assert!(java_base[0].is_mandated);
    }

    #[test]
    fn explicit_java_base_requires_is_not_duplicated() {
        let mut decl = empty_decl();
        decl.requires.push(crate::tree::RequiresDirective {
            module: "java.base".to_string(),
            is_transitive: false,
            is_static: false,
        });
        let scope = CompilationUnitScope::new();
        let binder = ModuleBinder::new(&scope);
        let mut sink = DiagnosticSink::new();
        let info = binder.bind(&decl, &mut sink, FileId::new(0));
        let java_base: Vec<_> = info
            .requires
            .iter()
            .filter(|r| r.module.as_str() == "java.base")
            .collect();
        assert_eq!(java_base.len(), 1);
        assert!(!java_base[0].is_mandated);
    }

    #[test]
    fn unresolved_service_in_uses_is_reported() {
        let decl = {
            let mut d = empty_decl();
            d.uses.push(vec!["com".to_string(), "example".to_string(), "Service".to_string()]);
            d
        };
        let scope = CompilationUnitScope::new();
        let binder = ModuleBinder::new(&scope);
        let mut sink = DiagnosticSink::new();
        binder.bind(&decl, &mut sink, FileId::new(0));
        assert!(sink.has_errors());
    }

    #[test]
    fn resolved_service_uses_internal_name_with_dots() {
        let mut scope = CompilationUnitScope::new();
        scope
            .same_package
            .insert("Service", ClassSymbol::new("com/example/Service"));
        let mut decl = empty_decl();
        decl.uses.push(vec!["Service".to_string()]);
        let binder = ModuleBinder::new(&scope);
        let mut sink = DiagnosticSink::new();
        let info = binder.bind(&decl, &mut sink, FileId::new(0));
        assert_eq!(info.uses[0].service, "com.example.Service");
        assert!(!sink.has_errors());
    }
}
