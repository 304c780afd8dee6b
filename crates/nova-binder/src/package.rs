//! Package binder: assigns every declared type a [`ClassSymbol`] and
//! builds the canonical name → symbol mapping the later stages resolve
//! names against.
//!
//! This pass never resolves a type reference; it only mints symbols by
//! walking declaration structure (which package, which enclosing class).
//! Mutually recursive `extends` clauses can't break it because it never
//! looks at one.

use indexmap::IndexMap;
use nova_core::FileId;
use nova_types::ClassSymbol;

use crate::diagnostics::DiagnosticSink;
use crate::error::BindError;
use crate::tree::{ClassDecl, CompilationUnit};

/// One declared type, minted to a symbol and still holding its source
/// tree for the later stages to bind.
#[derive(Debug, Clone)]
pub struct BoundDecl {
    pub symbol: ClassSymbol,
    pub owner: Option<ClassSymbol>,
    pub file: FileId,
    pub package: String,
    pub decl: ClassDecl,
}

#[derive(Debug, Default)]
pub struct PackageBindResult {
    /// Every declared type, source order preserved, nested types
    /// following their enclosing class.
    pub decls: Vec<BoundDecl>,
    /// simple-name lookup for each compilation unit's own top-level types,
    /// keyed by file.
    pub same_compilation_unit: IndexMap<FileId, IndexMap<String, ClassSymbol>>,
    /// simple-name lookup for same-package types, keyed by package.
    pub same_package: IndexMap<String, IndexMap<String, ClassSymbol>>,
}

pub struct PackageBinder<'a> {
    diagnostics: &'a mut DiagnosticSink,
}

impl<'a> PackageBinder<'a> {
    pub fn new(diagnostics: &'a mut DiagnosticSink) -> Self {
        Self { diagnostics }
    }

    pub fn bind(&mut self, units: &[CompilationUnit]) -> PackageBindResult {
        let mut result = PackageBindResult::default();

        for unit in units {
            let package = unit.package.clone().unwrap_or_default();
            let package_internal = package.replace('.', "/");
            let mut cu_scope = IndexMap::new();

            for decl in &unit.types {
                self.bind_decl(unit.file, &package_internal, None, decl, &mut result, &mut cu_scope);
            }

            result.same_compilation_unit.insert(unit.file, cu_scope.clone());
            let package_scope = result.same_package.entry(package_internal).or_default();
            for (name, symbol) in cu_scope {
                package_scope.entry(name).or_insert(symbol);
            }
        }

        result
    }

    fn bind_decl(
        &mut self,
        file: FileId,
        package: &str,
        owner: Option<ClassSymbol>,
        decl: &ClassDecl,
        result: &mut PackageBindResult,
        cu_scope: &mut IndexMap<String, ClassSymbol>,
    ) {
        let internal_name = match &owner {
            Some(owner) => format!("{}${}", owner.internal_name(), decl.name),
            None if package.is_empty() => decl.name.clone(),
            None => format!("{package}/{}", decl.name),
        };
        let symbol = ClassSymbol::new(internal_name);

        if owner.is_none() && cu_scope.insert(decl.name.clone(), symbol.clone()).is_some() {
            self.diagnostics.report(
                file,
                decl.line,
                decl.column,
                &BindError::DuplicateDeclaration(decl.name.clone()),
            );
        }

        result.decls.push(BoundDecl {
            symbol: symbol.clone(),
            owner,
            file,
            package: package.to_string(),
            decl: decl.clone(),
        });

        for nested in &decl.nested {
            self.bind_decl(file, package, Some(symbol.clone()), nested, result, cu_scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DeclKind;

    fn class(name: &str, nested: Vec<ClassDecl>) -> ClassDecl {
        ClassDecl {
            name: name.to_string(),
            kind: DeclKind::Class,
            modifiers: Vec::new(),
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested,
            annotations: Vec::new(),
            line: 1,
            column: 1,
        }
    }

    #[test]
    fn top_level_class_gets_package_qualified_symbol() {
        let unit = CompilationUnit {
            file: FileId::new(0),
            package: Some("com.example".to_string()),
            imports: Vec::new(),
            types: vec![class("Foo", Vec::new())],
            module: None,
        };
        let mut sink = DiagnosticSink::new();
        let result = PackageBinder::new(&mut sink).bind(&[unit]);
        assert_eq!(result.decls.len(), 1);
        assert_eq!(result.decls[0].symbol.internal_name(), "com/example/Foo");
    }

    #[test]
    fn nested_class_symbol_is_dollar_joined() {
        let unit = CompilationUnit {
            file: FileId::new(0),
            package: None,
            imports: Vec::new(),
            types: vec![class("Outer", vec![class("Inner", Vec::new())])],
            module: None,
        };
        let mut sink = DiagnosticSink::new();
        let result = PackageBinder::new(&mut sink).bind(&[unit]);
        assert_eq!(result.decls.len(), 2);
        assert_eq!(result.decls[1].symbol.internal_name(), "Outer$Inner");
        assert_eq!(
            result.decls[1].owner.as_ref().unwrap().internal_name(),
            "Outer"
        );
    }

    #[test]
    fn duplicate_top_level_name_is_reported() {
        let unit = CompilationUnit {
            file: FileId::new(0),
            package: None,
            imports: Vec::new(),
            types: vec![class("Foo", Vec::new()), class("Foo", Vec::new())],
            module: None,
        };
        let mut sink = DiagnosticSink::new();
        PackageBinder::new(&mut sink).bind(&[unit]);
        assert!(sink.has_errors());
    }
}
