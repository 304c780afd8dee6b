//! Resolves a parsed [`TypeRef`] into a bound [`Type`], consulting type
//! parameters in scope before falling through the compilation-unit scope
//! chain.
//!
//! Failure never aborts: an unresolved name becomes `Type::error` and is
//! recorded in the sink, so a class with one bad import still gets every
//! other member bound.

use indexmap::IndexMap;
use nova_core::{FileId, Name};
use nova_types::{ArrayTy, ClassTy, PrimTy, SimpleClassTy, Type, TyVarSymbol, WildTy};

use crate::diagnostics::DiagnosticSink;
use crate::error::BindError;
use crate::scope::CompilationUnitScope;
use crate::tree::{PrimitiveKeyword, TypeArgRef, TypeRef};

pub struct TypeResolutionContext<'a> {
    pub scope: &'a CompilationUnitScope,
    /// Type parameters visible at this point (class's own, its method's,
    /// and its lexically enclosing classes'), innermost last so a lookup
    /// finds shadowing correctly regardless of iteration order chosen by
    /// callers.
    pub type_parameters: &'a IndexMap<String, TyVarSymbol>,
}

pub fn resolve_type_ref(
    ty: &TypeRef,
    ctx: &TypeResolutionContext<'_>,
    sink: &mut DiagnosticSink,
    file: FileId,
    line: u32,
    column: u32,
) -> Type {
    match ty {
        TypeRef::Void => Type::Void,
        TypeRef::Primitive(p) => Type::Prim(translate_primitive(*p)),
        TypeRef::Array(element) => Type::Array(Box::new(ArrayTy {
            element: resolve_type_ref(element, ctx, sink, file, line, column),
            annotations: Vec::new(),
        })),
        TypeRef::Named {
            segments,
            type_arguments,
        } => resolve_named(segments, type_arguments, ctx, sink, file, line, column),
    }
}

fn resolve_named(
    segments: &[String],
    type_arguments: &[TypeArgRef],
    ctx: &TypeResolutionContext<'_>,
    sink: &mut DiagnosticSink,
    file: FileId,
    line: u32,
    column: u32,
) -> Type {
    if segments.len() == 1 {
        if let Some(tv) = ctx.type_parameters.get(&segments[0]) {
            return Type::TyVar(tv.clone());
        }
    }

    let Some(hit) = ctx.scope.resolve(segments) else {
        let name = segments.join(".");
        sink.report(file, line, column, &BindError::SymbolNotFound(name.clone()));
        return Type::error(Some(Name::from(name)));
    };

    let internal_name = if hit.remaining.is_empty() {
        hit.symbol.internal_name().to_string()
    } else {
        format!("{}${}", hit.symbol.internal_name(), hit.remaining.join("$"))
    };

    let resolved_type_arguments: Vec<Type> = type_arguments
        .iter()
        .map(|arg| resolve_type_argument(arg, ctx, sink, file, line, column))
        .collect();

    Type::Class(ClassTy {
        segments: vec![SimpleClassTy {
            sym: nova_types::ClassSymbol::new(internal_name),
            type_arguments: resolved_type_arguments,
            annotations: Vec::new(),
        }],
    })
}

fn resolve_type_argument(
    arg: &TypeArgRef,
    ctx: &TypeResolutionContext<'_>,
    sink: &mut DiagnosticSink,
    file: FileId,
    line: u32,
    column: u32,
) -> Type {
    match arg {
        TypeArgRef::Exact(ty) => resolve_type_ref(ty, ctx, sink, file, line, column),
        TypeArgRef::Unbounded => Type::Wild(Box::new(WildTy::Unbound)),
        TypeArgRef::Extends(ty) => Type::Wild(Box::new(WildTy::Upper(resolve_type_ref(
            ty, ctx, sink, file, line, column,
        )))),
        TypeArgRef::Super(ty) => Type::Wild(Box::new(WildTy::Lower(resolve_type_ref(
            ty, ctx, sink, file, line, column,
        )))),
    }
}

fn translate_primitive(p: PrimitiveKeyword) -> PrimTy {
    match p {
        PrimitiveKeyword::Boolean => PrimTy::Boolean,
        PrimitiveKeyword::Byte => PrimTy::Byte,
        PrimitiveKeyword::Short => PrimTy::Short,
        PrimitiveKeyword::Char => PrimTy::Char,
        PrimitiveKeyword::Int => PrimTy::Int,
        PrimitiveKeyword::Long => PrimTy::Long,
        PrimitiveKeyword::Float => PrimTy::Float,
        PrimitiveKeyword::Double => PrimTy::Double,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(segments: &[&str]) -> TypeRef {
        TypeRef::Named {
            segments: segments.iter().map(|s| s.to_string()).collect(),
            type_arguments: Vec::new(),
        }
    }

    #[test]
    fn unresolved_name_becomes_error_type_and_is_reported() {
        let scope = CompilationUnitScope::new();
        let type_parameters = IndexMap::new();
        let ctx = TypeResolutionContext {
            scope: &scope,
            type_parameters: &type_parameters,
        };
        let mut sink = DiagnosticSink::new();
        let ty = resolve_type_ref(&named(&["Missing"]), &ctx, &mut sink, FileId::new(0), 1, 1);
        assert!(ty.is_error());
        assert!(sink.has_errors());
    }

    #[test]
    fn type_parameter_shadows_scope() {
        let mut scope = CompilationUnitScope::new();
        scope
            .same_package
            .insert("T", nova_types::ClassSymbol::new("pkg/T"));
        let mut type_parameters = IndexMap::new();
        let tv = TyVarSymbol::new(
            nova_types::TyVarOwner::Class(nova_types::ClassSymbol::new("pkg/Foo")),
            "T",
        );
        type_parameters.insert("T".to_string(), tv);
        let ctx = TypeResolutionContext {
            scope: &scope,
            type_parameters: &type_parameters,
        };
        let mut sink = DiagnosticSink::new();
        let ty = resolve_type_ref(&named(&["T"]), &ctx, &mut sink, FileId::new(0), 1, 1);
        assert!(matches!(ty, Type::TyVar(_)));
    }

    #[test]
    fn primitive_and_array_resolve_without_scope_lookup() {
        let scope = CompilationUnitScope::new();
        let type_parameters = IndexMap::new();
        let ctx = TypeResolutionContext {
            scope: &scope,
            type_parameters: &type_parameters,
        };
        let mut sink = DiagnosticSink::new();
        let ty = resolve_type_ref(
            &TypeRef::Array(Box::new(TypeRef::Primitive(PrimitiveKeyword::Int))),
            &ctx,
            &mut sink,
            FileId::new(0),
            1,
            1,
        );
        assert!(matches!(ty, Type::Array(_)));
        assert!(!sink.has_errors());
    }
}
