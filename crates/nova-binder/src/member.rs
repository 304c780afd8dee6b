//! Member binder: binds fields, methods, and their erased descriptors
//! inside a class's own scope (header-bound supertypes, its own type
//! parameters, and enclosing classes' type parameters).
//!
//! Constant field initializers are attached but not evaluated here — that
//! is [`crate::constant`]'s job, which runs once every class has reached
//! at least [`nova_types::BindingStage::Member`].

use indexmap::IndexMap;
use nova_core::FileId;
use nova_types::{Access, ClassSymbol, FieldInfo, FieldSymbol, MethodInfo, MethodSymbol, Type, TyVarSymbol};

use crate::diagnostics::DiagnosticSink;
use crate::resolve::{resolve_type_ref, TypeResolutionContext};
use crate::scope::CompilationUnitScope;
use crate::tree::{FieldDecl, MethodDecl, Modifier, TypeRef};
use crate::type_params::bind_type_parameters;

pub fn bind_field(
    owner: &ClassSymbol,
    decl: &FieldDecl,
    scope: &CompilationUnitScope,
    type_parameters: &IndexMap<String, TyVarSymbol>,
    sink: &mut DiagnosticSink,
    file: FileId,
) -> FieldInfo {
    let ctx = TypeResolutionContext {
        scope,
        type_parameters,
    };
    let ty = resolve_type_ref(&decl.ty, &ctx, sink, file, decl.line, decl.column);

    FieldInfo {
        symbol: FieldSymbol::new(owner.clone(), decl.name.as_str()),
        access: translate_access(&decl.modifiers),
        ty,
        annotations: Vec::new(),
        const_value: None,
    }
}

pub fn bind_method(
    owner: &ClassSymbol,
    decl: &MethodDecl,
    scope: &CompilationUnitScope,
    enclosing_type_parameters: &IndexMap<String, TyVarSymbol>,
    sink: &mut DiagnosticSink,
    file: FileId,
) -> MethodInfo {
    let mut type_parameters = enclosing_type_parameters.clone();
    let owner_for_tyvars = nova_types::TyVarOwner::Method(MethodSymbol::new(
        owner.clone(),
        decl.name.as_str(),
        "",
    ));
    let bound_type_parameters = bind_type_parameters(
        owner_for_tyvars,
        &decl.type_parameters,
        scope,
        &mut type_parameters,
        sink,
        file,
    );

    let ctx = TypeResolutionContext {
        scope,
        type_parameters: &type_parameters,
    };

    let mut parameter_types: Vec<Type> = decl
        .parameters
        .iter()
        .map(|p| resolve_type_ref(&p.ty, &ctx, sink, file, decl.line, decl.column))
        .collect();

    // A varargs parameter is bound as an array type by the parser; nothing
    // extra to do here beyond carrying the flag into access flags. If a
    // future parser ever hands over the element type instead, wrap it:
    if decl.is_varargs {
        if let Some(last) = parameter_types.last_mut() {
            if !matches!(last, Type::Array(_)) {
                *last = Type::Array(Box::new(nova_types::ArrayTy {
                    element: last.clone(),
                    annotations: Vec::new(),
                }));
            }
        }
    }

    let return_type = resolve_type_ref(&decl.return_type, &ctx, sink, file, decl.line, decl.column);
    let thrown_types = decl
        .thrown
        .iter()
        .map(|t| resolve_type_ref(t, &ctx, sink, file, decl.line, decl.column))
        .collect();

    let descriptor = erased_method_descriptor(&parameter_types, &return_type);
    let mut access = translate_access(&decl.modifiers);
    if decl.is_varargs {
        access |= Access::VARARGS;
    }

    MethodInfo {
        symbol: MethodSymbol::new(owner.clone(), decl.name.as_str(), descriptor),
        access,
        type_parameters: bound_type_parameters,
        parameter_types,
        return_type,
        thrown_types,
        annotations: Vec::new(),
        parameter_annotations: vec![Vec::new(); decl.parameters.len()],
    }
}

/// The erased descriptor, used only for overload identity here; the
/// class-file lowerer recomputes descriptor strings from the same erasure
/// rule when it writes a `ClassMember`.
pub(crate) fn erased_method_descriptor(params: &[Type], return_type: &Type) -> String {
    let mut desc = String::from("(");
    for p in params {
        desc.push_str(&erased_type_descriptor(p));
    }
    desc.push(')');
    desc.push_str(&erased_type_descriptor(return_type));
    desc
}

pub(crate) fn erased_type_descriptor(ty: &Type) -> String {
    match ty {
        Type::Void => "V".to_string(),
        Type::Prim(p) => p.descriptor().to_string(),
        Type::Array(array) => format!("[{}", erased_type_descriptor(&array.element)),
        Type::Class(class) => format!("L{};", class.symbol().internal_name()),
        // A type variable erases to its first bound, but the binder has
        // not necessarily resolved that bound's identity at this point
        // (member binding and type-parameter binding interleave); callers
        // needing a fully erased descriptor after all stages complete
        // should recompute it then. Until that, fall back to Object.
        Type::TyVar(_) => "Ljava/lang/Object;".to_string(),
        Type::Wild(_) | Type::Intersection(_) | Type::Error(_) => "Ljava/lang/Object;".to_string(),
    }
}

pub(crate) fn translate_access(modifiers: &[Modifier]) -> Access {
    let mut access = Access::empty();
    for m in modifiers {
        access |= match m {
            Modifier::Public => Access::PUBLIC,
            Modifier::Private => Access::PRIVATE,
            Modifier::Protected => Access::PROTECTED,
            Modifier::Static => Access::STATIC,
            Modifier::Final => Access::FINAL,
            Modifier::Abstract => Access::ABSTRACT,
            Modifier::Synchronized => Access::SYNCHRONIZED,
            Modifier::Native => Access::NATIVE,
            Modifier::Transient => Access::TRANSIENT,
            Modifier::Volatile => Access::VOLATILE,
            Modifier::Strictfp => Access::STRICT,
        };
    }
    access
}
