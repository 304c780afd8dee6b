//! Translates the bound [`nova_types::Type`] model into the class-file
//! generic signature grammar and decides when a `Signature` attribute is
//! required at all.
//!
//! A class, field, or method whose declaration never mentions a type
//! variable, a parameterized type, or a wildcard needs no `Signature`
//! attribute: its plain descriptor already says everything a
//! non-generic-aware reader needs. This module's `*_needs_signature`
//! predicates implement that check so the class-file lowerer only emits
//! the attribute when it is load-bearing.

use nova_classfile::{
    ClassSignature, ClassTypeSegment, ClassTypeSignature, FieldTypeSignature, MethodSignature,
    TypeArgument, TypeParameter, TypeSignature,
};
use nova_types::{
    Access, ArrayTy, ClassSymbol, ClassTy, MethodInfo, PrimTy, SimpleClassTy, Type, TypeBoundClass,
    TypeParameterInfo, WildTy,
};

/// Translate a bound [`Type`] into the signature grammar's type production.
///
/// Returns `None` for `void`, which has no `FieldTypeSignature`/
/// `TypeSignature` representation of its own; callers that can see `void`
/// (a method return type) handle it separately.
pub fn translate_type(ty: &Type) -> Option<TypeSignature> {
    match ty {
        Type::Prim(prim) => Some(TypeSignature::Base(translate_prim(*prim))),
        Type::Void => None,
        Type::Array(array) => Some(translate_array(array)),
        Type::Class(class) => Some(TypeSignature::Class(translate_class_ty(class))),
        Type::TyVar(tv) => Some(TypeSignature::TypeVariable(tv.name().as_str().to_string())),
        // Wildcards only occur as type arguments; a bare wildcard type is
        // not representable as a full type and should never reach here.
        Type::Wild(_) => None,
        // An intersection type only occurs as a type-parameter bound;
        // translate_type_parameter handles that case directly.
        Type::Intersection(_) => None,
        Type::Error(_) => None,
    }
}

fn translate_array(array: &ArrayTy) -> TypeSignature {
    match translate_type(&array.element) {
        Some(component) => TypeSignature::Array(Box::new(component)),
        // An array of void cannot occur; fall back to an object array so
        // lowering never panics on malformed input.
        None => TypeSignature::Array(Box::new(TypeSignature::Class(ClassTypeSignature {
            package: vec!["java".into(), "lang".into()],
            segments: vec![ClassTypeSegment {
                name: "Object".into(),
                type_arguments: Vec::new(),
            }],
        }))),
    }
}

pub fn translate_class_ty(ty: &ClassTy) -> ClassTypeSignature {
    let package: Vec<String> = ty
        .symbol()
        .package()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let segments = ty
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| translate_class_segment(segment, index))
        .collect();

    ClassTypeSignature { package, segments }
}

/// The outermost segment names the class with its enclosing chain still
/// attached (e.g. `Outer$Inner` when a non-parameterized enclosing class was
/// collapsed into this one segment, per the type model's collapsing rule);
/// every later segment names only the next nesting level, since the levels
/// before it are already accounted for by earlier segments.
fn translate_class_segment(segment: &SimpleClassTy, index: usize) -> ClassTypeSegment {
    let name = if index == 0 {
        without_package(&segment.sym).to_string()
    } else {
        segment.sym.simple_name().to_string()
    };
    ClassTypeSegment {
        name,
        type_arguments: segment
            .type_arguments
            .iter()
            .map(translate_type_argument)
            .collect(),
    }
}

/// `internal_name()` with the package prefix (and its trailing `/`)
/// stripped, keeping any `$`-nesting. Unlike `simple_name()`, this does not
/// strip an enclosing class, since the outermost segment is exactly where
/// that enclosing chain belongs when it has been collapsed into one part.
fn without_package(sym: &ClassSymbol) -> &str {
    let full = sym.internal_name();
    let package = sym.package();
    if package.is_empty() {
        full
    } else {
        &full[package.len() + 1..]
    }
}

fn translate_type_argument(ty: &Type) -> TypeArgument {
    match ty {
        Type::Wild(wild) => match wild.as_ref() {
            WildTy::Unbound => TypeArgument::Any,
            WildTy::Upper(bound) => TypeArgument::Extends(Box::new(
                translate_type(bound).unwrap_or_else(object_signature),
            )),
            WildTy::Lower(bound) => TypeArgument::Super(Box::new(
                translate_type(bound).unwrap_or_else(object_signature),
            )),
        },
        other => TypeArgument::Exact(Box::new(
            translate_type(other).unwrap_or_else(object_signature),
        )),
    }
}

fn object_signature() -> FieldTypeSignature {
    TypeSignature::Class(ClassTypeSignature {
        package: vec!["java".into(), "lang".into()],
        segments: vec![ClassTypeSegment {
            name: "Object".into(),
            type_arguments: Vec::new(),
        }],
    })
}

fn translate_prim(prim: PrimTy) -> nova_classfile::BaseType {
    use nova_classfile::BaseType;
    match prim {
        PrimTy::Boolean => BaseType::Boolean,
        PrimTy::Byte => BaseType::Byte,
        PrimTy::Short => BaseType::Short,
        PrimTy::Char => BaseType::Char,
        PrimTy::Int => BaseType::Int,
        PrimTy::Long => BaseType::Long,
        PrimTy::Float => BaseType::Float,
        PrimTy::Double => BaseType::Double,
    }
}

fn translate_type_parameters(type_parameters: &[TypeParameterInfo]) -> Vec<TypeParameter> {
    type_parameters
        .iter()
        .map(|tp| TypeParameter {
            name: tp.symbol.name().as_str().to_string(),
            class_bound: tp.class_bound.as_ref().and_then(translate_type),
            interface_bounds: tp.interface_bounds.iter().filter_map(translate_type).collect(),
        })
        .collect()
}

/// A class needs a `Signature` attribute if it declares type parameters or
/// its superclass/interfaces are themselves parameterized.
pub fn class_needs_signature(class: &TypeBoundClass) -> bool {
    !class.type_parameters.is_empty()
        || class.superclass.as_ref().is_some_and(class_ty_is_generic)
        || class.interfaces.iter().any(class_ty_is_generic)
}

fn class_ty_is_generic(ty: &ClassTy) -> bool {
    ty.segments.iter().any(|s| !s.type_arguments.is_empty())
}

/// Build the `ClassSignature` for `class`. Callers should check
/// [`class_needs_signature`] first; this still produces a (degenerate)
/// signature for a non-generic class, since `java.lang.Object`'s
/// superclass is `None` and must synthesize nothing.
pub fn class_signature(class: &TypeBoundClass) -> ClassSignature {
    let super_class = class
        .superclass
        .as_ref()
        .map(translate_class_ty)
        .unwrap_or_else(|| ClassTypeSignature {
            package: vec!["java".into(), "lang".into()],
            segments: vec![ClassTypeSegment {
                name: "Object".into(),
                type_arguments: Vec::new(),
            }],
        });

    ClassSignature {
        type_parameters: translate_type_parameters(&class.type_parameters),
        super_class,
        interfaces: class.interfaces.iter().map(translate_class_ty).collect(),
    }
}

/// A method needs a `Signature` attribute if it declares type parameters,
/// or any parameter, return, or thrown type mentions a type variable or a
/// parameterized type.
///
/// Bridge methods never carry the generic signature of the method they
/// bridge to; they describe the erased descriptor only.
pub fn method_needs_signature(method: &MethodInfo) -> bool {
    if method.access.contains(Access::BRIDGE) {
        return false;
    }
    !method.type_parameters.is_empty()
        || method.parameter_types.iter().any(type_is_generic)
        || type_is_generic(&method.return_type)
        || method.thrown_types.iter().any(type_is_generic)
}

/// A field needs a `Signature` attribute if its declared type mentions a
/// type variable or a parameterized type.
pub fn field_needs_signature(ty: &Type) -> bool {
    type_is_generic(ty)
}

/// The field's `FieldTypeSignature`. Callers should check
/// [`field_needs_signature`] first; `void` fields can't occur so this never
/// needs a fallback the way array-of-void translation does.
pub fn field_signature(ty: &Type) -> Option<FieldTypeSignature> {
    translate_type(ty)
}

fn type_is_generic(ty: &Type) -> bool {
    match ty {
        Type::TyVar(_) => true,
        Type::Class(class) => class_ty_is_generic(class),
        Type::Array(array) => type_is_generic(&array.element),
        _ => false,
    }
}

pub fn method_signature(method: &MethodInfo) -> MethodSignature {
    MethodSignature {
        type_parameters: translate_type_parameters(&method.type_parameters),
        parameters: method.parameter_types.iter().filter_map(translate_type).collect(),
        return_type: translate_type(&method.return_type),
        throws: method.thrown_types.iter().filter_map(translate_type).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{ClassSymbol, TyVarOwner, TyVarSymbol};

    #[test]
    fn simple_class_ty_translates_to_flat_segment() {
        let sym = ClassSymbol::new("java/util/List");
        let ty = Type::class(sym);
        let Type::Class(class_ty) = &ty else {
            unreachable!()
        };
        let sig = translate_class_ty(class_ty);
        assert_eq!(sig.package, vec!["java", "util"]);
        assert_eq!(sig.segments.len(), 1);
        assert_eq!(sig.segments[0].name, "List");
    }

    #[test]
    fn nested_class_ty_keeps_one_segment_per_level() {
        let outer = ClassSymbol::new("com/example/Outer");
        let inner = ClassSymbol::new("com/example/Outer$Inner");
        let class_ty = ClassTy {
            segments: vec![
                SimpleClassTy {
                    sym: outer,
                    type_arguments: Vec::new(),
                    annotations: Vec::new(),
                },
                SimpleClassTy {
                    sym: inner,
                    type_arguments: Vec::new(),
                    annotations: Vec::new(),
                },
            ],
        };
        let sig = translate_class_ty(&class_ty);
        assert_eq!(sig.segments.len(), 2);
        assert_eq!(sig.segments[0].name, "Outer");
        assert_eq!(sig.segments[1].name, "Inner");
    }

    #[test]
    fn collapsed_nested_class_ty_keeps_enclosing_prefix_on_its_one_segment() {
        // resolve_named mints a single segment whose symbol is the full
        // $-joined name when a nested class's enclosing chain is not
        // separately parameterized; the segment name must keep the `Outer$`
        // prefix rather than being reduced to the bare `Inner`.
        let sym = ClassSymbol::new("pkg/Outer$Inner");
        let class_ty = ClassTy {
            segments: vec![SimpleClassTy {
                sym,
                type_arguments: Vec::new(),
                annotations: Vec::new(),
            }],
        };
        let sig = translate_class_ty(&class_ty);
        assert_eq!(sig.package, vec!["pkg"]);
        assert_eq!(sig.segments.len(), 1);
        assert_eq!(sig.segments[0].name, "Outer$Inner");
    }

    #[test]
    fn class_without_type_parameters_or_generic_super_needs_no_signature() {
        let class = nova_types::TypeBoundClass {
            symbol: ClassSymbol::new("com/example/Foo"),
            stage: nova_types::BindingStage::Header,
            kind: nova_types::ClassKind::Class,
            access: Access::PUBLIC,
            owner: None,
            type_parameters: Vec::new(),
            superclass: Some(ClassTy {
                segments: vec![SimpleClassTy {
                    sym: ClassSymbol::new("java/lang/Object"),
                    type_arguments: Vec::new(),
                    annotations: Vec::new(),
                }],
            }),
            interfaces: Vec::new(),
            fields: nova_core::Arena::new(),
            methods: nova_core::Arena::new(),
            annotations: Vec::new(),
        };
        assert!(!class_needs_signature(&class));
    }

    #[test]
    fn class_with_type_parameters_needs_signature() {
        let class_sym = ClassSymbol::new("com/example/Box");
        let tv = TyVarSymbol::new(TyVarOwner::Class(class_sym.clone()), "T");
        let class = nova_types::TypeBoundClass {
            symbol: class_sym,
            stage: nova_types::BindingStage::Header,
            kind: nova_types::ClassKind::Class,
            access: Access::PUBLIC,
            owner: None,
            type_parameters: vec![TypeParameterInfo {
                symbol: tv,
                class_bound: None,
                interface_bounds: Vec::new(),
            }],
            superclass: None,
            interfaces: Vec::new(),
            fields: nova_core::Arena::new(),
            methods: nova_core::Arena::new(),
            annotations: Vec::new(),
        };
        assert!(class_needs_signature(&class));
    }

    #[test]
    fn wildcard_type_argument_translates_to_extends() {
        let bound = Type::class(ClassSymbol::new("java/lang/Number"));
        let arg = Type::Wild(Box::new(WildTy::Upper(bound)));
        let translated = translate_type_argument(&arg);
        assert!(matches!(translated, TypeArgument::Extends(_)));
    }

    #[test]
    fn plain_class_typed_field_needs_no_signature() {
        let ty = Type::class(ClassSymbol::new("java/lang/String"));
        assert!(!field_needs_signature(&ty));
    }

    #[test]
    fn parameterized_field_type_needs_signature() {
        let list = ClassSymbol::new("java/util/List");
        let ty = Type::Class(ClassTy {
            segments: vec![SimpleClassTy {
                sym: list,
                type_arguments: vec![Type::class(ClassSymbol::new("java/lang/String"))],
                annotations: Vec::new(),
            }],
        });
        assert!(field_needs_signature(&ty));
    }
}
