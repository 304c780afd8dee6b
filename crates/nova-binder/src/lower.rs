//! Class-file lowering: turns a fully bound [`TypeBoundClass`] into the
//! binary-ready [`ClassFile`]/[`ClassMember`] representation, deciding
//! `Signature` presence and annotation visibility along the way.
//!
//! The emitted `ClassFile` still needs [`nova_classfile::ClassFile::write`]
//! to become bytes; this module only builds the intermediate structure so
//! the pipeline can batch every class before serializing.

use std::collections::BTreeSet;

use nova_classfile::{
    write_class_signature, write_field_signature, write_method_signature, Annotation, ClassFile,
    ClassMember, ConstValue, ElementValue, InnerClassInfo,
};
use nova_types::{Access, AnnoInfo, ClassSymbol, Const, FieldInfo, MethodInfo, Type, TypeBoundClass};
use nova_types_signature::{
    class_needs_signature, class_signature, field_needs_signature, field_signature,
    method_needs_signature, method_signature,
};

use crate::member::{erased_method_descriptor, erased_type_descriptor};

/// How an annotation type's retention policy was declared, which decides
/// whether its uses end up in `RuntimeVisibleAnnotations`,
/// `RuntimeInvisibleAnnotations`, or are omitted entirely.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RetentionPolicy {
    Source,
    Class,
    Runtime,
}

/// Looks up an annotation type's retention; implemented by the caller,
/// which has access to the full bound-class set plus the classpath.
pub trait RetentionResolver {
    fn retention(&self, annotation_class: &ClassSymbol) -> RetentionPolicy;
}

/// Lowers every member of `class`; `class` must have reached at least
/// [`nova_types::BindingStage::Member`].
pub fn lower_class(class: &TypeBoundClass, retention: &dyn RetentionResolver) -> ClassFile {
    let access_flags = lowered_class_access(class).bits();

    let signature = if class_needs_signature(class) {
        Some(write_class_signature(&class_signature(class)))
    } else {
        None
    };

    let (runtime_visible_annotations, runtime_invisible_annotations) =
        lower_annotations(&class.annotations, retention);

    let fields = class
        .fields
        .values()
        .map(|f| lower_field(f, retention))
        .collect();
    let methods = class
        .methods
        .values()
        .map(|m| lower_method(m, retention))
        .collect();

    ClassFile {
        minor_version: 0,
        major_version: 68, // Java 24's class-file major version.
        access_flags,
        this_class: class.symbol.internal_name().to_string(),
        super_class: class
            .superclass
            .as_ref()
            .map(|ty| ty.symbol().internal_name().to_string()),
        interfaces: class
            .interfaces
            .iter()
            .map(|ty| ty.symbol().internal_name().to_string())
            .collect(),
        fields,
        methods,
        signature,
        runtime_visible_annotations,
        runtime_invisible_annotations,
        inner_classes: Vec::new(),
    }
}

/// An interface declaration carries `ACC_INTERFACE | ACC_ABSTRACT`
/// regardless of what the source modifier list spelled out explicitly.
fn lowered_class_access(class: &TypeBoundClass) -> Access {
    let mut access = class.access;
    match class.kind {
        nova_types::ClassKind::Interface | nova_types::ClassKind::Annotation => {
            access |= Access::INTERFACE | Access::ABSTRACT;
        }
        nova_types::ClassKind::Enum => access |= Access::ENUM,
        nova_types::ClassKind::Record | nova_types::ClassKind::Class => {}
    }
    access |= Access::SUPER;
    access
}

fn lower_field(field: &FieldInfo, retention: &dyn RetentionResolver) -> ClassMember {
    let signature = if field_needs_signature(&field.ty) {
        field_signature(&field.ty).map(|sig| write_field_signature(&sig))
    } else {
        None
    };
    let (runtime_visible_annotations, runtime_invisible_annotations) =
        lower_annotations(&field.annotations, retention);

    ClassMember {
        access_flags: field.access.bits(),
        name: field.symbol.name.as_str().to_string(),
        descriptor: erased_type_descriptor(&field.ty),
        signature,
        runtime_visible_annotations,
        runtime_invisible_annotations,
        const_value: field.const_value.as_ref().and_then(lower_const_value),
    }
}

/// `ConstantValue` only accepts the eight constant-expression primitive
/// types and `String`; a `static final` field of any other constant type
/// (a class literal, an enum constant, an annotation, an array) is a
/// legitimate `FieldInfo.const_value` but has no attribute to lower into.
fn lower_const_value(value: &Const) -> Option<ConstValue> {
    match value {
        Const::Boolean(v) => Some(ConstValue::Boolean(*v)),
        Const::Byte(v) => Some(ConstValue::Byte(*v)),
        Const::Short(v) => Some(ConstValue::Short(*v)),
        Const::Char(v) => Some(ConstValue::Char(
            char::from_u32(*v as u32).unwrap_or('\u{FFFD}'),
        )),
        Const::Int(v) => Some(ConstValue::Int(*v)),
        Const::Long(v) => Some(ConstValue::Long(*v)),
        Const::Float(v) => Some(ConstValue::Float(*v)),
        Const::Double(v) => Some(ConstValue::Double(*v)),
        Const::String(v) => Some(ConstValue::String(v.clone())),
        Const::Class(_) | Const::Enum { .. } | Const::Annotation(_) | Const::Array(_) => None,
    }
}

fn lower_method(method: &MethodInfo, retention: &dyn RetentionResolver) -> ClassMember {
    let signature = if method_needs_signature(method) {
        Some(write_method_signature(&method_signature(method)))
    } else {
        None
    };
    let (runtime_visible_annotations, runtime_invisible_annotations) =
        lower_annotations(&method.annotations, retention);

    ClassMember {
        access_flags: method.access.bits(),
        name: method.symbol.name.as_str().to_string(),
        descriptor: erased_method_descriptor(&method.parameter_types, &method.return_type),
        signature,
        runtime_visible_annotations,
        runtime_invisible_annotations,
        const_value: None,
    }
}

fn lower_annotations(
    annotations: &[AnnoInfo],
    retention: &dyn RetentionResolver,
) -> (Vec<Annotation>, Vec<Annotation>) {
    let mut visible = Vec::new();
    let mut invisible = Vec::new();
    for anno in annotations {
        match retention.retention(&anno.sym) {
            RetentionPolicy::Source => {}
            RetentionPolicy::Class => invisible.push(lower_annotation(anno)),
            RetentionPolicy::Runtime => visible.push(lower_annotation(anno)),
        }
    }
    (visible, invisible)
}

fn lower_annotation(anno: &AnnoInfo) -> Annotation {
    Annotation {
        type_descriptor: format!("L{};", anno.sym.internal_name()),
        type_internal_name: Some(anno.sym.internal_name().to_string()),
        elements: anno
            .values
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), lower_element_value(value)))
            .collect(),
    }
}

fn lower_element_value(value: &Const) -> ElementValue {
    match value {
        Const::Boolean(v) => ElementValue::Const(ConstValue::Boolean(*v)),
        Const::Byte(v) => ElementValue::Const(ConstValue::Byte(*v)),
        Const::Short(v) => ElementValue::Const(ConstValue::Short(*v)),
        Const::Char(v) => ElementValue::Const(ConstValue::Char(
            char::from_u32(*v as u32).unwrap_or('\u{FFFD}'),
        )),
        Const::Int(v) => ElementValue::Const(ConstValue::Int(*v)),
        Const::Long(v) => ElementValue::Const(ConstValue::Long(*v)),
        Const::Float(v) => ElementValue::Const(ConstValue::Float(*v)),
        Const::Double(v) => ElementValue::Const(ConstValue::Double(*v)),
        Const::String(v) => ElementValue::Const(ConstValue::String(v.clone())),
        Const::Class(ty) => ElementValue::Class(type_descriptor(ty)),
        Const::Enum { ty, constant_name } => ElementValue::Enum {
            type_descriptor: type_descriptor(ty),
            const_name: constant_name.as_str().to_string(),
        },
        Const::Annotation(anno) => ElementValue::Annotation(Box::new(lower_annotation(anno))),
        Const::Array(values) => {
            ElementValue::Array(values.iter().map(lower_element_value).collect())
        }
    }
}

fn type_descriptor(ty: &Type) -> String {
    erased_type_descriptor(ty)
}

/// The `InnerClasses` closure for one output class: every class symbol
/// that is itself a member class and is referenced, directly or through a
/// nesting relationship, by `class` or any of the classes already in
/// `members`.
///
/// Per-class-file `InnerClasses` only needs entries for classes the
/// constant pool actually mentions plus their enclosing chain, but emitting
/// the full nest (every class sharing the outermost enclosing class) is
/// simpler and always a superset, which is what every stub-only reader
/// tolerates.
pub fn inner_classes_closure(
    class: &TypeBoundClass,
    all_symbols: impl Iterator<Item = (ClassSymbol, Option<ClassSymbol>, Access)>,
) -> Vec<InnerClassInfo> {
    let mut owners = std::collections::HashMap::new();
    let mut access_flags = std::collections::HashMap::new();
    for (sym, owner, access) in all_symbols {
        if let Some(owner) = owner {
            owners.insert(sym.clone(), owner);
        }
        access_flags.insert(sym, access);
    }

    let mut seen = BTreeSet::new();
    let mut queue = vec![class.symbol.clone()];
    while let Some(current) = queue.pop() {
        if let Some(owner) = owners.get(&current) {
            if seen.insert(owner.clone()) {
                queue.push(owner.clone());
            }
        }
    }
    // The class itself, if it is a member class, also gets an entry.
    if owners.contains_key(&class.symbol) {
        seen.insert(class.symbol.clone());
    }

    let mut result: Vec<InnerClassInfo> = seen
        .into_iter()
        .map(|sym| {
            let access = access_flags.get(&sym).copied().unwrap_or(Access::PUBLIC);
            InnerClassInfo {
                inner_class: sym.internal_name().to_string(),
                outer_class: owners.get(&sym).map(|o| o.internal_name().to_string()),
                inner_name: Some(sym.simple_name().to_string()),
                access_flags: access.bits(),
            }
        })
        .collect();
    result.sort_by(|a, b| a.inner_class.cmp(&b.inner_class));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::Arena;
    use nova_types::{BindingStage, ClassKind, ClassTy, FieldSymbol, SimpleClassTy};

    struct AlwaysRuntime;
    impl RetentionResolver for AlwaysRuntime {
        fn retention(&self, _annotation_class: &ClassSymbol) -> RetentionPolicy {
            RetentionPolicy::Runtime
        }
    }

    fn object_ty() -> ClassTy {
        ClassTy {
            segments: vec![SimpleClassTy {
                sym: ClassSymbol::new("java/lang/Object"),
                type_arguments: Vec::new(),
                annotations: Vec::new(),
            }],
        }
    }

    fn simple_class(sym: ClassSymbol) -> TypeBoundClass {
        TypeBoundClass {
            symbol: sym,
            stage: BindingStage::Member,
            kind: ClassKind::Class,
            access: Access::PUBLIC,
            owner: None,
            type_parameters: Vec::new(),
            superclass: Some(object_ty()),
            interfaces: Vec::new(),
            fields: Arena::new(),
            methods: Arena::new(),
            annotations: Vec::new(),
        }
    }

    #[test]
    fn lowered_class_carries_descriptor_and_super() {
        let class = simple_class(ClassSymbol::new("com/example/Foo"));
        let file = lower_class(&class, &AlwaysRuntime);
        assert_eq!(file.this_class, "com/example/Foo");
        assert_eq!(file.super_class.as_deref(), Some("java/lang/Object"));
        assert!(file.signature.is_none());
    }

    #[test]
    fn interface_gets_interface_and_abstract_flags() {
        let mut class = simple_class(ClassSymbol::new("com/example/Foo"));
        class.kind = ClassKind::Interface;
        class.superclass = None;
        let file = lower_class(&class, &AlwaysRuntime);
        assert_ne!(file.access_flags & Access::INTERFACE.bits(), 0);
        assert_ne!(file.access_flags & Access::ABSTRACT.bits(), 0);
    }

    #[test]
    fn field_descriptor_is_erased() {
        let owner = ClassSymbol::new("com/example/Foo");
        let mut class = simple_class(owner.clone());
        class.fields.alloc(FieldInfo {
            symbol: FieldSymbol::new(owner, "x"),
            access: Access::PRIVATE,
            ty: Type::Prim(nova_types::PrimTy::Int),
            annotations: Vec::new(),
            const_value: None,
        });
        let file = lower_class(&class, &AlwaysRuntime);
        assert_eq!(file.fields[0].descriptor, "I");
    }

    #[test]
    fn static_final_primitive_field_carries_constant_value() {
        let owner = ClassSymbol::new("com/example/Foo");
        let mut class = simple_class(owner.clone());
        class.fields.alloc(FieldInfo {
            symbol: FieldSymbol::new(owner.clone(), "MAX"),
            access: Access::PUBLIC | Access::STATIC | Access::FINAL,
            ty: Type::Prim(nova_types::PrimTy::Int),
            annotations: Vec::new(),
            const_value: Some(Const::Int(100)),
        });
        class.fields.alloc(FieldInfo {
            symbol: FieldSymbol::new(owner, "KIND"),
            access: Access::PUBLIC | Access::STATIC | Access::FINAL,
            ty: Type::class(ClassSymbol::new("com/example/Kind")),
            annotations: Vec::new(),
            const_value: Some(Const::Enum {
                ty: Type::class(ClassSymbol::new("com/example/Kind")),
                constant_name: nova_core::Name::from("A"),
            }),
        });

        let file = lower_class(&class, &AlwaysRuntime);
        assert_eq!(file.fields[0].const_value, Some(ConstValue::Int(100)));
        assert_eq!(file.fields[1].const_value, None);
    }

    #[test]
    fn inner_classes_closure_includes_enclosing_chain() {
        let outer = ClassSymbol::new("com/example/Outer");
        let inner = ClassSymbol::new("com/example/Outer$Inner");
        let class = simple_class(inner.clone());
        let closure = inner_classes_closure(
            &class,
            vec![
                (outer.clone(), None, Access::PUBLIC),
                (inner.clone(), Some(outer.clone()), Access::PUBLIC | Access::STATIC),
            ]
            .into_iter(),
        );
        assert_eq!(closure.len(), 1);
        assert_eq!(closure[0].inner_class, "com/example/Outer$Inner");
        assert_eq!(closure[0].outer_class.as_deref(), Some("com/example/Outer"));
    }
}
