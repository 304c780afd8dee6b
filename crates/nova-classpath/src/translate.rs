//! Translates parsed class-file stubs into the bound [`TypeBoundClass`]
//! model, the mirror image of what `nova-types-signature` does when
//! lowering a bound class back into signature grammar.
//!
//! A classpath class is already fully resolved by definition (it was
//! compiled once already), so every stub is bound straight to
//! [`BindingStage::Const`]. `Exceptions` is still not reconstructed unless
//! it shows up in the `Signature` attribute itself (a thrown checked type
//! with no type arguments has no other attribute to live in), but
//! `ConstantValue` and both `RuntimeVisible`/`RuntimeInvisibleAnnotations`
//! round-trip through [`ClassStub`]/[`FieldStub`]/[`MethodStub`] the same
//! way `nova-binder`'s lowerer produces them, just run in reverse.

use indexmap::IndexMap;

use nova_classfile::{
    parse_field_descriptor, Annotation, BaseType, ClassStub, ClassTypeSignature, ConstValue,
    ElementValue, FieldStub, FieldType, InnerClassInfo, MethodStub, ReturnType, TypeArgument,
    TypeParameter, TypeSignature,
};
use nova_core::Name;
use nova_types::{
    Access, AnnoInfo, ArrayTy, BindingStage, ClassKind, ClassSymbol, ClassTy, Const, FieldInfo,
    FieldSymbol, MethodInfo, MethodSymbol, PrimTy, SimpleClassTy, Type, TyVarOwner, TyVarSymbol,
    TypeBoundClass, TypeParameterInfo, WildTy,
};

pub fn bound_class_from_stub(stub: &ClassStub) -> TypeBoundClass {
    let symbol = ClassSymbol::new(stub.internal_name.as_str());
    let kind = class_kind(stub.access_flags);
    let access = Access::from_bits_truncate(stub.access_flags);
    let owner = enclosing_owner(&symbol, &stub.inner_classes);

    let mut class_tyvars: IndexMap<String, TyVarSymbol> = IndexMap::new();
    let (type_parameters, superclass, interfaces) = match &stub.signature {
        Some(sig) => {
            let type_parameters = translate_type_parameters(
                TyVarOwner::Class(symbol.clone()),
                &sig.type_parameters,
                &mut class_tyvars,
            );
            let superclass = Some(class_type_signature_to_class_ty(
                &sig.super_class,
                &class_tyvars,
            ));
            let interfaces = sig
                .interfaces
                .iter()
                .map(|i| class_type_signature_to_class_ty(i, &class_tyvars))
                .collect();
            (type_parameters, superclass, interfaces)
        }
        None => {
            let superclass = stub.super_class.as_deref().map(simple_class_ty);
            let interfaces = stub.interfaces.iter().map(|s| simple_class_ty(s)).collect();
            (Vec::new(), superclass, interfaces)
        }
    };

    let mut fields = nova_core::Arena::new();
    for f in &stub.fields {
        fields.alloc(field_info(&symbol, &class_tyvars, f));
    }
    let mut methods = nova_core::Arena::new();
    for m in &stub.methods {
        methods.alloc(method_info(&symbol, &class_tyvars, m));
    }

    TypeBoundClass {
        symbol,
        stage: BindingStage::Const,
        kind,
        access,
        owner,
        type_parameters,
        superclass,
        interfaces,
        fields,
        methods,
        annotations: stub.annotations.iter().map(annotation_to_anno_info).collect(),
    }
}

fn annotation_to_anno_info(anno: &Annotation) -> AnnoInfo {
    let sym = match &anno.type_internal_name {
        Some(name) => ClassSymbol::new(name.as_str()),
        None => ClassSymbol::new(anno.type_descriptor.as_str()),
    };
    let values = anno
        .elements
        .iter()
        .map(|(name, value)| (Name::from(name.as_str()), element_value_to_const(value)))
        .collect();
    AnnoInfo { sym, values }
}

fn element_value_to_const(value: &ElementValue) -> Const {
    match value {
        ElementValue::Const(cv) => const_value_to_const(cv),
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => Const::Enum {
            ty: class_literal_type(type_descriptor),
            constant_name: Name::from(const_name.as_str()),
        },
        ElementValue::Class(descriptor) => Const::Class(class_literal_type(descriptor)),
        ElementValue::Annotation(nested) => {
            Const::Annotation(Box::new(annotation_to_anno_info(nested)))
        }
        ElementValue::Array(values) => {
            Const::Array(values.iter().map(element_value_to_const).collect())
        }
    }
}

fn const_value_to_const(value: &ConstValue) -> Const {
    match value {
        ConstValue::Boolean(v) => Const::Boolean(*v),
        ConstValue::Byte(v) => Const::Byte(*v),
        ConstValue::Short(v) => Const::Short(*v),
        ConstValue::Char(v) => Const::Char(*v as u16),
        ConstValue::Int(v) => Const::Int(*v),
        ConstValue::Long(v) => Const::Long(*v),
        ConstValue::Float(v) => Const::Float(*v),
        ConstValue::Double(v) => Const::Double(*v),
        ConstValue::String(v) => Const::String(v.clone()),
    }
}

/// `Foo.class` and enum-constant type references use field-descriptor
/// grammar, same as a field's own descriptor.
fn class_literal_type(descriptor: &str) -> Type {
    match parse_field_descriptor(descriptor) {
        Ok(ft) => field_type_to_type(&ft),
        Err(_) => Type::error(None),
    }
}

fn class_kind(access_flags: u16) -> ClassKind {
    const ACC_INTERFACE: u16 = 0x0200;
    const ACC_ANNOTATION: u16 = 0x2000;
    const ACC_ENUM: u16 = 0x4000;

    if access_flags & ACC_ANNOTATION != 0 {
        ClassKind::Annotation
    } else if access_flags & ACC_ENUM != 0 {
        ClassKind::Enum
    } else if access_flags & ACC_INTERFACE != 0 {
        ClassKind::Interface
    } else {
        ClassKind::Class
    }
}

fn enclosing_owner(symbol: &ClassSymbol, inner_classes: &[InnerClassInfo]) -> Option<ClassSymbol> {
    inner_classes
        .iter()
        .find(|ic| ic.inner_class == symbol.internal_name())
        .and_then(|ic| ic.outer_class.as_deref())
        .map(ClassSymbol::new)
}

fn simple_class_ty(internal_name: &str) -> ClassTy {
    ClassTy {
        segments: vec![SimpleClassTy {
            sym: ClassSymbol::new(internal_name),
            type_arguments: Vec::new(),
            annotations: Vec::new(),
        }],
    }
}

fn class_type_signature_to_class_ty(
    sig: &ClassTypeSignature,
    tyvars: &IndexMap<String, TyVarSymbol>,
) -> ClassTy {
    let mut prefix = if sig.package.is_empty() {
        String::new()
    } else {
        format!("{}/", sig.package.join("/"))
    };

    let mut segments = Vec::with_capacity(sig.segments.len());
    for (idx, seg) in sig.segments.iter().enumerate() {
        if idx == 0 {
            prefix.push_str(&seg.name);
        } else {
            prefix.push('$');
            prefix.push_str(&seg.name);
        }
        segments.push(SimpleClassTy {
            sym: ClassSymbol::new(prefix.as_str()),
            type_arguments: seg
                .type_arguments
                .iter()
                .map(|a| type_argument_to_type(a, tyvars))
                .collect(),
            annotations: Vec::new(),
        });
    }

    ClassTy { segments }
}

fn type_argument_to_type(arg: &TypeArgument, tyvars: &IndexMap<String, TyVarSymbol>) -> Type {
    match arg {
        TypeArgument::Any => Type::Wild(Box::new(WildTy::Unbound)),
        TypeArgument::Exact(ty) => type_signature_to_type(ty, tyvars),
        TypeArgument::Extends(ty) => {
            Type::Wild(Box::new(WildTy::Upper(type_signature_to_type(ty, tyvars))))
        }
        TypeArgument::Super(ty) => {
            Type::Wild(Box::new(WildTy::Lower(type_signature_to_type(ty, tyvars))))
        }
    }
}

fn type_signature_to_type(ty: &TypeSignature, tyvars: &IndexMap<String, TyVarSymbol>) -> Type {
    match ty {
        TypeSignature::Base(base) => Type::Prim(base_to_prim(*base)),
        TypeSignature::Array(elem) => Type::Array(Box::new(ArrayTy {
            element: type_signature_to_type(elem, tyvars),
            annotations: Vec::new(),
        })),
        TypeSignature::Class(class_ty) => {
            Type::Class(class_type_signature_to_class_ty(class_ty, tyvars))
        }
        TypeSignature::TypeVariable(name) => match tyvars.get(name) {
            Some(sym) => Type::TyVar(sym.clone()),
            // A signature referencing a type variable no enclosing scope
            // declared is malformed input; resolve to an error type rather
            // than panicking so one bad classpath entry doesn't take down
            // binding for everything else.
            None => Type::error(Some(name.as_str().into())),
        },
    }
}

fn base_to_prim(base: BaseType) -> PrimTy {
    match base {
        BaseType::Boolean => PrimTy::Boolean,
        BaseType::Byte => PrimTy::Byte,
        BaseType::Short => PrimTy::Short,
        BaseType::Char => PrimTy::Char,
        BaseType::Int => PrimTy::Int,
        BaseType::Long => PrimTy::Long,
        BaseType::Float => PrimTy::Float,
        BaseType::Double => PrimTy::Double,
    }
}

fn field_type_to_type(ty: &FieldType) -> Type {
    match ty {
        FieldType::Base(base) => Type::Prim(base_to_prim(*base)),
        FieldType::Object(name) => Type::Class(simple_class_ty(name)),
        FieldType::Array(elem) => Type::Array(Box::new(ArrayTy {
            element: field_type_to_type(elem),
            annotations: Vec::new(),
        })),
    }
}

fn translate_type_parameters(
    owner: TyVarOwner,
    params: &[TypeParameter],
    tyvars: &mut IndexMap<String, TyVarSymbol>,
) -> Vec<TypeParameterInfo> {
    // Mint every symbol before resolving any bound, so an F-bounded
    // parameter (`<T extends Comparable<T>>`) can reference its own or a
    // sibling's symbol.
    for p in params {
        tyvars.insert(p.name.clone(), TyVarSymbol::new(owner.clone(), p.name.as_str()));
    }

    params
        .iter()
        .map(|p| {
            let symbol = tyvars.get(&p.name).expect("minted above").clone();
            let class_bound = p
                .class_bound
                .as_ref()
                .map(|b| type_signature_to_type(b, tyvars));
            let interface_bounds = p
                .interface_bounds
                .iter()
                .map(|b| type_signature_to_type(b, tyvars))
                .collect();
            TypeParameterInfo {
                symbol,
                class_bound,
                interface_bounds,
            }
        })
        .collect()
}

fn field_info(owner: &ClassSymbol, class_tyvars: &IndexMap<String, TyVarSymbol>, f: &FieldStub) -> FieldInfo {
    let ty = match &f.signature {
        Some(sig) => type_signature_to_type(sig, class_tyvars),
        None => field_type_to_type(&f.parsed_descriptor),
    };

    FieldInfo {
        symbol: FieldSymbol::new(owner.clone(), f.name.as_str()),
        access: Access::from_bits_truncate(f.access_flags),
        ty,
        annotations: f.annotations.iter().map(annotation_to_anno_info).collect(),
        const_value: f.const_value.as_ref().map(const_value_to_const),
    }
}

fn method_info(owner: &ClassSymbol, class_tyvars: &IndexMap<String, TyVarSymbol>, m: &MethodStub) -> MethodInfo {
    let method_sym = MethodSymbol::new(owner.clone(), m.name.as_str(), m.descriptor.as_str());
    let mut tyvars = class_tyvars.clone();

    let type_parameters = match &m.signature {
        Some(sig) => translate_type_parameters(
            TyVarOwner::Method(method_sym.clone()),
            &sig.type_parameters,
            &mut tyvars,
        ),
        None => Vec::new(),
    };

    let (parameter_types, return_type, thrown_types) = match &m.signature {
        Some(sig) => (
            sig.parameters
                .iter()
                .map(|p| type_signature_to_type(p, &tyvars))
                .collect(),
            sig.return_type
                .as_ref()
                .map(|t| type_signature_to_type(t, &tyvars))
                .unwrap_or(Type::Void),
            sig.throws
                .iter()
                .map(|t| type_signature_to_type(t, &tyvars))
                .collect(),
        ),
        None => (
            m.parsed_descriptor.params.iter().map(field_type_to_type).collect(),
            match &m.parsed_descriptor.return_type {
                ReturnType::Void => Type::Void,
                ReturnType::Type(ft) => field_type_to_type(ft),
            },
            Vec::new(),
        ),
    };

    let param_count = m.parsed_descriptor.params.len();
    MethodInfo {
        symbol: method_sym,
        access: Access::from_bits_truncate(m.access_flags),
        type_parameters,
        parameter_types,
        return_type,
        thrown_types,
        annotations: m.annotations.iter().map(annotation_to_anno_info).collect(),
        parameter_annotations: vec![Vec::new(); param_count],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_classfile::{ClassFile, ClassMember};

    fn class_file(
        this_class: &str,
        super_class: Option<&str>,
        signature: Option<&str>,
        fields: Vec<ClassMember>,
    ) -> ClassFile {
        ClassFile {
            minor_version: 0,
            major_version: 61,
            access_flags: 0x0021,
            this_class: this_class.to_string(),
            super_class: super_class.map(str::to_string),
            interfaces: Vec::new(),
            fields,
            methods: Vec::new(),
            signature: signature.map(str::to_string),
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    fn member(name: &str, descriptor: &str, signature: Option<&str>) -> ClassMember {
        ClassMember {
            access_flags: 0x0001,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: signature.map(str::to_string),
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            const_value: None,
        }
    }

    fn annotated(mut field: ClassMember, annotation: Annotation) -> ClassMember {
        field.runtime_visible_annotations.push(annotation);
        field
    }

    fn marker_annotation(internal_name: &str) -> Annotation {
        Annotation {
            type_descriptor: format!("L{internal_name};"),
            type_internal_name: Some(internal_name.to_string()),
            elements: Vec::new(),
        }
    }

    #[test]
    fn plain_class_gets_single_segment_superclass() {
        let cf = class_file("pkg/Foo", Some("java/lang/Object"), None, Vec::new());
        let stub = cf.stub().unwrap();
        let class = bound_class_from_stub(&stub);
        let superclass = class.superclass.expect("superclass present");
        assert_eq!(superclass.symbol().internal_name(), "java/lang/Object");
    }

    #[test]
    fn generic_superclass_gets_resolved_type_argument() {
        let cf = class_file(
            "pkg/Box",
            Some("java/lang/Object"),
            Some("<T:Ljava/lang/Object;>Ljava/lang/Object;"),
            vec![member("value", "Ljava/lang/Object;", Some("TT;"))],
        );
        let stub = cf.stub().unwrap();
        let class = bound_class_from_stub(&stub);
        assert_eq!(class.type_parameters.len(), 1);
        let (_, field) = class.field("value").unwrap();
        assert!(matches!(field.ty, Type::TyVar(_)));
    }

    #[test]
    fn non_generic_field_uses_erased_descriptor() {
        let cf = class_file(
            "pkg/Foo",
            Some("java/lang/Object"),
            None,
            vec![member("count", "I", None)],
        );
        let stub = cf.stub().unwrap();
        let class = bound_class_from_stub(&stub);
        let (_, field) = class.field("count").unwrap();
        assert!(matches!(field.ty, Type::Prim(PrimTy::Int)));
        assert!(field.const_value.is_none());
    }

    #[test]
    fn static_final_field_carries_reconstructed_constant_value() {
        let mut field = member("MAX", "I", None);
        field.const_value = Some(ConstValue::Int(100));
        let cf = class_file("pkg/Foo", Some("java/lang/Object"), None, vec![field]);
        let stub = cf.stub().unwrap();
        let class = bound_class_from_stub(&stub);
        let (_, field) = class.field("MAX").unwrap();
        assert_eq!(field.const_value, Some(Const::Int(100)));
    }

    #[test]
    fn class_and_field_annotations_are_reconstructed() {
        let mut cf = class_file(
            "pkg/Foo",
            Some("java/lang/Object"),
            None,
            vec![annotated(
                member("count", "I", None),
                marker_annotation("pkg/NonNull"),
            )],
        );
        cf.runtime_visible_annotations.push(marker_annotation("pkg/Deprecated"));

        let stub = cf.stub().unwrap();
        let class = bound_class_from_stub(&stub);
        assert_eq!(class.annotations.len(), 1);
        assert_eq!(class.annotations[0].sym.internal_name(), "pkg/Deprecated");

        let (_, field) = class.field("count").unwrap();
        assert_eq!(field.annotations.len(), 1);
        assert_eq!(field.annotations[0].sym.internal_name(), "pkg/NonNull");
    }
}
