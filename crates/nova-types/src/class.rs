//! The fully (or partially) bound class declaration.
//!
//! A [`TypeBoundClass`] is mutable while a source file is being bound and
//! immutable once it has been materialized into an [`crate::Env`]; the
//! `stage` field records how far binding has progressed, since header
//! binding, member binding, and constant evaluation run as separate
//! fixpoint passes over the whole compilation.

use crate::constant::AnnoInfo;
use crate::symbol::{ClassSymbol, FieldSymbol, MethodSymbol, TyVarSymbol};
use crate::ty::{ClassTy, Type};
use bitflags::bitflags;
use nova_core::{Arena, Idx, Name};

/// How far a [`TypeBoundClass`] has progressed through binding.
///
/// Stages only move forward; a class never regresses from `Member` back to
/// `Header`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord)]
pub enum BindingStage {
    /// Supertype hierarchy and type parameters are resolved; fields and
    /// methods are not bound yet.
    Header,
    /// Fields and methods are bound, but constant field initializers are
    /// not yet evaluated.
    Member,
    /// Every `static final` constant-expression field has a resolved
    /// [`crate::Const`](crate::constant::Const) value.
    Const,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

bitflags! {
    /// Source and implicit modifiers on a class, field, or method
    /// declaration, mirroring the JVM `access_flags` bit layout so the
    /// class-file lowerer can write them back out directly.
    #[derive(Debug, Clone, Copy, Eq, PartialEq)]
    pub struct Access: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

#[derive(Debug, Clone)]
pub struct TypeParameterInfo {
    pub symbol: TyVarSymbol,
    pub class_bound: Option<Type>,
    pub interface_bounds: Vec<Type>,
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub symbol: FieldSymbol,
    pub access: Access,
    pub ty: Type,
    pub annotations: Vec<AnnoInfo>,
    /// Populated once the class reaches [`BindingStage::Const`] for
    /// `static final` fields of constant type; `None` otherwise.
    pub const_value: Option<crate::constant::Const>,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub symbol: MethodSymbol,
    pub access: Access,
    pub type_parameters: Vec<TypeParameterInfo>,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
    pub thrown_types: Vec<Type>,
    pub annotations: Vec<AnnoInfo>,
    /// Per-parameter annotations, parallel to `parameter_types`.
    pub parameter_annotations: Vec<Vec<AnnoInfo>>,
}

/// A class, interface, enum, record, or annotation type, bound to whatever
/// [`BindingStage`] has been reached so far.
#[derive(Debug, Clone)]
pub struct TypeBoundClass {
    pub symbol: ClassSymbol,
    pub stage: BindingStage,
    pub kind: ClassKind,
    pub access: Access,
    pub owner: Option<ClassSymbol>,
    pub type_parameters: Vec<TypeParameterInfo>,
    pub superclass: Option<ClassTy>,
    pub interfaces: Vec<ClassTy>,
    pub fields: Arena<FieldInfo>,
    pub methods: Arena<MethodInfo>,
    pub annotations: Vec<AnnoInfo>,
}

impl TypeBoundClass {
    pub fn field(&self, name: &str) -> Option<(Idx<FieldInfo>, &FieldInfo)> {
        self.fields
            .iter()
            .find(|(_, f)| f.symbol.name.as_str() == name)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodInfo> {
        self.methods
            .values()
            .filter(move |m| m.symbol.name.as_str() == name)
    }

    /// `true` once fields and methods have been bound (`Member` stage or
    /// later).
    pub fn members_bound(&self) -> bool {
        self.stage >= BindingStage::Member
    }
}

pub type TypeParameterName = Name;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::TyVarOwner;

    fn empty_class(sym: ClassSymbol, stage: BindingStage) -> TypeBoundClass {
        TypeBoundClass {
            symbol: sym,
            stage,
            kind: ClassKind::Class,
            access: Access::PUBLIC,
            owner: None,
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Arena::new(),
            methods: Arena::new(),
            annotations: Vec::new(),
        }
    }

    #[test]
    fn binding_stage_ordering_allows_stage_comparisons() {
        assert!(BindingStage::Header < BindingStage::Member);
        assert!(BindingStage::Member < BindingStage::Const);
    }

    #[test]
    fn members_bound_reflects_stage() {
        let sym = ClassSymbol::new("com/example/Foo");
        let header = empty_class(sym.clone(), BindingStage::Header);
        let member = empty_class(sym, BindingStage::Member);
        assert!(!header.members_bound());
        assert!(member.members_bound());
    }

    #[test]
    fn field_lookup_finds_declared_field() {
        let sym = ClassSymbol::new("com/example/Foo");
        let mut class = empty_class(sym.clone(), BindingStage::Member);
        class.fields.alloc(FieldInfo {
            symbol: FieldSymbol::new(sym, "x"),
            access: Access::PRIVATE | Access::FINAL,
            ty: Type::Prim(crate::ty::PrimTy::Int),
            annotations: Vec::new(),
            const_value: None,
        });
        let (_, field) = class.field("x").expect("field x exists");
        assert!(field.access.contains(Access::FINAL));
        assert!(class.field("missing").is_none());
    }

    #[test]
    fn tyvar_owner_distinguishes_class_and_method() {
        let class_sym = ClassSymbol::new("com/example/Foo");
        let method_sym = MethodSymbol::new(class_sym.clone(), "bar", "()V");
        let class_tv = TyVarSymbol::new(TyVarOwner::Class(class_sym), "T");
        let method_tv = TyVarSymbol::new(TyVarOwner::Method(method_sym), "T");
        assert_ne!(class_tv, method_tv);
    }
}
