//! The bound symbol and type model shared by every binder stage.
//!
//! `nova-types` holds data only: symbols that name declarations, the `Type`
//! tagged union, and the [`TypeBoundClass`] a declaration is bound into as
//! binding advances through its stages. It knows nothing about source
//! syntax or the binary class-file format; `nova-types-signature` and
//! `nova-classfile` bridge to those on either side.

mod class;
mod constant;
mod env;
mod symbol;
mod ty;

pub use class::{
    Access, BindingStage, ClassKind, FieldInfo, MethodInfo, TypeBoundClass, TypeParameterInfo,
};
pub use constant::{AnnoInfo, Const};
pub use env::{CompoundEnv, Env};
pub use symbol::{ClassSymbol, FieldSymbol, MethodSymbol, TyVarOwner, TyVarSymbol};
pub use ty::{ArrayTy, ClassTy, ErrorTy, IntersectionTy, PrimTy, SimpleClassTy, Type, WildTy};
