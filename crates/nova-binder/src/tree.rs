//! The tree shape produced by the parser, consumed here as input.
//!
//! Everything in this module is a plain data description of source syntax:
//! no resolution, no symbols, no types. Binding turns a [`CompilationUnit`]
//! into [`nova_types::TypeBoundClass`]es; this module only describes what
//! the parser hands over.
//!
//! Every type below `CompilationUnit` itself derives [`serde::Deserialize`]:
//! with no source parser in this workspace, a driver's only way to hand the
//! binder a tree is to deserialize one, so the wire format and the binder's
//! in-memory tree are kept identical rather than introducing a parallel DTO
//! layer. `CompilationUnit` is excluded because its `file` field is a
//! process-local id a driver assigns itself, never something read off the
//! wire.

use nova_core::FileId;
use serde::Deserialize;

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub file: FileId,
    pub package: Option<String>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<ClassDecl>,
    pub module: Option<ModuleDecl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportDecl {
    /// Dot-separated path. `on_demand` imports name a package or type whose
    /// members are all imported (source `import foo.Bar.*;`).
    pub path: String,
    pub on_demand: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub kind: DeclKind,
    pub modifiers: Vec<Modifier>,
    pub type_parameters: Vec<TypeParamDecl>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub nested: Vec<ClassDecl>,
    pub annotations: Vec<AnnotationDecl>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Deserialize)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Strictfp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeParamDecl {
    pub name: String,
    /// Source order: a class bound (if any) first, then interface bounds.
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<AnnotationDecl>,
    pub constant_initializer: Option<Expr>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: TypeRef,
    pub type_parameters: Vec<TypeParamDecl>,
    pub parameters: Vec<ParamDecl>,
    pub is_varargs: bool,
    pub thrown: Vec<TypeRef>,
    pub modifiers: Vec<Modifier>,
    pub annotations: Vec<AnnotationDecl>,
    /// `default` clause of an annotation element method.
    pub annotation_default: Option<Expr>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
    pub annotations: Vec<AnnotationDecl>,
}

/// A type as written in source, before resolution.
#[derive(Debug, Clone, Deserialize)]
pub enum TypeRef {
    /// A dot- or simple-name reference, with an optional generic argument
    /// list attached to its *last* segment, e.g. `a.b.Foo<Bar>`.
    Named {
        segments: Vec<String>,
        type_arguments: Vec<TypeArgRef>,
    },
    Array(Box<TypeRef>),
    Primitive(PrimitiveKeyword),
    Void,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub enum PrimitiveKeyword {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

#[derive(Debug, Clone, Deserialize)]
pub enum TypeArgRef {
    Exact(TypeRef),
    Unbounded,
    Extends(TypeRef),
    Super(TypeRef),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationDecl {
    /// Resolved against the scope the same way a `TypeRef` is.
    pub name: Vec<String>,
    pub elements: Vec<(String, Expr)>,
    pub line: u32,
    pub column: u32,
}

/// A compile-time expression tree, as consumed by the constant evaluator.
#[derive(Debug, Clone, Deserialize)]
pub enum Expr {
    IntLit(i32),
    LongLit(i64),
    FloatLit(f32),
    DoubleLit(f64),
    BoolLit(bool),
    CharLit(char),
    StringLit(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Cast(TypeRef, Box<Expr>),
    Paren(Box<Expr>),
    /// A reference to another field, resolved through scope, e.g. `OTHER`
    /// or `Outer.OTHER`.
    NameRef(Vec<String>),
    EnumConstRef {
        enum_type: TypeRef,
        const_name: String,
    },
    ClassLiteral(TypeRef),
    ArrayInit(Vec<Expr>),
    AnnotationLit(AnnotationDecl),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDecl {
    pub name: String,
    pub is_open: bool,
    pub requires: Vec<RequiresDirective>,
    pub exports: Vec<ExportsDirective>,
    pub opens: Vec<OpensDirective>,
    pub uses: Vec<Vec<String>>,
    pub provides: Vec<ProvidesDirective>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequiresDirective {
    pub module: String,
    pub is_transitive: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportsDirective {
    pub package: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpensDirective {
    pub package: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidesDirective {
    pub service: Vec<String>,
    pub implementations: Vec<Vec<String>>,
}
