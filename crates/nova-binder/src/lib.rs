//! Binder: turns parsed compilation units into bound, lowered class files.
//!
//! This crate owns every stage between a parser's output tree and the
//! bytes a downstream archive writer puts on disk: package/name binding,
//! hierarchy resolution, type-parameter binding, member binding, constant
//! evaluation, module binding, generic-signature translation, and
//! class-file lowering. [`pipeline::compile`] is the single entry point
//! that runs every stage in order; the individual modules are public so a
//! caller building an incremental or language-server-style driver can
//! invoke a single stage directly instead.

mod constant;
mod diagnostics;
mod error;
mod hierarchy;
mod lower;
mod member;
mod module;
mod package;
mod pipeline;
mod resolve;
mod scope;
mod transitive;
mod tree;
mod type_params;

pub use constant::{ConstantEvaluator, FieldResolver, ResolvedField};
pub use diagnostics::DiagnosticSink;
pub use error::BindError;
pub use hierarchy::{HierarchyBinder, HierarchyResult};
pub use lower::{inner_classes_closure, lower_class, RetentionPolicy, RetentionResolver};
pub use member::{bind_field, bind_method};
pub use module::ModuleBinder;
pub use package::{BoundDecl, PackageBindResult, PackageBinder};
pub use pipeline::{compile, PipelineOutput};
pub use resolve::{resolve_type_ref, TypeResolutionContext};
pub use scope::{CompilationUnitScope, MapScope, Scope, ScopeHit};
pub use transitive::{collect_transitive_closure, copy_transitive_bytes, ClasspathBytes};
pub use tree::{
    AnnotationDecl, BinaryOp, ClassDecl, CompilationUnit, DeclKind, Expr, ExportsDirective,
    FieldDecl, ImportDecl, MethodDecl, Modifier, ModuleDecl, OpensDirective, ParamDecl,
    PrimitiveKeyword, ProvidesDirective, RequiresDirective, TypeArgRef, TypeParamDecl, TypeRef,
    UnaryOp,
};
pub use type_params::bind_type_parameters;
