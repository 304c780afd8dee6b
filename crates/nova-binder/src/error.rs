//! The closed error taxonomy every binder stage reports through.
//!
//! Recoverable errors never unwind the pipeline: a stage records one of
//! these against a [`nova_core::Location`] and substitutes a sentinel
//! (`Type::Error`, a zero `Const`, ...) so later stages keep making
//! progress. Only [`BindError::InternalAssertion`] indicates a broken
//! invariant and is meant to be impossible to hit in practice.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("cannot resolve `{0}`")]
    SymbolNotFound(String),

    #[error("`{0}` is ambiguous: resolves to both {1} and {2}")]
    AmbiguousName(String, String, String),

    #[error("cyclic inheritance involving `{0}`")]
    CyclicHierarchy(String),

    #[error("invalid value for annotation element `{0}`: {1}")]
    InvalidAnnotationArgument(String, String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("module `{0}` not found")]
    ModuleNotFound(String),

    #[error("`{0}` is already declared")]
    DuplicateDeclaration(String),

    #[error("modifier `{0}` is not allowed here")]
    IllegalModifier(String),

    #[error("not a constant expression: {0}")]
    BadConstantExpression(String),

    #[error("`{0}` does not resolve to a type")]
    CannotResolveToType(String),

    #[error("internal assertion failed: {0}")]
    InternalAssertion(String),
}

impl BindError {
    /// Stable, short tag used as [`nova_core::Diagnostic::kind`].
    pub fn kind(&self) -> &'static str {
        match self {
            BindError::SymbolNotFound(_) => "symbol-not-found",
            BindError::AmbiguousName(..) => "ambiguous-name",
            BindError::CyclicHierarchy(_) => "cyclic-hierarchy",
            BindError::InvalidAnnotationArgument(..) => "invalid-annotation-argument",
            BindError::TypeMismatch { .. } => "type-mismatch",
            BindError::ModuleNotFound(_) => "module-not-found",
            BindError::DuplicateDeclaration(_) => "duplicate-declaration",
            BindError::IllegalModifier(_) => "illegal-modifier",
            BindError::BadConstantExpression(_) => "bad-constant-expression",
            BindError::CannotResolveToType(_) => "cannot-resolve-to-type",
            BindError::InternalAssertion(_) => "internal-assertion",
        }
    }

    /// Human-readable argument list, for [`nova_core::Diagnostic::args`].
    pub fn args(&self) -> Vec<String> {
        match self {
            BindError::SymbolNotFound(name) => vec![name.clone()],
            BindError::AmbiguousName(name, a, b) => vec![name.clone(), a.clone(), b.clone()],
            BindError::CyclicHierarchy(name) => vec![name.clone()],
            BindError::InvalidAnnotationArgument(elem, reason) => {
                vec![elem.clone(), reason.clone()]
            }
            BindError::TypeMismatch { expected, found } => vec![expected.clone(), found.clone()],
            BindError::ModuleNotFound(name) => vec![name.clone()],
            BindError::DuplicateDeclaration(name) => vec![name.clone()],
            BindError::IllegalModifier(name) => vec![name.clone()],
            BindError::BadConstantExpression(reason) => vec![reason.clone()],
            BindError::CannotResolveToType(name) => vec![name.clone()],
            BindError::InternalAssertion(reason) => vec![reason.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_stable_per_variant() {
        assert_eq!(BindError::SymbolNotFound("Foo".into()).kind(), "symbol-not-found");
        assert_eq!(
            BindError::CyclicHierarchy("Foo".into()).kind(),
            "cyclic-hierarchy"
        );
    }

    #[test]
    fn args_carry_the_interpolated_values() {
        let err = BindError::TypeMismatch {
            expected: "int".into(),
            found: "String".into(),
        };
        assert_eq!(err.args(), vec!["int".to_string(), "String".to_string()]);
    }
}
