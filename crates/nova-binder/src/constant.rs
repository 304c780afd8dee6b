//! Constant expression evaluator: folds `static final` initializers,
//! annotation element values, and `case` labels into [`Const`].
//!
//! Field-to-field references (`static final int A = B + 1;`) are evaluated
//! lazily and memoized per [`FieldSymbol`]; a field that references itself
//! transitively reports [`BindError::BadConstantExpression`] and evaluates
//! to a zero sentinel rather than recursing forever.

use std::collections::HashSet;

use indexmap::IndexMap;
use nova_core::{FileId, Name};
use nova_types::{AnnoInfo, Const, Type};

use crate::diagnostics::DiagnosticSink;
use crate::error::BindError;
use crate::resolve::{resolve_type_ref, TypeResolutionContext};
use crate::tree::{AnnotationDecl, BinaryOp, Expr, UnaryOp};

/// What a [`FieldResolver`] hands back for a name that resolves to a field:
/// enough to recurse into that field's own initializer.
pub struct ResolvedField<'a> {
    pub symbol: nova_types::FieldSymbol,
    pub declared_type: Type,
    pub initializer: Option<&'a Expr>,
}

/// Resolves a dotted name (`OTHER`, `Outer.OTHER`) appearing in a constant
/// expression to the field it denotes. Implemented by the caller, which
/// has access to the full set of classes being bound plus the classpath.
pub trait FieldResolver {
    fn resolve_field(&self, segments: &[String]) -> Option<ResolvedField<'_>>;
    /// `Foo.BAR` where `BAR` is an enum constant rather than a field;
    /// distinguished from a plain field so the evaluator can build
    /// `Const::Enum` instead of recursing into an initializer.
    fn resolve_enum_constant(&self, segments: &[String]) -> Option<Type>;
}

pub struct ConstantEvaluator<'a, R: FieldResolver> {
    resolver: &'a R,
    memo: IndexMap<nova_types::FieldSymbol, Const>,
    in_progress: HashSet<nova_types::FieldSymbol>,
}

impl<'a, R: FieldResolver> ConstantEvaluator<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            memo: IndexMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Evaluates `expr`, coercing the result toward `target_type` (widening
    /// numeric literals and applying the scalar-to-array coercion for
    /// annotation array elements per [`Const::into_singleton_array`]).
    pub fn evaluate(
        &mut self,
        expr: &Expr,
        target_type: &Type,
        ctx: &TypeResolutionContext<'_>,
        sink: &mut DiagnosticSink,
        file: FileId,
        line: u32,
        column: u32,
    ) -> Const {
        let value = self.eval(expr, ctx, sink, file, line, column);
        coerce(value, target_type)
    }

    fn eval(
        &mut self,
        expr: &Expr,
        ctx: &TypeResolutionContext<'_>,
        sink: &mut DiagnosticSink,
        file: FileId,
        line: u32,
        column: u32,
    ) -> Const {
        match expr {
            Expr::IntLit(v) => Const::Int(*v),
            Expr::LongLit(v) => Const::Long(*v),
            Expr::FloatLit(v) => Const::Float(*v),
            Expr::DoubleLit(v) => Const::Double(*v),
            Expr::BoolLit(v) => Const::Boolean(*v),
            Expr::CharLit(c) => Const::Char(*c as u16),
            Expr::StringLit(s) => Const::String(s.clone()),
            Expr::Paren(inner) => self.eval(inner, ctx, sink, file, line, column),
            Expr::Unary(op, inner) => {
                let v = self.eval(inner, ctx, sink, file, line, column);
                eval_unary(*op, v)
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = self.eval(lhs, ctx, sink, file, line, column);
                let r = self.eval(rhs, ctx, sink, file, line, column);
                eval_binary(*op, l, r)
            }
            Expr::Conditional(cond, then_branch, else_branch) => {
                match self.eval(cond, ctx, sink, file, line, column) {
                    Const::Boolean(true) => self.eval(then_branch, ctx, sink, file, line, column),
                    _ => self.eval(else_branch, ctx, sink, file, line, column),
                }
            }
            Expr::Cast(ty, inner) => {
                let value = self.eval(inner, ctx, sink, file, line, column);
                let target = resolve_type_ref(ty, ctx, sink, file, line, column);
                narrow(value, &target)
            }
            Expr::NameRef(segments) => self.eval_name_ref(segments, sink, file, line, column),
            Expr::EnumConstRef {
                enum_type,
                const_name,
            } => {
                let ty = resolve_type_ref(enum_type, ctx, sink, file, line, column);
                Const::Enum {
                    ty,
                    constant_name: Name::from(const_name.clone()),
                }
            }
            Expr::ClassLiteral(ty) => {
                Const::Class(resolve_type_ref(ty, ctx, sink, file, line, column))
            }
            Expr::ArrayInit(elements) => Const::Array(
                elements
                    .iter()
                    .map(|e| self.eval(e, ctx, sink, file, line, column))
                    .collect(),
            ),
            Expr::AnnotationLit(decl) => Const::Annotation(Box::new(self.eval_annotation(
                decl, ctx, sink, file, line, column,
            ))),
        }
    }

    fn eval_name_ref(
        &mut self,
        segments: &[String],
        sink: &mut DiagnosticSink,
        file: FileId,
        line: u32,
        column: u32,
    ) -> Const {
        if let Some(ty) = self.resolver.resolve_enum_constant(segments) {
            let constant_name = segments.last().cloned().unwrap_or_default();
            return Const::Enum {
                ty,
                constant_name: Name::from(constant_name),
            };
        }

        let Some(field) = self.resolver.resolve_field(segments) else {
            sink.report(
                file,
                line,
                column,
                &BindError::SymbolNotFound(segments.join(".")),
            );
            return zero();
        };

        if let Some(cached) = self.memo.get(&field.symbol) {
            return cached.clone();
        }

        if !self.in_progress.insert(field.symbol.clone()) {
            sink.report(
                file,
                line,
                column,
                &BindError::BadConstantExpression(format!(
                    "`{:?}` references itself",
                    field.symbol
                )),
            );
            return zero();
        }

        let value = match field.initializer {
            Some(init) => {
                // The referenced field's own scope isn't available here
                // (only its resolver-visible initializer is); a field
                // initializer that itself names a type parameter or an
                // import local to its own compilation unit is out of
                // reach from this call site, which is a known limitation
                // of evaluating across files without a shared `Env`.
                let ctx = TypeResolutionContext {
                    scope: &crate::scope::CompilationUnitScope::default(),
                    type_parameters: &IndexMap::new(),
                };
                let raw = self.eval(init, &ctx, sink, file, line, column);
                coerce(raw, &field.declared_type)
            }
            None => zero(),
        };

        self.in_progress.remove(&field.symbol);
        self.memo.insert(field.symbol.clone(), value.clone());
        value
    }

    /// Evaluates a source annotation use into its bound [`AnnoInfo`]; the
    /// class/field/method binders call this directly once a declaration's
    /// own annotation list is in scope, rather than only reaching it
    /// through an `AnnotationLit` expression nested inside another
    /// constant.
    pub fn evaluate_annotation(
        &mut self,
        decl: &AnnotationDecl,
        ctx: &TypeResolutionContext<'_>,
        sink: &mut DiagnosticSink,
        file: FileId,
        line: u32,
        column: u32,
    ) -> AnnoInfo {
        self.eval_annotation(decl, ctx, sink, file, line, column)
    }

    fn eval_annotation(
        &mut self,
        decl: &AnnotationDecl,
        ctx: &TypeResolutionContext<'_>,
        sink: &mut DiagnosticSink,
        file: FileId,
        line: u32,
        column: u32,
    ) -> AnnoInfo {
        let Some(hit) = ctx.scope.resolve(&decl.name) else {
            sink.report(
                file,
                line,
                column,
                &BindError::SymbolNotFound(decl.name.join(".")),
            );
            return AnnoInfo {
                sym: nova_types::ClassSymbol::new(decl.name.join("/")),
                values: IndexMap::new(),
            };
        };

        let mut values = IndexMap::new();
        for (name, expr) in &decl.elements {
            // The declared element type is not known without the
            // annotation's own bound member list; annotation literals
            // nested inside another constant are coerced against the
            // outer element's array-ness only, so scalar/array shape is
            // decided by the expression form itself here.
            let value = self.eval(expr, ctx, sink, file, line, column);
            values.insert(Name::from(name.clone()), value);
        }

        AnnoInfo {
            sym: hit.symbol,
            values,
        }
    }
}

fn zero() -> Const {
    Const::Int(0)
}

/// Coerces an evaluated constant toward `target_type`: numeric widening
/// between the eight constant-expression-eligible primitive kinds, and the
/// scalar-to-singleton-array rule for annotation array elements.
pub fn coerce(value: Const, target_type: &Type) -> Const {
    match target_type {
        Type::Array(array) => match value {
            Const::Array(_) => value,
            scalar => coerce(scalar, &array.element).into_singleton_array(),
        },
        Type::Prim(prim) => widen(value, *prim),
        _ => value,
    }
}

fn widen(value: Const, prim: nova_types::PrimTy) -> Const {
    use nova_types::PrimTy::*;
    let as_long = match &value {
        Const::Byte(v) => Some(*v as i64),
        Const::Short(v) => Some(*v as i64),
        Const::Char(v) => Some(*v as i64),
        Const::Int(v) => Some(*v as i64),
        Const::Long(v) => Some(*v),
        _ => None,
    };
    let as_double = match &value {
        Const::Float(v) => Some(*v as f64),
        Const::Double(v) => Some(*v),
        _ => as_long.map(|v| v as f64),
    };

    match (prim, &value) {
        (Boolean, Const::Boolean(_)) => value,
        (Byte, _) => as_long.map(|v| Const::Byte(v as i8)).unwrap_or(value),
        (Short, _) => as_long.map(|v| Const::Short(v as i16)).unwrap_or(value),
        (Char, _) => as_long.map(|v| Const::Char(v as u16)).unwrap_or(value),
        (Int, _) => as_long.map(|v| Const::Int(v as i32)).unwrap_or(value),
        (Long, _) => as_long.map(Const::Long).unwrap_or(value),
        (Float, _) => as_double.map(|v| Const::Float(v as f32)).unwrap_or(value),
        (Double, _) => as_double.map(Const::Double).unwrap_or(value),
        _ => value,
    }
}

/// An explicit cast, which (unlike widening coercion) can also narrow.
fn narrow(value: Const, target: &Type) -> Const {
    match target {
        Type::Prim(prim) => widen(value, *prim),
        _ => value,
    }
}

fn eval_unary(op: UnaryOp, v: Const) -> Const {
    match (op, v) {
        (UnaryOp::Neg, Const::Int(v)) => Const::Int(v.wrapping_neg()),
        (UnaryOp::Neg, Const::Long(v)) => Const::Long(v.wrapping_neg()),
        (UnaryOp::Neg, Const::Float(v)) => Const::Float(-v),
        (UnaryOp::Neg, Const::Double(v)) => Const::Double(-v),
        (UnaryOp::Not, Const::Boolean(v)) => Const::Boolean(!v),
        (UnaryOp::BitNot, Const::Int(v)) => Const::Int(!v),
        (UnaryOp::BitNot, Const::Long(v)) => Const::Long(!v),
        (_, other) => other,
    }
}

/// Binary numeric promotion: `byte`/`short`/`char` widen to `int`, then the
/// wider of the two operands wins (`double` > `float` > `long` > `int`).
#[derive(Clone, Copy, PartialEq, PartialOrd)]
enum Rank {
    Int,
    Long,
    Float,
    Double,
}

fn rank(c: &Const) -> Option<Rank> {
    match c {
        Const::Byte(_) | Const::Short(_) | Const::Char(_) | Const::Int(_) => Some(Rank::Int),
        Const::Long(_) => Some(Rank::Long),
        Const::Float(_) => Some(Rank::Float),
        Const::Double(_) => Some(Rank::Double),
        _ => None,
    }
}

fn as_i64(c: &Const) -> i64 {
    match c {
        Const::Byte(v) => *v as i64,
        Const::Short(v) => *v as i64,
        Const::Char(v) => *v as i64,
        Const::Int(v) => *v as i64,
        Const::Long(v) => *v,
        _ => 0,
    }
}

fn as_f64(c: &Const) -> f64 {
    match c {
        Const::Float(v) => *v as f64,
        Const::Double(v) => *v,
        other => as_i64(other) as f64,
    }
}

fn eval_binary(op: BinaryOp, l: Const, r: Const) -> Const {
    if op == BinaryOp::Add {
        if let (Const::String(_), _) | (_, Const::String(_)) = (&l, &r) {
            return Const::String(format!("{}{}", display(&l), display(&r)));
        }
    }

    if matches!(op, BinaryOp::And | BinaryOp::Or) {
        if let (Const::Boolean(a), Const::Boolean(b)) = (&l, &r) {
            return Const::Boolean(match op {
                BinaryOp::And => *a && *b,
                BinaryOp::Or => *a || *b,
                _ => unreachable!(),
            });
        }
    }

    if matches!(
        op,
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
    ) {
        return eval_comparison(op, &l, &r);
    }

    let promoted = match (rank(&l), rank(&r)) {
        (Some(a), Some(b)) => a.max_rank(b),
        _ => return l,
    };

    match promoted {
        Rank::Double => eval_double(op, as_f64(&l), as_f64(&r)),
        Rank::Float => eval_float(op, as_f64(&l) as f32, as_f64(&r) as f32),
        Rank::Long => eval_long(op, as_i64(&l), as_i64(&r)),
        Rank::Int => eval_int(op, as_i64(&l) as i32, as_i64(&r) as i32),
    }
}

impl Rank {
    fn max_rank(self, other: Rank) -> Rank {
        if self as u8 >= other as u8 {
            self
        } else {
            other
        }
    }
}

fn eval_comparison(op: BinaryOp, l: &Const, r: &Const) -> Const {
    let ordering = if matches!(l, Const::Float(_) | Const::Double(_))
        || matches!(r, Const::Float(_) | Const::Double(_))
    {
        as_f64(l).partial_cmp(&as_f64(r))
    } else if let (Const::Boolean(a), Const::Boolean(b)) = (l, r) {
        Some(a.cmp(b))
    } else {
        Some(as_i64(l).cmp(&as_i64(r)))
    };

    let Some(ordering) = ordering else {
        return Const::Boolean(false);
    };

    Const::Boolean(match op {
        BinaryOp::Eq => ordering == std::cmp::Ordering::Equal,
        BinaryOp::Ne => ordering != std::cmp::Ordering::Equal,
        BinaryOp::Lt => ordering == std::cmp::Ordering::Less,
        BinaryOp::Le => ordering != std::cmp::Ordering::Greater,
        BinaryOp::Gt => ordering == std::cmp::Ordering::Greater,
        BinaryOp::Ge => ordering != std::cmp::Ordering::Less,
        _ => unreachable!(),
    })
}

fn eval_int(op: BinaryOp, a: i32, b: i32) -> Const {
    Const::Int(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => a.checked_div(b).unwrap_or(0),
        BinaryOp::Rem => a.checked_rem(b).unwrap_or(0),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Shl => a.wrapping_shl(b as u32 & 0x1f),
        BinaryOp::Shr => a.wrapping_shr(b as u32 & 0x1f),
        BinaryOp::UShr => ((a as u32).wrapping_shr(b as u32 & 0x1f)) as i32,
        _ => 0,
    })
}

fn eval_long(op: BinaryOp, a: i64, b: i64) -> Const {
    Const::Long(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => a.checked_div(b).unwrap_or(0),
        BinaryOp::Rem => a.checked_rem(b).unwrap_or(0),
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Shl => a.wrapping_shl(b as u32 & 0x3f),
        BinaryOp::Shr => a.wrapping_shr(b as u32 & 0x3f),
        BinaryOp::UShr => ((a as u64).wrapping_shr(b as u32 & 0x3f)) as i64,
        _ => 0,
    })
}

fn eval_float(op: BinaryOp, a: f32, b: f32) -> Const {
    Const::Float(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => 0.0,
    })
}

fn eval_double(op: BinaryOp, a: f64, b: f64) -> Const {
    Const::Double(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => 0.0,
    })
}

fn display(c: &Const) -> String {
    match c {
        Const::Boolean(v) => v.to_string(),
        Const::Byte(v) => v.to_string(),
        Const::Short(v) => v.to_string(),
        Const::Char(v) => char::from_u32(*v as u32).unwrap_or('\u{FFFD}').to_string(),
        Const::Int(v) => v.to_string(),
        Const::Long(v) => v.to_string(),
        Const::Float(v) => v.to_string(),
        Const::Double(v) => v.to_string(),
        Const::String(s) => s.clone(),
        Const::Class(_) => String::new(),
        Const::Enum { constant_name, .. } => constant_name.as_str().to_string(),
        Const::Annotation(_) => String::new(),
        Const::Array(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::CompilationUnitScope;

    struct NoFields;
    impl FieldResolver for NoFields {
        fn resolve_field(&self, _segments: &[String]) -> Option<ResolvedField<'_>> {
            None
        }
        fn resolve_enum_constant(&self, _segments: &[String]) -> Option<Type> {
            None
        }
    }

    fn ctx<'a>(scope: &'a CompilationUnitScope, tp: &'a IndexMap<String, nova_types::TyVarSymbol>) -> TypeResolutionContext<'a> {
        TypeResolutionContext {
            scope,
            type_parameters: tp,
        }
    }

    #[test]
    fn integer_arithmetic_wraps_like_the_jvm() {
        let resolver = NoFields;
        let mut eval = ConstantEvaluator::new(&resolver);
        let scope = CompilationUnitScope::new();
        let tp = IndexMap::new();
        let mut sink = DiagnosticSink::new();
        let expr = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::IntLit(i32::MAX)),
            Box::new(Expr::IntLit(1)),
        );
        let value = eval.evaluate(
            &expr,
            &Type::Prim(nova_types::PrimTy::Int),
            &ctx(&scope, &tp),
            &mut sink,
            FileId::new(0),
            1,
            1,
        );
        assert_eq!(value, Const::Int(i32::MIN));
    }

    #[test]
    fn string_concat_stringifies_both_sides() {
        let resolver = NoFields;
        let mut eval = ConstantEvaluator::new(&resolver);
        let scope = CompilationUnitScope::new();
        let tp = IndexMap::new();
        let mut sink = DiagnosticSink::new();
        let expr = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::StringLit("n=".to_string())),
            Box::new(Expr::IntLit(7)),
        );
        let value = eval.eval(&expr, &ctx(&scope, &tp), &mut sink, FileId::new(0), 1, 1);
        assert_eq!(value, Const::String("n=7".to_string()));
    }

    #[test]
    fn self_referential_field_is_reported_and_zeroed() {
        struct SelfRef;
        impl FieldResolver for SelfRef {
            fn resolve_field(&self, segments: &[String]) -> Option<ResolvedField<'_>> {
                // A fresh leaked expr keeps the test double's lifetimes
                // simple; it only runs once per evaluator call anyway since
                // the in-progress check short-circuits recursion.
                let boxed: &'static Expr = Box::leak(Box::new(Expr::NameRef(vec!["A".to_string()])));
                let _ = segments;
                Some(ResolvedField {
                    symbol: nova_types::FieldSymbol::new(
                        nova_types::ClassSymbol::new("pkg/Foo"),
                        "A",
                    ),
                    declared_type: Type::Prim(nova_types::PrimTy::Int),
                    initializer: Some(boxed),
                })
            }
            fn resolve_enum_constant(&self, _segments: &[String]) -> Option<Type> {
                None
            }
        }

        let resolver = SelfRef;
        let mut eval = ConstantEvaluator::new(&resolver);
        let scope = CompilationUnitScope::new();
        let tp = IndexMap::new();
        let mut sink = DiagnosticSink::new();
        let value = eval.eval_name_ref(&["A".to_string()], &mut sink, FileId::new(0), 1, 1);
        assert_eq!(value, Const::Int(0));
        assert!(sink.has_errors());
    }

    #[test]
    fn widening_coerces_int_literal_to_declared_long_field() {
        let resolver = NoFields;
        let mut eval = ConstantEvaluator::new(&resolver);
        let scope = CompilationUnitScope::new();
        let tp = IndexMap::new();
        let mut sink = DiagnosticSink::new();
        let value = eval.evaluate(
            &Expr::IntLit(5),
            &Type::Prim(nova_types::PrimTy::Long),
            &ctx(&scope, &tp),
            &mut sink,
            FileId::new(0),
            1,
            1,
        );
        assert_eq!(value, Const::Long(5));
    }
}
