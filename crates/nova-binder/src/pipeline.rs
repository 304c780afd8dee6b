//! Top-level driver: runs every stage in pipeline order over a full set of
//! compilation units plus a classpath environment, producing the output
//! class-byte map handed to the jar writer.
//!
//! Per-class work happens in two passes. The first mints type parameters,
//! resolves the hierarchy, and binds members (`Header`/`Member` stage) for
//! every declared type, so the second pass can freely look any of them up
//! through a shared [`Env`] while evaluating constants and annotations
//! (`Const` stage). Lowering only starts once every class has reached
//! `Const`.

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;
use nova_core::{Arena, Diagnostic, FileId};
use nova_types::{
    Access, BindingStage, ClassKind, ClassSymbol, CompoundEnv, Env, FieldSymbol, Type,
    TyVarOwner, TypeBoundClass,
};

use crate::constant::{ConstantEvaluator, FieldResolver, ResolvedField};
use crate::diagnostics::DiagnosticSink;
use crate::hierarchy::HierarchyBinder;
use crate::lower::{inner_classes_closure, lower_class, RetentionPolicy, RetentionResolver};
use crate::member::{bind_field, bind_method, translate_access};
use crate::module::ModuleBinder;
use crate::package::PackageBinder;
use crate::resolve::TypeResolutionContext;
use crate::scope::{CompilationUnitScope, MapScope};
use crate::tree::{CompilationUnit, DeclKind, Expr};
use crate::type_params::bind_type_parameters;

/// Everything the pipeline produced for one compilation.
pub struct PipelineOutput {
    pub diagnostics: Vec<Diagnostic>,
    /// `internal-name -> class-bytes`, one entry per declared type plus one
    /// `module-info` entry per bound module unit (keyed `module-info`, or
    /// `<module-name>/module-info` when more than one module is bound in
    /// the same compilation, to keep the keys distinct).
    pub classes: IndexMap<String, Vec<u8>>,
    /// The bound module units in typed form, for callers that want the
    /// directive data directly rather than re-parsing the bytes already in
    /// [`Self::classes`].
    pub modules: Vec<nova_modules::ModuleInfo>,
}

/// Runs the full pipeline. `root_imports` supplies the implicit
/// always-in-scope names (the language's root package), since this crate
/// has no package listing of its own for the classpath.
pub fn compile(
    units: &[CompilationUnit],
    classpath: &dyn Env,
    root_imports: &MapScope,
) -> PipelineOutput {
    let mut sink = DiagnosticSink::new();
    let package_result = PackageBinder::new(&mut sink).bind(units);

    let mut scopes: HashMap<FileId, CompilationUnitScope> = HashMap::new();
    for unit in units {
        let package_internal = unit.package.clone().unwrap_or_default().replace('.', "/");
        let mut scope = CompilationUnitScope::new();
        scope.implicit_root_imports = root_imports.clone();
        if let Some(cu) = package_result.same_compilation_unit.get(&unit.file) {
            for (name, sym) in cu {
                scope.same_compilation_unit.insert(name.clone(), sym.clone());
            }
        }
        if let Some(pkg) = package_result.same_package.get(&package_internal) {
            for (name, sym) in pkg {
                scope.same_package.insert(name.clone(), sym.clone());
            }
        }
        for import in &unit.imports {
            if import.on_demand {
                let pkg = import.path.replace('.', "/");
                if let Some(pkg_scope) = package_result.same_package.get(&pkg) {
                    let mut on_demand = MapScope::new();
                    for (name, sym) in pkg_scope {
                        on_demand.insert(name.clone(), sym.clone());
                    }
                    scope.on_demand_imports.push(on_demand);
                }
            } else {
                let simple_name = import.path.rsplit('.').next().unwrap_or(&import.path);
                let symbol = ClassSymbol::new(import.path.replace('.', "/"));
                scope.single_type_imports.insert(simple_name, symbol);
            }
        }
        scopes.insert(unit.file, scope);
    }

    let mut type_parameters_by_class: IndexMap<ClassSymbol, IndexMap<String, nova_types::TyVarSymbol>> =
        IndexMap::new();
    let mut bound: IndexMap<ClassSymbol, TypeBoundClass> = IndexMap::new();
    let mut field_initializers: HashMap<FieldSymbol, Expr> = HashMap::new();
    let mut hierarchy_binder = HierarchyBinder::new();

    for decl in &package_result.decls {
        let scope = scopes.get(&decl.file).expect("every file has a scope");

        let owner_type_parameters = decl
            .owner
            .as_ref()
            .and_then(|o| type_parameters_by_class.get(o))
            .cloned()
            .unwrap_or_default();
        let mut visible_type_parameters = owner_type_parameters;

        let type_parameters = bind_type_parameters(
            TyVarOwner::Class(decl.symbol.clone()),
            &decl.decl.type_parameters,
            scope,
            &mut visible_type_parameters,
            &mut sink,
            decl.file,
        );
        type_parameters_by_class.insert(decl.symbol.clone(), visible_type_parameters.clone());

        let hierarchy = hierarchy_binder.bind(
            &decl.symbol,
            decl.decl.superclass.as_ref(),
            &decl.decl.interfaces,
            scope,
            &visible_type_parameters,
            &mut sink,
            decl.file,
            decl.decl.line,
            decl.decl.column,
        );

        let mut fields = Arena::new();
        for field_decl in &decl.decl.fields {
            let field = bind_field(
                &decl.symbol,
                field_decl,
                scope,
                &visible_type_parameters,
                &mut sink,
                decl.file,
            );
            if let Some(init) = &field_decl.constant_initializer {
                field_initializers.insert(field.symbol.clone(), init.clone());
            }
            fields.alloc(field);
        }

        let mut methods = Arena::new();
        for method_decl in &decl.decl.methods {
            let method = bind_method(
                &decl.symbol,
                method_decl,
                scope,
                &visible_type_parameters,
                &mut sink,
                decl.file,
            );
            methods.alloc(method);
        }

        let class = TypeBoundClass {
            symbol: decl.symbol.clone(),
            stage: BindingStage::Member,
            kind: translate_decl_kind(decl.decl.kind),
            access: translate_access(&decl.decl.modifiers),
            owner: decl.owner.clone(),
            type_parameters,
            superclass: hierarchy.superclass,
            interfaces: hierarchy.interfaces,
            fields,
            methods,
            annotations: Vec::new(),
        };
        bound.insert(decl.symbol.clone(), class);
    }

    struct SourceEnv<'a>(&'a IndexMap<ClassSymbol, TypeBoundClass>);
    impl Env for SourceEnv<'_> {
        fn get(&self, sym: &ClassSymbol) -> Option<&TypeBoundClass> {
            self.0.get(sym)
        }
    }
    let source_env = SourceEnv(&bound);
    let env = CompoundEnv::new().with(&source_env).with(classpath);

    let resolver = PipelineFieldResolver {
        current: RefCell::new(ClassSymbol::new("")),
        env: &env,
        field_initializers: &field_initializers,
    };
    let mut evaluator = ConstantEvaluator::new(&resolver);

    let class_symbols: Vec<ClassSymbol> = bound.keys().cloned().collect();
    for symbol in &class_symbols {
        let decl = package_result
            .decls
            .iter()
            .find(|d| &d.symbol == symbol)
            .expect("every bound class came from a BoundDecl");
        let scope = scopes.get(&decl.file).expect("every file has a scope");
        let type_parameters = type_parameters_by_class
            .get(symbol)
            .cloned()
            .unwrap_or_default();
        let ctx = TypeResolutionContext {
            scope,
            type_parameters: &type_parameters,
        };
        *resolver.current.borrow_mut() = symbol.clone();

        let class_annotations: Vec<_> = decl
            .decl
            .annotations
            .iter()
            .map(|a| evaluator.evaluate_annotation(a, &ctx, &mut sink, decl.file, a.line, a.column))
            .collect();

        let mut field_annotations: HashMap<FieldSymbol, Vec<nova_types::AnnoInfo>> = HashMap::new();
        let mut field_consts: HashMap<FieldSymbol, nova_types::Const> = HashMap::new();
        for field_decl in &decl.decl.fields {
            let field_symbol = FieldSymbol::new(symbol.clone(), field_decl.name.as_str());
            let annos: Vec<_> = field_decl
                .annotations
                .iter()
                .map(|a| evaluator.evaluate_annotation(a, &ctx, &mut sink, decl.file, a.line, a.column))
                .collect();
            field_annotations.insert(field_symbol.clone(), annos);

            if let Some(init) = &field_decl.constant_initializer {
                let existing = &bound[symbol];
                if let Some((_, field)) = existing.field(&field_decl.name) {
                    if field.access.contains(Access::STATIC | Access::FINAL) {
                        let value = evaluator.evaluate(
                            init,
                            &field.ty,
                            &ctx,
                            &mut sink,
                            decl.file,
                            field_decl.line,
                            field_decl.column,
                        );
                        field_consts.insert(field_symbol, value);
                    }
                }
            }
        }

        let mut method_annotations: HashMap<nova_types::MethodSymbol, Vec<nova_types::AnnoInfo>> =
            HashMap::new();
        for method_decl in &decl.decl.methods {
            let existing = &bound[symbol];
            let Some(method) = existing
                .methods_named(&method_decl.name)
                .find(|m| m.parameter_types.len() == method_decl.parameters.len())
            else {
                continue;
            };
            let annos: Vec<_> = method_decl
                .annotations
                .iter()
                .map(|a| evaluator.evaluate_annotation(a, &ctx, &mut sink, decl.file, a.line, a.column))
                .collect();
            method_annotations.insert(method.symbol.clone(), annos);
        }

        let class = bound.get_mut(symbol).expect("class was just bound");
        class.annotations = class_annotations;
        class.stage = BindingStage::Const;

        let mut new_fields = Arena::new();
        for (_, field) in class.fields.iter() {
            let mut field = field.clone();
            if let Some(annos) = field_annotations.remove(&field.symbol) {
                field.annotations = annos;
            }
            if let Some(value) = field_consts.remove(&field.symbol) {
                field.const_value = Some(value);
            }
            new_fields.alloc(field);
        }
        class.fields = new_fields;

        let mut new_methods = Arena::new();
        for (_, method) in class.methods.iter() {
            let mut method = method.clone();
            if let Some(annos) = method_annotations.remove(&method.symbol) {
                method.annotations = annos;
            }
            new_methods.alloc(method);
        }
        class.methods = new_methods;
    }

    let all_symbols: Vec<(ClassSymbol, Option<ClassSymbol>, Access)> = bound
        .values()
        .map(|c| (c.symbol.clone(), c.owner.clone(), c.access))
        .collect();

    let retention = DefaultRetentionResolver { env: &env };

    let mut classes = IndexMap::new();
    for symbol in &class_symbols {
        let class = &bound[symbol];
        let mut file = lower_class(class, &retention);
        file.inner_classes = inner_classes_closure(class, all_symbols.iter().cloned());
        classes.insert(symbol.internal_name().to_string(), file.write());
    }
    classes.sort_keys();

    let mut modules = Vec::new();
    for unit in units {
        if let Some(module_decl) = &unit.module {
            let scope = scopes.get(&unit.file).expect("every file has a scope");
            let binder = ModuleBinder::new(scope);
            modules.push(binder.bind(module_decl, &mut sink, unit.file));
        }
    }

    for module in &modules {
        let key = if modules.len() > 1 {
            format!("{}/module-info", module.name.as_str().replace('.', "/"))
        } else {
            "module-info".to_string()
        };
        classes.insert(key, nova_classfile::write_module_info_class(module));
    }
    classes.sort_keys();

    PipelineOutput {
        diagnostics: sink.into_diagnostics(),
        classes,
        modules,
    }
}

fn translate_decl_kind(kind: DeclKind) -> ClassKind {
    match kind {
        DeclKind::Class => ClassKind::Class,
        DeclKind::Interface => ClassKind::Interface,
        DeclKind::Enum => ClassKind::Enum,
        DeclKind::Annotation => ClassKind::Annotation,
        DeclKind::Record => ClassKind::Record,
    }
}

/// Resolves cross-field constant references against whichever class is
/// currently being evaluated. `current` is set by the pipeline before each
/// class's fields/annotations are folded; single-segment names are looked
/// up on that class (and its declared supertype chain), multi-segment
/// names resolve their prefix as a type through the same `Env` a bound
/// `ClassTy` would use.
struct PipelineFieldResolver<'a> {
    current: RefCell<ClassSymbol>,
    env: &'a dyn Env,
    field_initializers: &'a HashMap<FieldSymbol, Expr>,
}

impl<'a> PipelineFieldResolver<'a> {
    fn find_field_on(&self, owner: &ClassSymbol, name: &str) -> Option<FieldSymbol> {
        let mut current = Some(owner.clone());
        let mut guard = 0;
        while let Some(sym) = current {
            guard += 1;
            if guard > 64 {
                break;
            }
            let class = self.env.get(&sym)?;
            if let Some((_, field)) = class.field(name) {
                return Some(field.symbol.clone());
            }
            current = class.superclass.as_ref().map(|s| s.symbol().clone());
        }
        None
    }
}

impl<'a> FieldResolver for PipelineFieldResolver<'a> {
    fn resolve_field(&self, segments: &[String]) -> Option<ResolvedField<'_>> {
        let owner = self.current.borrow().clone();

        let field_symbol = if segments.len() == 1 {
            self.find_field_on(&owner, &segments[0])
        } else {
            let type_name = segments[..segments.len() - 1].join("/");
            let candidate = ClassSymbol::new(type_name);
            self.find_field_on(&candidate, segments.last()?)
        }?;

        let class = self.env.get(&field_symbol.owner)?;
        let (_, field) = class.field(field_symbol.name.as_str())?;
        Some(ResolvedField {
            symbol: field_symbol.clone(),
            declared_type: field.ty.clone(),
            initializer: self.field_initializers.get(&field_symbol),
        })
    }

    fn resolve_enum_constant(&self, segments: &[String]) -> Option<Type> {
        if segments.len() < 2 {
            return None;
        }
        let type_name = segments[..segments.len() - 1].join("/");
        let candidate = ClassSymbol::new(type_name);
        let class = self.env.get(&candidate)?;
        if class.kind == ClassKind::Enum {
            Some(Type::class(candidate))
        } else {
            None
        }
    }
}

/// Looks up an annotation class's own `@Retention` (itself an annotation
/// use, evaluated the same way any other is) to decide visibility of its
/// uses elsewhere; annotation types with no retention annotation default to
/// `Class`, matching a plain `@interface` with no explicit retention.
struct DefaultRetentionResolver<'a> {
    env: &'a dyn Env,
}

impl<'a> RetentionResolver for DefaultRetentionResolver<'a> {
    fn retention(&self, annotation_class: &ClassSymbol) -> RetentionPolicy {
        let Some(class) = self.env.get(annotation_class) else {
            return RetentionPolicy::Class;
        };
        for anno in &class.annotations {
            if anno.sym.internal_name() == "java/lang/annotation/Retention" {
                if let Some(nova_types::Const::Enum { constant_name, .. }) =
                    anno.values.get(&nova_core::Name::from("value"))
                {
                    return match constant_name.as_str() {
                        "RUNTIME" => RetentionPolicy::Runtime,
                        "SOURCE" => RetentionPolicy::Source,
                        _ => RetentionPolicy::Class,
                    };
                }
            }
        }
        RetentionPolicy::Class
    }
}
