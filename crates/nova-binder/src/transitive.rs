//! Transitive dependency collector: finds every classpath class a
//! compiled set of sources actually references (through supertypes, field
//! and method signatures, and type-parameter bounds), so their original
//! bytes can be copied into the same output archive without a separate
//! classpath scan at link time.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use nova_types::{ClassSymbol, ClassTy, Env, Type, WildTy};

/// A source of a classpath entry's original, unmodified bytes.
pub trait ClasspathBytes {
    fn bytes(&self, sym: &ClassSymbol) -> Option<Vec<u8>>;
}

/// Walks every type reachable from `roots` (superclasses, interfaces,
/// type-parameter bounds, field types, method signatures) through `env`,
/// returning every symbol reached that isn't itself one of `roots` — the
/// ones that came from the classpath rather than from this compilation.
pub fn collect_transitive_closure(roots: &[ClassSymbol], env: &dyn Env) -> HashSet<ClassSymbol> {
    let root_set: HashSet<ClassSymbol> = roots.iter().cloned().collect();
    let mut seen: HashSet<ClassSymbol> = HashSet::new();
    let mut queue: VecDeque<ClassSymbol> = roots.iter().cloned().collect();

    while let Some(sym) = queue.pop_front() {
        let Some(class) = env.get(&sym) else {
            continue;
        };

        let mut refs = Vec::new();
        if let Some(sc) = &class.superclass {
            collect_class_ty(sc, &mut refs);
        }
        for iface in &class.interfaces {
            collect_class_ty(iface, &mut refs);
        }
        for tp in &class.type_parameters {
            if let Some(b) = &tp.class_bound {
                collect_type(b, &mut refs);
            }
            for b in &tp.interface_bounds {
                collect_type(b, &mut refs);
            }
        }
        for (_, field) in class.fields.iter() {
            collect_type(&field.ty, &mut refs);
        }
        for (_, method) in class.methods.iter() {
            for p in &method.parameter_types {
                collect_type(p, &mut refs);
            }
            collect_type(&method.return_type, &mut refs);
            for t in &method.thrown_types {
                collect_type(t, &mut refs);
            }
        }

        for r in refs {
            if seen.insert(r.clone()) {
                queue.push_back(r);
            }
        }
    }

    seen.into_iter().filter(|s| !root_set.contains(s)).collect()
}

fn collect_class_ty(ty: &ClassTy, out: &mut Vec<ClassSymbol>) {
    for seg in &ty.segments {
        out.push(seg.sym.clone());
        for arg in &seg.type_arguments {
            collect_type(arg, out);
        }
    }
}

fn collect_type(ty: &Type, out: &mut Vec<ClassSymbol>) {
    match ty {
        Type::Class(c) => collect_class_ty(c, out),
        Type::Array(a) => collect_type(&a.element, out),
        Type::Wild(w) => match w.as_ref() {
            WildTy::Unbound => {}
            WildTy::Upper(t) | WildTy::Lower(t) => collect_type(t, out),
        },
        Type::Intersection(i) => {
            for b in &i.bounds {
                collect_type(b, out);
            }
        }
        Type::TyVar(_) | Type::Prim(_) | Type::Void | Type::Error(_) => {}
    }
}

/// Copies original bytes for every transitively-referenced classpath class
/// under `prefix` (e.g. `"META-INF/nova-classpath/"`), so a downstream
/// linker can resolve them without re-walking the classpath itself.
///
/// Entries are sorted by internal name, matching the deterministic output
/// order the rest of the pipeline uses.
pub fn copy_transitive_bytes(
    roots: &[ClassSymbol],
    env: &dyn Env,
    source: &dyn ClasspathBytes,
    prefix: &str,
) -> IndexMap<String, Vec<u8>> {
    let mut deps: Vec<ClassSymbol> = collect_transitive_closure(roots, env).into_iter().collect();
    deps.sort_by(|a, b| a.internal_name().cmp(b.internal_name()));

    let mut out = IndexMap::new();
    for sym in deps {
        if let Some(bytes) = source.bytes(&sym) {
            out.insert(format!("{prefix}{}.class", sym.internal_name()), bytes);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{
        Access, BindingStage, ClassKind, FieldInfo, FieldSymbol, SimpleClassTy, TypeBoundClass,
    };
    use std::collections::HashMap;

    struct MapEnv(HashMap<ClassSymbol, TypeBoundClass>);
    impl Env for MapEnv {
        fn get(&self, sym: &ClassSymbol) -> Option<&TypeBoundClass> {
            self.0.get(sym)
        }
    }

    fn class_ty(sym: &str) -> ClassTy {
        ClassTy {
            segments: vec![SimpleClassTy {
                sym: ClassSymbol::new(sym),
                type_arguments: Vec::new(),
                annotations: Vec::new(),
            }],
        }
    }

    fn empty_class(sym: ClassSymbol, superclass: Option<ClassTy>) -> TypeBoundClass {
        TypeBoundClass {
            symbol: sym,
            stage: BindingStage::Member,
            kind: ClassKind::Class,
            access: Access::PUBLIC,
            owner: None,
            type_parameters: Vec::new(),
            superclass,
            interfaces: Vec::new(),
            fields: nova_core::Arena::new(),
            methods: nova_core::Arena::new(),
            annotations: Vec::new(),
        }
    }

    #[test]
    fn superclass_reference_is_collected_but_self_is_not() {
        let foo = ClassSymbol::new("pkg/Foo");
        let base = ClassSymbol::new("java/lang/Object");
        let mut map = HashMap::new();
        map.insert(foo.clone(), empty_class(foo.clone(), Some(class_ty("java/lang/Object"))));
        map.insert(base.clone(), empty_class(base.clone(), None));
        let env = MapEnv(map);

        let closure = collect_transitive_closure(&[foo.clone()], &env);
        assert!(closure.contains(&base));
        assert!(!closure.contains(&foo));
    }

    #[test]
    fn field_type_reference_is_collected() {
        let foo = ClassSymbol::new("pkg/Foo");
        let used = ClassSymbol::new("pkg/Used");
        let mut class = empty_class(foo.clone(), None);
        class.fields.alloc(FieldInfo {
            symbol: FieldSymbol::new(foo.clone(), "x"),
            access: Access::PRIVATE,
            ty: Type::class(used.clone()),
            annotations: Vec::new(),
            const_value: None,
        });
        let mut map = HashMap::new();
        map.insert(foo.clone(), class);
        map.insert(used.clone(), empty_class(used.clone(), None));
        let env = MapEnv(map);

        let closure = collect_transitive_closure(&[foo], &env);
        assert!(closure.contains(&used));
    }

    #[test]
    fn copy_transitive_bytes_skips_entries_with_no_source_bytes() {
        let foo = ClassSymbol::new("pkg/Foo");
        let base = ClassSymbol::new("java/lang/Object");
        let mut map = HashMap::new();
        map.insert(foo.clone(), empty_class(foo.clone(), Some(class_ty("java/lang/Object"))));
        map.insert(base.clone(), empty_class(base.clone(), None));
        let env = MapEnv(map);

        struct NoBytes;
        impl ClasspathBytes for NoBytes {
            fn bytes(&self, _sym: &ClassSymbol) -> Option<Vec<u8>> {
                None
            }
        }

        let copied = copy_transitive_bytes(&[foo], &env, &NoBytes, "META-INF/nova-classpath/");
        assert!(copied.is_empty());
    }
}
