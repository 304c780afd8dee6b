//! Name resolution: chained scopes in the order the language requires.
//!
//! A [`Scope`] resolves the first segment of a dotted name to a root
//! symbol; resolving any remaining segments as nested classes is the
//! caller's job (it needs the member-env, which scopes don't have).

use indexmap::IndexMap;
use nova_types::ClassSymbol;

/// Result of resolving a single identifier against one scope layer.
#[derive(Debug, Clone)]
pub struct ScopeHit {
    pub symbol: ClassSymbol,
    /// Segments of the original query not yet accounted for by `symbol`,
    /// to be walked as nested-class lookups.
    pub remaining: Vec<String>,
}

pub trait Scope {
    fn resolve_simple(&self, name: &str) -> Option<ClassSymbol>;
}

/// A flat map from simple name to symbol, used for single-type imports,
/// same-compilation-unit top-level types, and same-package types.
#[derive(Debug, Default, Clone)]
pub struct MapScope(IndexMap<String, ClassSymbol>);

impl MapScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, symbol: ClassSymbol) {
        self.0.insert(name.into(), symbol);
    }
}

impl Scope for MapScope {
    fn resolve_simple(&self, name: &str) -> Option<ClassSymbol> {
        self.0.get(name).cloned()
    }
}

/// The resolution order from the language's scoping rules (type parameters
/// and member lookup happen in the binder stages that have access to a
/// class's own declarations; this layer handles the remaining five
/// compilation-unit-level phases).
#[derive(Default)]
pub struct CompilationUnitScope {
    pub single_type_imports: MapScope,
    pub same_compilation_unit: MapScope,
    pub same_package: MapScope,
    pub on_demand_imports: Vec<MapScope>,
    pub implicit_root_imports: MapScope,
}

impl CompilationUnitScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key`'s first segment through every phase in order,
    /// returning the resolved root symbol plus the unconsumed tail.
    ///
    /// A name found in an earlier phase always wins over a later one, even
    /// if the later phase would also match — ties are only an error within
    /// a single phase, which `MapScope` cannot represent (last insertion
    /// wins there by construction).
    pub fn resolve(&self, key: &[String]) -> Option<ScopeHit> {
        let head = key.first()?;
        let phases: [&MapScope; 3] = [
            &self.single_type_imports,
            &self.same_compilation_unit,
            &self.same_package,
        ];
        for phase in phases {
            if let Some(symbol) = phase.resolve_simple(head) {
                return Some(ScopeHit {
                    symbol,
                    remaining: key[1..].to_vec(),
                });
            }
        }
        for phase in &self.on_demand_imports {
            if let Some(symbol) = phase.resolve_simple(head) {
                return Some(ScopeHit {
                    symbol,
                    remaining: key[1..].to_vec(),
                });
            }
        }
        if let Some(symbol) = self.implicit_root_imports.resolve_simple(head) {
            return Some(ScopeHit {
                symbol,
                remaining: key[1..].to_vec(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_type_import_shadows_same_package_type() {
        let mut scope = CompilationUnitScope::new();
        scope
            .single_type_imports
            .insert("Foo", ClassSymbol::new("other/pkg/Foo"));
        scope
            .same_package
            .insert("Foo", ClassSymbol::new("this/pkg/Foo"));

        let hit = scope.resolve(&["Foo".to_string()]).unwrap();
        assert_eq!(hit.symbol.internal_name(), "other/pkg/Foo");
    }

    #[test]
    fn unresolved_head_returns_none() {
        let scope = CompilationUnitScope::new();
        assert!(scope.resolve(&["Missing".to_string()]).is_none());
    }

    #[test]
    fn remaining_segments_are_preserved_for_nested_class_lookup() {
        let mut scope = CompilationUnitScope::new();
        scope
            .same_compilation_unit
            .insert("Outer", ClassSymbol::new("p/Outer"));

        let hit = scope
            .resolve(&["Outer".to_string(), "Inner".to_string()])
            .unwrap();
        assert_eq!(hit.remaining, vec!["Inner".to_string()]);
    }
}
