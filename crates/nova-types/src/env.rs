//! Lookup of bound classes by symbol.
//!
//! Binding proceeds against a layered environment: a mutable source `Env`
//! holding the classes currently being compiled, composed in front of a
//! lazily-decoded classpath `Env`. Once a class is looked up through a
//! `CompoundEnv` it is treated as immutable by every later stage, even
//! though the underlying source `Env` may still be gaining new entries for
//! *other* classes.

use crate::class::TypeBoundClass;
use crate::symbol::ClassSymbol;

/// A source of bound classes, keyed by [`ClassSymbol`].
pub trait Env {
    fn get(&self, sym: &ClassSymbol) -> Option<&TypeBoundClass>;
}

impl<E: Env + ?Sized> Env for &E {
    fn get(&self, sym: &ClassSymbol) -> Option<&TypeBoundClass> {
        (**self).get(sym)
    }
}

/// Looks a symbol up in each of `envs`, in order, returning the first hit.
///
/// Source environments are listed before classpath environments so that a
/// class being compiled always shadows a same-named class found on the
/// classpath.
pub struct CompoundEnv<'a> {
    envs: Vec<&'a dyn Env>,
}

impl<'a> CompoundEnv<'a> {
    pub fn new() -> Self {
        Self { envs: Vec::new() }
    }

    pub fn with(mut self, env: &'a dyn Env) -> Self {
        self.envs.push(env);
        self
    }
}

impl Default for CompoundEnv<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Env for CompoundEnv<'_> {
    fn get(&self, sym: &ClassSymbol) -> Option<&TypeBoundClass> {
        self.envs.iter().find_map(|env| env.get(sym))
    }
}
