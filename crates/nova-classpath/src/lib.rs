//! A classpath reader: turns a set of directories and jars into a
//! [`nova_types::Env`] so the binder can resolve supertypes, field types,
//! and method signatures that live outside the sources being compiled.

mod entry;
mod error;
mod index;
mod translate;

pub use entry::ClasspathEntry;
pub use error::ClasspathError;
pub use index::ClasspathIndex;
