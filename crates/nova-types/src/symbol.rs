//! Symbols: stable handles that name a declaration without owning its data.
//!
//! A symbol is cheap to copy and compare; looking up what it actually
//! denotes always goes through an [`crate::Env`]. This mirrors how the
//! binder keeps declarations mutable during binding while symbols
//! referencing them stay stable.

use nova_core::Name;
use std::fmt;

/// Names a class, interface, enum, record, or annotation type by its
/// internal (slash-separated, `$`-nested) binary name, e.g.
/// `com/example/Outer$Inner`.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ClassSymbol(Name);

impl ClassSymbol {
    pub fn new(internal_name: impl Into<Name>) -> Self {
        Self(internal_name.into())
    }

    pub fn internal_name(&self) -> &str {
        self.0.as_str()
    }

    /// The simple (unqualified, unnested) name, e.g. `Inner` for
    /// `com/example/Outer$Inner`.
    pub fn simple_name(&self) -> &str {
        let after_slash = self
            .0
            .as_str()
            .rsplit('/')
            .next()
            .unwrap_or(self.0.as_str());
        after_slash.rsplit('$').next().unwrap_or(after_slash)
    }

    /// The enclosing package, slash-separated, empty for the unnamed
    /// package.
    pub fn package(&self) -> &str {
        match self.0.as_str().rfind('/') {
            Some(idx) => &self.0.as_str()[..idx],
            None => "",
        }
    }
}

impl fmt::Debug for ClassSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassSymbol({})", self.0)
    }
}

impl fmt::Display for ClassSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Names a type parameter declared on a class or a method.
///
/// Two type variables with the same name but declared on different owners
/// are distinct symbols; `owner` plus `name` together are the identity.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TyVarSymbol {
    owner: TyVarOwner,
    name: Name,
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub enum TyVarOwner {
    Class(ClassSymbol),
    Method(MethodSymbol),
}

impl TyVarSymbol {
    pub fn new(owner: TyVarOwner, name: impl Into<Name>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &TyVarOwner {
        &self.owner
    }

    pub fn name(&self) -> &Name {
        &self.name
    }
}

impl fmt::Debug for TyVarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TyVarSymbol({})", self.name)
    }
}

/// Names a field declared on a class.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct FieldSymbol {
    pub owner: ClassSymbol,
    pub name: Name,
}

impl FieldSymbol {
    pub fn new(owner: ClassSymbol, name: impl Into<Name>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

impl fmt::Debug for FieldSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldSymbol({}.{})", self.owner, self.name)
    }
}

/// Names a method (or constructor, by the conventional name `<init>`)
/// declared on a class.
///
/// `descriptor` disambiguates overloads; it is the JVM method descriptor
/// (e.g. `(I)Ljava/lang/String;`), not the source-level signature.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct MethodSymbol {
    pub owner: ClassSymbol,
    pub name: Name,
    pub descriptor: Name,
}

impl MethodSymbol {
    pub fn new(owner: ClassSymbol, name: impl Into<Name>, descriptor: impl Into<Name>) -> Self {
        Self {
            owner,
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name.as_str() == "<init>"
    }
}

impl fmt::Debug for MethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MethodSymbol({}.{}{})",
            self.owner, self.name, self.descriptor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_package_and_outer_class() {
        let sym = ClassSymbol::new("com/example/Outer$Inner");
        assert_eq!(sym.simple_name(), "Inner");
        assert_eq!(sym.package(), "com/example");
    }

    #[test]
    fn unnamed_package_has_empty_package() {
        let sym = ClassSymbol::new("Top");
        assert_eq!(sym.package(), "");
        assert_eq!(sym.simple_name(), "Top");
    }

    #[test]
    fn constructor_method_symbol_is_recognized() {
        let owner = ClassSymbol::new("com/example/Foo");
        let ctor = MethodSymbol::new(owner, "<init>", "()V");
        assert!(ctor.is_constructor());
    }
}
