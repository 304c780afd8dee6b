//! The classpath `Env`: an eagerly-built map from every class reachable
//! from a set of [`ClasspathEntry`] values to its bound form, plus the
//! original bytes each one came from.

use std::collections::HashMap;

use nova_binder::ClasspathBytes;
use nova_types::{ClassSymbol, Env, TypeBoundClass};

use crate::entry::ClasspathEntry;
use crate::error::ClasspathError;
use crate::translate::bound_class_from_stub;

#[derive(Debug, Default)]
pub struct ClasspathIndex {
    classes: HashMap<ClassSymbol, TypeBoundClass>,
    bytes: HashMap<ClassSymbol, Vec<u8>>,
}

impl ClasspathIndex {
    pub fn build(entries: &[ClasspathEntry]) -> Result<Self, ClasspathError> {
        let mut classes = HashMap::new();
        let mut bytes = HashMap::new();

        for entry in entries {
            for (class_file, raw) in entry.read_classes()? {
                let symbol = ClassSymbol::new(class_file.this_class.as_str());
                // First entry on the classpath wins, matching how the JVM's
                // own classpath resolves duplicate types.
                if classes.contains_key(&symbol) {
                    continue;
                }

                let stub = class_file.stub()?;
                classes.insert(symbol.clone(), bound_class_from_stub(&stub));
                bytes.insert(symbol, raw);
            }
        }

        Ok(Self { classes, bytes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Every symbol this index has a bound class for, in no particular
    /// order. Used by a driver to seed implicit root imports (e.g. every
    /// class in `java/lang`) without walking the classpath a second time.
    pub fn class_symbols(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.keys()
    }
}

impl Env for ClasspathIndex {
    fn get(&self, sym: &ClassSymbol) -> Option<&TypeBoundClass> {
        self.classes.get(sym)
    }
}

impl ClasspathBytes for ClasspathIndex {
    fn bytes(&self, sym: &ClassSymbol) -> Option<Vec<u8>> {
        self.bytes.get(sym).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn empty_classpath_has_no_classes() {
        let index = ClasspathIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.get(&ClassSymbol::new("java/lang/Object")).is_none());
    }

    #[test]
    fn missing_jar_is_treated_as_empty_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("does-not-exist.jar");
        let index = ClasspathIndex::build(&[ClasspathEntry::Jar(missing)]).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn class_dir_entry_indexes_classfiles_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg_dir = tmp.path().join("pkg");
        std::fs::create_dir_all(&pkg_dir).unwrap();

        let bytes = build_trivial_class("pkg/Foo", "java/lang/Object");
        let mut file = std::fs::File::create(pkg_dir.join("Foo.class")).unwrap();
        file.write_all(&bytes).unwrap();

        let index =
            ClasspathIndex::build(&[ClasspathEntry::ClassDir(tmp.path().to_path_buf())]).unwrap();
        let sym = ClassSymbol::new("pkg/Foo");
        let class = index.get(&sym).expect("pkg/Foo indexed");
        assert_eq!(
            class.superclass.as_ref().unwrap().symbol().internal_name(),
            "java/lang/Object"
        );
        assert!(index.bytes(&sym).is_some());
    }

    /// Builds the bytes of a minimal, field-free, method-free class file
    /// naming `this_class`/`super_class`, using the real writer the
    /// lowerer uses, so this test never hand-encodes a constant pool.
    fn build_trivial_class(this_class: &str, super_class: &str) -> Vec<u8> {
        let file = nova_classfile::ClassFile {
            minor_version: 0,
            major_version: 61,
            access_flags: 0x0021,
            this_class: this_class.to_string(),
            super_class: Some(super_class.to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
        };
        file.write()
    }
}
