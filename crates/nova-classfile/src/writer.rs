//! Serializes a [`ClassFile`] back into the binary class-file format.
//!
//! The header compiler never needs method bodies, so this writer only
//! ever emits the attributes a stub class carries: `ConstantValue`,
//! `Signature`, `RuntimeVisible(Invisible)Annotations`, and `InnerClasses`.
//! Code attributes are out of scope; a [`ClassMember`] has no body to
//! lower. [`crate::module_info::write_module_info_class`] builds the
//! separate `Module` attribute a `module-info.class` carries.

use crate::annotation::{Annotation, ConstValue, ElementValue};
use crate::classfile::{ClassFile, ClassMember, InnerClassInfo};
use crate::constant_pool::CpInfo;

/// Builds a constant pool while writing, deduplicating entries by their
/// tag and payload so identical `Utf8`/`Class`/literal constants are only
/// stored once.
#[derive(Default)]
pub struct ConstantPoolBuilder {
    entries: Vec<CpInfo>,
    utf8_index: std::collections::HashMap<String, u16>,
    class_index: std::collections::HashMap<String, u16>,
    integer_index: std::collections::HashMap<i32, u16>,
    long_index: std::collections::HashMap<i64, u16>,
    float_index: std::collections::HashMap<u32, u16>,
    double_index: std::collections::HashMap<u64, u16>,
    string_index: std::collections::HashMap<String, u16>,
    module_index: std::collections::HashMap<String, u16>,
    package_index: std::collections::HashMap<String, u16>,
}

impl ConstantPoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, info: CpInfo) -> u16 {
        // Constant pool indices are 1-based; index 0 is reserved.
        self.entries.push(info);
        self.entries.len() as u16
    }

    pub fn add_utf8(&mut self, value: &str) -> u16 {
        if let Some(&idx) = self.utf8_index.get(value) {
            return idx;
        }
        let idx = self.push(CpInfo::Utf8(value.to_string()));
        self.utf8_index.insert(value.to_string(), idx);
        idx
    }

    pub fn add_class(&mut self, internal_name: &str) -> u16 {
        if let Some(&idx) = self.class_index.get(internal_name) {
            return idx;
        }
        let name_index = self.add_utf8(internal_name);
        let idx = self.push(CpInfo::Class { name_index });
        self.class_index.insert(internal_name.to_string(), idx);
        idx
    }

    pub fn add_integer(&mut self, value: i32) -> u16 {
        if let Some(&idx) = self.integer_index.get(&value) {
            return idx;
        }
        let idx = self.push(CpInfo::Integer(value));
        self.integer_index.insert(value, idx);
        idx
    }

    pub fn add_long(&mut self, value: i64) -> u16 {
        if let Some(&idx) = self.long_index.get(&value) {
            return idx;
        }
        let idx = self.push(CpInfo::Long(value));
        // Long/Double occupy two constant pool slots.
        self.push_placeholder();
        self.long_index.insert(value, idx);
        idx
    }

    pub fn add_float(&mut self, value: f32) -> u16 {
        let bits = value.to_bits();
        if let Some(&idx) = self.float_index.get(&bits) {
            return idx;
        }
        let idx = self.push(CpInfo::Float(value));
        self.float_index.insert(bits, idx);
        idx
    }

    pub fn add_double(&mut self, value: f64) -> u16 {
        let bits = value.to_bits();
        if let Some(&idx) = self.double_index.get(&bits) {
            return idx;
        }
        let idx = self.push(CpInfo::Double(value));
        self.push_placeholder();
        self.double_index.insert(bits, idx);
        idx
    }

    pub fn add_string(&mut self, value: &str) -> u16 {
        if let Some(&idx) = self.string_index.get(value) {
            return idx;
        }
        let string_index = self.add_utf8(value);
        let idx = self.push(CpInfo::String { string_index });
        self.string_index.insert(value.to_string(), idx);
        idx
    }

    pub fn add_module(&mut self, name: &str) -> u16 {
        if let Some(&idx) = self.module_index.get(name) {
            return idx;
        }
        let name_index = self.add_utf8(name);
        let idx = self.push(CpInfo::Module { name_index });
        self.module_index.insert(name.to_string(), idx);
        idx
    }

    pub fn add_package(&mut self, internal_name: &str) -> u16 {
        if let Some(&idx) = self.package_index.get(internal_name) {
            return idx;
        }
        let name_index = self.add_utf8(internal_name);
        let idx = self.push(CpInfo::Package { name_index });
        self.package_index.insert(internal_name.to_string(), idx);
        idx
    }

    /// Reserves the second slot a `Long`/`Double` entry occupies. The slot
    /// itself is never addressed, so its payload doesn't matter.
    fn push_placeholder(&mut self) {
        self.entries.push(CpInfo::Integer(0));
    }

    /// Entry count as written into `constant_pool_count`, which is one
    /// greater than the number of entries (slot 0 is reserved).
    fn count(&self) -> u16 {
        self.entries.len() as u16 + 1
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.count().to_be_bytes());
        for entry in &self.entries {
            write_cp_info(entry, out);
        }
    }
}

fn write_cp_info(info: &CpInfo, out: &mut Vec<u8>) {
    match info {
        CpInfo::Utf8(s) => {
            out.push(1);
            let bytes = encode_modified_utf8(s);
            out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            out.extend_from_slice(&bytes);
        }
        CpInfo::Integer(v) => {
            out.push(3);
            out.extend_from_slice(&v.to_be_bytes());
        }
        CpInfo::Float(v) => {
            out.push(4);
            out.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        CpInfo::Long(v) => {
            out.push(5);
            out.extend_from_slice(&v.to_be_bytes());
        }
        CpInfo::Double(v) => {
            out.push(6);
            out.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        CpInfo::Class { name_index } => {
            out.push(7);
            out.extend_from_slice(&name_index.to_be_bytes());
        }
        CpInfo::String { string_index } => {
            out.push(8);
            out.extend_from_slice(&string_index.to_be_bytes());
        }
        CpInfo::Module { name_index } => {
            out.push(19);
            out.extend_from_slice(&name_index.to_be_bytes());
        }
        CpInfo::Package { name_index } => {
            out.push(20);
            out.extend_from_slice(&name_index.to_be_bytes());
        }
        // The header writer never emits refs, handles, or dynamic constants;
        // no header attribute needs them.
        _ => unreachable!("constant pool entry kind not used by the header writer"),
    }
}

fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        if unit == 0 {
            out.extend_from_slice(&[0xC0, 0x80]);
        } else if unit <= 0x7F {
            out.push(unit as u8);
        } else if unit <= 0x7FF {
            out.push(0xC0 | ((unit >> 6) as u8));
            out.push(0x80 | ((unit & 0x3F) as u8));
        } else {
            out.push(0xE0 | ((unit >> 12) as u8));
            out.push(0x80 | (((unit >> 6) & 0x3F) as u8));
            out.push(0x80 | ((unit & 0x3F) as u8));
        }
    }
    out
}

pub(crate) struct Attribute {
    pub(crate) name: &'static str,
    pub(crate) body: Vec<u8>,
}

pub(crate) fn write_attribute(cp: &mut ConstantPoolBuilder, attr: &Attribute, out: &mut Vec<u8>) {
    let name_index = cp.add_utf8(attr.name);
    out.extend_from_slice(&name_index.to_be_bytes());
    out.extend_from_slice(&(attr.body.len() as u32).to_be_bytes());
    out.extend_from_slice(&attr.body);
}

fn signature_attribute(cp: &mut ConstantPoolBuilder, signature: &str) -> Attribute {
    let mut body = Vec::new();
    let idx = cp.add_utf8(signature);
    body.extend_from_slice(&idx.to_be_bytes());
    Attribute {
        name: "Signature",
        body,
    }
}

fn constant_value_attribute(cp: &mut ConstantPoolBuilder, value: &ConstValue) -> Attribute {
    let mut body = Vec::new();
    let idx = match value {
        ConstValue::Boolean(v) => cp.add_integer(*v as i32),
        ConstValue::Byte(v) => cp.add_integer(*v as i32),
        ConstValue::Char(v) => cp.add_integer(*v as i32),
        ConstValue::Short(v) => cp.add_integer(*v as i32),
        ConstValue::Int(v) => cp.add_integer(*v),
        ConstValue::Long(v) => cp.add_long(*v),
        ConstValue::Float(v) => cp.add_float(*v),
        ConstValue::Double(v) => cp.add_double(*v),
        // Unlike an annotation element value's `'s'` tag, which points
        // straight at a `Utf8` entry, a field's `ConstantValue` string
        // must go through a `CONSTANT_String` entry.
        ConstValue::String(v) => cp.add_string(v),
    };
    body.extend_from_slice(&idx.to_be_bytes());
    Attribute {
        name: "ConstantValue",
        body,
    }
}

fn annotations_attribute(
    cp: &mut ConstantPoolBuilder,
    name: &'static str,
    annotations: &[Annotation],
) -> Attribute {
    let mut body = Vec::new();
    body.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
    for anno in annotations {
        write_annotation(cp, anno, &mut body);
    }
    Attribute { name, body }
}

fn write_annotation(cp: &mut ConstantPoolBuilder, anno: &Annotation, out: &mut Vec<u8>) {
    let type_index = cp.add_utf8(&anno.type_descriptor);
    out.extend_from_slice(&type_index.to_be_bytes());
    out.extend_from_slice(&(anno.elements.len() as u16).to_be_bytes());
    for (name, value) in &anno.elements {
        let name_index = cp.add_utf8(name);
        out.extend_from_slice(&name_index.to_be_bytes());
        write_element_value(cp, value, out);
    }
}

fn write_element_value(cp: &mut ConstantPoolBuilder, value: &ElementValue, out: &mut Vec<u8>) {
    match value {
        ElementValue::Const(ConstValue::Byte(v)) => {
            out.push(b'B');
            out.extend_from_slice(&cp.add_integer(*v as i32).to_be_bytes());
        }
        ElementValue::Const(ConstValue::Char(v)) => {
            out.push(b'C');
            out.extend_from_slice(&cp.add_integer(*v as i32).to_be_bytes());
        }
        ElementValue::Const(ConstValue::Short(v)) => {
            out.push(b'S');
            out.extend_from_slice(&cp.add_integer(*v as i32).to_be_bytes());
        }
        ElementValue::Const(ConstValue::Int(v)) => {
            out.push(b'I');
            out.extend_from_slice(&cp.add_integer(*v).to_be_bytes());
        }
        ElementValue::Const(ConstValue::Boolean(v)) => {
            out.push(b'Z');
            out.extend_from_slice(&cp.add_integer(*v as i32).to_be_bytes());
        }
        ElementValue::Const(ConstValue::Long(v)) => {
            out.push(b'J');
            out.extend_from_slice(&cp.add_long(*v).to_be_bytes());
        }
        ElementValue::Const(ConstValue::Float(v)) => {
            out.push(b'F');
            out.extend_from_slice(&cp.add_float(*v).to_be_bytes());
        }
        ElementValue::Const(ConstValue::Double(v)) => {
            out.push(b'D');
            out.extend_from_slice(&cp.add_double(*v).to_be_bytes());
        }
        ElementValue::Const(ConstValue::String(v)) => {
            out.push(b's');
            out.extend_from_slice(&cp.add_utf8(v).to_be_bytes());
        }
        ElementValue::Enum {
            type_descriptor,
            const_name,
        } => {
            out.push(b'e');
            out.extend_from_slice(&cp.add_utf8(type_descriptor).to_be_bytes());
            out.extend_from_slice(&cp.add_utf8(const_name).to_be_bytes());
        }
        ElementValue::Class(descriptor) => {
            out.push(b'c');
            out.extend_from_slice(&cp.add_utf8(descriptor).to_be_bytes());
        }
        ElementValue::Annotation(nested) => {
            out.push(b'@');
            write_annotation(cp, nested, out);
        }
        ElementValue::Array(values) => {
            out.push(b'[');
            out.extend_from_slice(&(values.len() as u16).to_be_bytes());
            for v in values {
                write_element_value(cp, v, out);
            }
        }
    }
}

fn inner_classes_attribute(cp: &mut ConstantPoolBuilder, inner_classes: &[InnerClassInfo]) -> Attribute {
    let mut body = Vec::new();
    body.extend_from_slice(&(inner_classes.len() as u16).to_be_bytes());
    for info in inner_classes {
        let inner_class_index = cp.add_class(&info.inner_class);
        let outer_class_index = info
            .outer_class
            .as_deref()
            .map(|name| cp.add_class(name))
            .unwrap_or(0);
        let inner_name_index = info
            .inner_name
            .as_deref()
            .map(|name| cp.add_utf8(name))
            .unwrap_or(0);

        body.extend_from_slice(&inner_class_index.to_be_bytes());
        body.extend_from_slice(&outer_class_index.to_be_bytes());
        body.extend_from_slice(&inner_name_index.to_be_bytes());
        body.extend_from_slice(&info.access_flags.to_be_bytes());
    }
    Attribute {
        name: "InnerClasses",
        body,
    }
}

fn member_attributes(cp: &mut ConstantPoolBuilder, member: &ClassMember) -> Vec<Attribute> {
    let mut attrs = Vec::new();
    if let Some(value) = &member.const_value {
        attrs.push(constant_value_attribute(cp, value));
    }
    if let Some(sig) = &member.signature {
        attrs.push(signature_attribute(cp, sig));
    }
    if !member.runtime_visible_annotations.is_empty() {
        attrs.push(annotations_attribute(
            cp,
            "RuntimeVisibleAnnotations",
            &member.runtime_visible_annotations,
        ));
    }
    if !member.runtime_invisible_annotations.is_empty() {
        attrs.push(annotations_attribute(
            cp,
            "RuntimeInvisibleAnnotations",
            &member.runtime_invisible_annotations,
        ));
    }
    attrs
}

fn write_member(cp: &mut ConstantPoolBuilder, member: &ClassMember, out: &mut Vec<u8>) {
    out.extend_from_slice(&member.access_flags.to_be_bytes());
    out.extend_from_slice(&cp.add_utf8(&member.name).to_be_bytes());
    out.extend_from_slice(&cp.add_utf8(&member.descriptor).to_be_bytes());

    let attrs = member_attributes(cp, member);
    out.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
    for attr in &attrs {
        write_attribute(cp, attr, out);
    }
}

impl ClassFile {
    /// Serialize this class file to its binary `.class` representation.
    pub fn write(&self) -> Vec<u8> {
        let mut cp = ConstantPoolBuilder::new();

        let this_class_index = cp.add_class(&self.this_class);
        let super_class_index = self
            .super_class
            .as_deref()
            .map(|name| cp.add_class(name))
            .unwrap_or(0);
        let interface_indices: Vec<u16> =
            self.interfaces.iter().map(|name| cp.add_class(name)).collect();

        let mut fields = Vec::new();
        for field in &self.fields {
            write_member(&mut cp, field, &mut fields);
        }

        let mut methods = Vec::new();
        for method in &self.methods {
            write_member(&mut cp, method, &mut methods);
        }

        let mut class_attrs = Vec::new();
        if let Some(sig) = &self.signature {
            class_attrs.push(signature_attribute(&mut cp, sig));
        }
        if !self.runtime_visible_annotations.is_empty() {
            class_attrs.push(annotations_attribute(
                &mut cp,
                "RuntimeVisibleAnnotations",
                &self.runtime_visible_annotations,
            ));
        }
        if !self.runtime_invisible_annotations.is_empty() {
            class_attrs.push(annotations_attribute(
                &mut cp,
                "RuntimeInvisibleAnnotations",
                &self.runtime_invisible_annotations,
            ));
        }
        if !self.inner_classes.is_empty() {
            class_attrs.push(inner_classes_attribute(&mut cp, &self.inner_classes));
        }

        let mut class_attr_bytes = Vec::new();
        for attr in &class_attrs {
            write_attribute(&mut cp, attr, &mut class_attr_bytes);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&self.minor_version.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        cp.write(&mut out);
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&this_class_index.to_be_bytes());
        out.extend_from_slice(&super_class_index.to_be_bytes());

        out.extend_from_slice(&(interface_indices.len() as u16).to_be_bytes());
        for idx in &interface_indices {
            out.extend_from_slice(&idx.to_be_bytes());
        }

        out.extend_from_slice(&(self.fields.len() as u16).to_be_bytes());
        out.extend_from_slice(&fields);

        out.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        out.extend_from_slice(&methods);

        out.extend_from_slice(&(class_attrs.len() as u16).to_be_bytes());
        out.extend_from_slice(&class_attr_bytes);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_class() -> ClassFile {
        ClassFile {
            minor_version: 0,
            major_version: 61,
            access_flags: 0x0021,
            this_class: "com/example/Foo".to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    #[test]
    fn roundtrips_minimal_class() {
        let class = minimal_class();
        let bytes = class.write();
        let parsed = ClassFile::parse(&bytes).unwrap();
        assert_eq!(parsed.this_class, "com/example/Foo");
        assert_eq!(parsed.super_class.as_deref(), Some("java/lang/Object"));
        assert_eq!(parsed.access_flags, 0x0021);
    }

    #[test]
    fn roundtrips_class_with_signature_and_fields() {
        let mut class = minimal_class();
        class.signature = Some("<T:Ljava/lang/Object;>Ljava/lang/Object;".to_string());
        class.fields.push(ClassMember {
            access_flags: 0x0002,
            name: "value".to_string(),
            descriptor: "Ljava/lang/Object;".to_string(),
            signature: Some("TT;".to_string()),
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            const_value: None,
        });

        let bytes = class.write();
        let parsed = ClassFile::parse(&bytes).unwrap();
        assert_eq!(
            parsed.signature.as_deref(),
            Some("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        );
        assert_eq!(parsed.fields.len(), 1);
        assert_eq!(parsed.fields[0].signature.as_deref(), Some("TT;"));
    }

    #[test]
    fn deduplicates_repeated_utf8_constants() {
        let mut class = minimal_class();
        for name in ["a", "b"] {
            class.fields.push(ClassMember {
                access_flags: 0x0001,
                name: name.to_string(),
                descriptor: "I".to_string(),
                signature: None,
                runtime_visible_annotations: Vec::new(),
                runtime_invisible_annotations: Vec::new(),
                const_value: None,
            });
        }
        let bytes = class.write();
        let parsed = ClassFile::parse(&bytes).unwrap();
        assert_eq!(parsed.fields.len(), 2);
    }

    #[test]
    fn roundtrips_constant_value_for_int_and_string_fields() {
        let mut class = minimal_class();
        class.fields.push(ClassMember {
            access_flags: 0x0019,
            name: "MAX".to_string(),
            descriptor: "I".to_string(),
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            const_value: Some(ConstValue::Int(42)),
        });
        class.fields.push(ClassMember {
            access_flags: 0x0019,
            name: "NAME".to_string(),
            descriptor: "Ljava/lang/String;".to_string(),
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            const_value: Some(ConstValue::String("hello".to_string())),
        });

        let bytes = class.write();
        let parsed = ClassFile::parse(&bytes).unwrap();
        assert_eq!(parsed.fields[0].const_value, Some(ConstValue::Int(42)));
        assert_eq!(
            parsed.fields[1].const_value,
            Some(ConstValue::String("hello".to_string()))
        );
    }

    #[test]
    fn roundtrips_inner_class_and_annotation() {
        let mut class = minimal_class();
        class.inner_classes.push(InnerClassInfo {
            inner_class: "com/example/Foo$Inner".to_string(),
            outer_class: Some("com/example/Foo".to_string()),
            inner_name: Some("Inner".to_string()),
            access_flags: 0x0009,
        });
        class.runtime_visible_annotations.push(Annotation {
            type_descriptor: "Ljava/lang/Deprecated;".to_string(),
            type_internal_name: Some("java/lang/Deprecated".to_string()),
            elements: Vec::new(),
        });

        let bytes = class.write();
        let parsed = ClassFile::parse(&bytes).unwrap();
        assert_eq!(parsed.inner_classes.len(), 1);
        assert_eq!(parsed.inner_classes[0].inner_name.as_deref(), Some("Inner"));
        assert_eq!(parsed.runtime_visible_annotations.len(), 1);
    }
}
