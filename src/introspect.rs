//! The metadata queries resolution needs, abstracted over where they come
//! from.
//!
//! [`ClassIntrospector`] is implemented for a live VM by `&Jvmti` (tables stay
//! in VM memory and are released through [`crate::buffer`]) and for parsed
//! class files by [`crate::classfile::ClassFileIntrospector`].

use std::ops::Deref;

use crate::buffer::{JvmtiBuf, JvmtiLocalVariable, JvmtiString, LocalVariableTable};
use crate::error::IntrospectError;
use crate::jvmti_wrapper::Jvmti;
use crate::sys::jni::{jclass, jmethodID};

/// `ACC_BRIDGE` method modifier: a compiler-generated forwarding method.
pub const ACC_BRIDGE: i32 = 0x0040;

/// One line number table row. Layout-identical to `jvmtiLineNumberEntry`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineEntry {
    pub start_location: i64,
    pub line_number: i32,
}

impl LineEntry {
    pub const fn new(start_location: i64, line_number: i32) -> Self {
        Self { start_location, line_number }
    }
}

/// The parts of a local variable table row resolution looks at.
pub trait LocalVariable {
    /// Variable name as modified UTF-8 bytes.
    fn name(&self) -> &[u8];
    fn start_location(&self) -> i64;
    fn length(&self) -> i32;
}

/// An owned local variable table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariableEntry {
    pub name: String,
    pub signature: String,
    pub start_location: i64,
    pub length: i32,
    pub slot: i32,
}

impl LocalVariableEntry {
    pub fn new(name: impl Into<String>, start_location: i64, length: i32) -> Self {
        Self {
            name: name.into(),
            signature: String::new(),
            start_location,
            length,
            slot: 0,
        }
    }
}

impl LocalVariable for LocalVariableEntry {
    fn name(&self) -> &[u8] {
        self.name.as_bytes()
    }

    fn start_location(&self) -> i64 {
        self.start_location
    }

    fn length(&self) -> i32 {
        self.length
    }
}

/// Read-only access to the method metadata of loaded classes.
///
/// Returned tables are owned by the caller; whatever resources back them are
/// released when they drop.
pub trait ClassIntrospector {
    type Class: Copy;
    type Method: Copy;
    type Methods: Deref<Target = [Self::Method]>;
    type Text: AsRef<[u8]>;
    type Variable: LocalVariable;
    type Variables: Deref<Target = [Self::Variable]>;
    type Lines: Deref<Target = [LineEntry]>;

    /// Methods declared by `class`, in declaration order.
    fn class_methods(&self, class: Self::Class) -> Result<Self::Methods, IntrospectError>;

    fn method_modifiers(&self, method: Self::Method) -> Result<i32, IntrospectError>;

    fn method_name(&self, method: Self::Method) -> Result<Self::Text, IntrospectError>;

    fn local_variable_table(&self, method: Self::Method) -> Result<Self::Variables, IntrospectError>;

    fn line_number_table(&self, method: Self::Method) -> Result<Self::Lines, IntrospectError>;

    fn source_file_name(&self, class: Self::Class) -> Result<Self::Text, IntrospectError>;
}

impl<'a> ClassIntrospector for &'a Jvmti {
    type Class = jclass;
    type Method = jmethodID;
    type Methods = JvmtiBuf<jmethodID, &'a Jvmti>;
    type Text = JvmtiString<&'a Jvmti>;
    type Variable = JvmtiLocalVariable;
    type Variables = LocalVariableTable<&'a Jvmti>;
    type Lines = JvmtiBuf<LineEntry, &'a Jvmti>;

    fn class_methods(&self, class: jclass) -> Result<Self::Methods, IntrospectError> {
        self.get_class_methods(class)
            .map_err(|e| IntrospectError::from_jvmti("GetClassMethods", e))
    }

    fn method_modifiers(&self, method: jmethodID) -> Result<i32, IntrospectError> {
        self.get_method_modifiers(method)
            .map_err(|e| IntrospectError::from_jvmti("GetMethodModifiers", e))
    }

    fn method_name(&self, method: jmethodID) -> Result<Self::Text, IntrospectError> {
        self.get_method_name(method)
            .map_err(|e| IntrospectError::from_jvmti("GetMethodName", e))
    }

    fn local_variable_table(&self, method: jmethodID) -> Result<Self::Variables, IntrospectError> {
        self.get_local_variable_table(method)
            .map_err(|e| IntrospectError::from_jvmti("GetLocalVariableTable", e))
    }

    fn line_number_table(&self, method: jmethodID) -> Result<Self::Lines, IntrospectError> {
        self.get_line_number_table(method)
            .map_err(|e| IntrospectError::from_jvmti("GetLineNumberTable", e))
    }

    fn source_file_name(&self, class: jclass) -> Result<Self::Text, IntrospectError> {
        self.get_source_file_name(class)
            .map_err(|e| IntrospectError::from_jvmti("GetSourceFileName", e))
    }
}
