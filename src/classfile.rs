//! Resolution over `.class` files instead of a live VM.
//!
//! The parser reads only what resolution looks at: the constant pool, each
//! method's access flags, name, `LineNumberTable` and `LocalVariableTable`
//! (nested in `Code`), and the class's `SourceFile`. Everything else is
//! skipped by length.
//!
//! [`ClassFileIntrospector`] answers the same queries as a JVMTI environment,
//! including reporting missing debug attributes as absent information.

use crate::error::{ClassFileError, IntrospectError};
use crate::mutf8;
use crate::introspect::{ClassIntrospector, LineEntry, LocalVariableEntry};

const MAGIC: u32 = 0xCAFEBABE;

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name, e.g. `com/example/MainKt$onCreate$1`.
    pub this_class: String,
    pub methods: Vec<MethodInfo>,
    pub source_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    /// `None` when the method has no `Code` or no `LineNumberTable`.
    pub line_numbers: Option<Vec<LineEntry>>,
    /// `None` when the method has no `Code` or no `LocalVariableTable`.
    pub local_variables: Option<Vec<LocalVariableEntry>>,
}

// =============================================================================
// Constant pool
// =============================================================================

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class { name_index: u16 },
    /// Any entry resolution never dereferences.
    Other,
}

#[derive(Debug, Clone)]
struct ConstantPool {
    entries: Vec<Option<Constant>>,
}

impl ConstantPool {
    fn get(&self, index: u16) -> Result<&Constant, ClassFileError> {
        self.entries
            .get(index as usize)
            .and_then(|e| e.as_ref())
            .ok_or(ClassFileError::InvalidConstantPoolIndex(index))
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s.as_str()),
            _ => Err(ClassFileError::InvalidConstantPoolIndex(index)),
        }
    }

    fn class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassFileError::InvalidConstantPoolIndex(index)),
        }
    }
}

// =============================================================================
// Reader
// =============================================================================

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        if self.remaining() < len {
            return Err(ClassFileError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u1(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u2(&mut self) -> Result<u16, ClassFileError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassFileError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassFileError> {
        self.read_bytes(len).map(|_| ())
    }
}

// =============================================================================
// Parsing
// =============================================================================

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFileError> {
        let mut r = Reader::new(bytes);
        let magic = r.read_u4()?;
        if magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(magic));
        }

        let minor_version = r.read_u2()?;
        let major_version = r.read_u2()?;
        let cp = parse_constant_pool(&mut r)?;

        let access_flags = r.read_u2()?;
        let this_class = cp.class_name(r.read_u2()?)?.to_string();
        let _super_class = r.read_u2()?;

        let interfaces_count = r.read_u2()? as usize;
        r.skip(interfaces_count * 2)?;

        let fields_count = r.read_u2()?;
        for _ in 0..fields_count {
            r.skip(6)?; // access_flags, name_index, descriptor_index
            skip_attributes(&mut r)?;
        }

        let methods_count = r.read_u2()?;
        let mut methods = Vec::with_capacity(methods_count as usize);
        for _ in 0..methods_count {
            methods.push(parse_method(&mut r, &cp)?);
        }

        let mut source_file = None;
        for_each_attribute(&mut r, &cp, |name, sub| {
            if name == "SourceFile" {
                source_file = Some(cp.utf8(sub.read_u2()?)?.to_string());
            }
            Ok(())
        })?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            methods,
            source_file,
        })
    }
}

fn parse_constant_pool(r: &mut Reader) -> Result<ConstantPool, ClassFileError> {
    let count = r.read_u2()? as usize;
    let mut entries: Vec<Option<Constant>> = Vec::with_capacity(count);
    entries.push(None); // index 0 is unused

    while entries.len() < count {
        let tag = r.read_u1()?;
        let entry = match tag {
            1 => {
                let len = r.read_u2()? as usize;
                Constant::Utf8(mutf8::decode(r.read_bytes(len)?))
            }
            7 => Constant::Class { name_index: r.read_u2()? },
            // Long, Double: 8 bytes and two slots
            5 | 6 => {
                r.skip(8)?;
                entries.push(Some(Constant::Other));
                entries.push(None);
                continue;
            }
            3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                r.skip(4)?;
                Constant::Other
            }
            15 => {
                r.skip(3)?;
                Constant::Other
            }
            8 | 16 | 19 | 20 => {
                r.skip(2)?;
                Constant::Other
            }
            _ => return Err(ClassFileError::InvalidConstantPoolTag(tag)),
        };
        entries.push(Some(entry));
    }

    Ok(ConstantPool { entries })
}

/// Calls `f` with the name and a reader over the body of each attribute.
/// `f` need not consume the whole body.
fn for_each_attribute<F>(r: &mut Reader, cp: &ConstantPool, mut f: F) -> Result<(), ClassFileError>
where
    F: FnMut(&str, &mut Reader) -> Result<(), ClassFileError>,
{
    let count = r.read_u2()?;
    for _ in 0..count {
        let name_index = r.read_u2()?;
        let length = r.read_u4()? as usize;
        let name = cp.utf8(name_index)?;
        let mut sub = Reader::new(r.read_bytes(length)?);
        f(name, &mut sub).map_err(|err| match err {
            ClassFileError::UnexpectedEof => ClassFileError::InvalidAttribute(name.to_string()),
            other => other,
        })?;
    }
    Ok(())
}

fn skip_attributes(r: &mut Reader) -> Result<(), ClassFileError> {
    let count = r.read_u2()?;
    for _ in 0..count {
        r.skip(2)?;
        let length = r.read_u4()? as usize;
        r.skip(length)?;
    }
    Ok(())
}

fn parse_method(r: &mut Reader, cp: &ConstantPool) -> Result<MethodInfo, ClassFileError> {
    let access_flags = r.read_u2()?;
    let name = cp.utf8(r.read_u2()?)?.to_string();
    let descriptor = cp.utf8(r.read_u2()?)?.to_string();

    let mut line_numbers = None;
    let mut local_variables = None;
    for_each_attribute(r, cp, |attr, code| {
        if attr == "Code" {
            parse_code(code, cp, &mut line_numbers, &mut local_variables)?;
        }
        Ok(())
    })?;

    Ok(MethodInfo { access_flags, name, descriptor, line_numbers, local_variables })
}

/// A `Code` attribute may carry several line and variable tables; their rows
/// are concatenated in order.
fn parse_code(
    r: &mut Reader,
    cp: &ConstantPool,
    line_numbers: &mut Option<Vec<LineEntry>>,
    local_variables: &mut Option<Vec<LocalVariableEntry>>,
) -> Result<(), ClassFileError> {
    r.skip(4)?; // max_stack, max_locals
    let code_length = r.read_u4()? as usize;
    r.skip(code_length)?;
    let exception_table_length = r.read_u2()? as usize;
    r.skip(exception_table_length * 8)?;

    for_each_attribute(r, cp, |name, sub| {
        match name {
            "LineNumberTable" => {
                let n = sub.read_u2()?;
                let rows = line_numbers.get_or_insert_with(Vec::new);
                for _ in 0..n {
                    let start_pc = sub.read_u2()?;
                    let line = sub.read_u2()?;
                    rows.push(LineEntry::new(i64::from(start_pc), i32::from(line)));
                }
            }
            "LocalVariableTable" => {
                let n = sub.read_u2()?;
                let rows = local_variables.get_or_insert_with(Vec::new);
                for _ in 0..n {
                    let start_pc = sub.read_u2()?;
                    let length = sub.read_u2()?;
                    let name = cp.utf8(sub.read_u2()?)?.to_string();
                    let signature = cp.utf8(sub.read_u2()?)?.to_string();
                    let slot = sub.read_u2()?;
                    rows.push(LocalVariableEntry {
                        name,
                        signature,
                        start_location: i64::from(start_pc),
                        length: i32::from(length),
                        slot: i32::from(slot),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    })
}

// =============================================================================
// Introspection
// =============================================================================

/// Handle to a class added to a [`ClassFileIntrospector`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

/// Handle to one method of a class, by declaration index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class: ClassId,
    pub index: usize,
}

/// A set of parsed classes queried like a VM.
#[derive(Debug, Default, Clone)]
pub struct ClassFileIntrospector {
    classes: Vec<ClassFile>,
}

impl ClassFileIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bytes: &[u8]) -> Result<ClassId, ClassFileError> {
        Ok(self.insert(ClassFile::parse(bytes)?))
    }

    pub fn insert(&mut self, class: ClassFile) -> ClassId {
        self.classes.push(class);
        ClassId(self.classes.len() - 1)
    }

    /// Look a class up by internal name (`a/b/C`) or binary name (`a.b.C`).
    pub fn find(&self, name: &str) -> Option<ClassId> {
        let internal = name.replace('.', "/");
        self.classes.iter().position(|c| c.this_class == internal).map(ClassId)
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassFile> {
        self.classes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn lookup_class(&self, id: ClassId, call: &'static str) -> Result<&ClassFile, IntrospectError> {
        self.class(id).ok_or(IntrospectError::InvalidHandle { call })
    }

    fn lookup_method(&self, m: MethodRef, call: &'static str) -> Result<&MethodInfo, IntrospectError> {
        self.lookup_class(m.class, call)?
            .methods
            .get(m.index)
            .ok_or(IntrospectError::InvalidHandle { call })
    }
}

impl<'a> ClassIntrospector for &'a ClassFileIntrospector {
    type Class = ClassId;
    type Method = MethodRef;
    type Methods = Vec<MethodRef>;
    type Text = &'a str;
    type Variable = LocalVariableEntry;
    type Variables = &'a [LocalVariableEntry];
    type Lines = &'a [LineEntry];

    fn class_methods(&self, class: ClassId) -> Result<Vec<MethodRef>, IntrospectError> {
        let count = self.lookup_class(class, "GetClassMethods")?.methods.len();
        Ok((0..count).map(|index| MethodRef { class, index }).collect())
    }

    fn method_modifiers(&self, method: MethodRef) -> Result<i32, IntrospectError> {
        Ok(i32::from(self.lookup_method(method, "GetMethodModifiers")?.access_flags))
    }

    fn method_name(&self, method: MethodRef) -> Result<&'a str, IntrospectError> {
        Ok(self.lookup_method(method, "GetMethodName")?.name.as_str())
    }

    fn local_variable_table(&self, method: MethodRef) -> Result<&'a [LocalVariableEntry], IntrospectError> {
        const CALL: &str = "GetLocalVariableTable";
        self.lookup_method(method, CALL)?
            .local_variables
            .as_deref()
            .ok_or(IntrospectError::AbsentInformation { call: CALL })
    }

    fn line_number_table(&self, method: MethodRef) -> Result<&'a [LineEntry], IntrospectError> {
        const CALL: &str = "GetLineNumberTable";
        self.lookup_method(method, CALL)?
            .line_numbers
            .as_deref()
            .ok_or(IntrospectError::AbsentInformation { call: CALL })
    }

    fn source_file_name(&self, class: ClassId) -> Result<&'a str, IntrospectError> {
        const CALL: &str = "GetSourceFileName";
        self.lookup_class(class, CALL)?
            .source_file
            .as_deref()
            .ok_or(IntrospectError::AbsentInformation { call: CALL })
    }
}
