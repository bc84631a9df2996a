// lambda-location/src/sys/jvmti.rs
//
// JVMTI (JVM Tool Interface) bindings for the calls this library makes.
//
// The JVMTI interface has been stable since JDK 1.5 and newer JDKs only add
// functions at the END of the vtable, so a table declared up to slot 142 is
// valid on every VM we load into. Slot numbers below are the 1-based numbers
// from jvmti.h; unused slots are opaque padding.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::fmt;
use std::os::raw::{c_char, c_uchar, c_void};

use crate::sys::jni::{jclass, jint, jlong, jmethodID};

// --- Constants ---
pub const JVMTI_VERSION_1_0: jint = 0x30010000;
pub const JVMTI_VERSION_1_2: jint = 0x30010200;

// --- Error Codes ---

/// JVMTI status code.
///
/// A newtype rather than an enum: the VM may hand back any code, including
/// ones newer than the constants listed here.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct jvmtiError(pub u32);

impl jvmtiError {
    pub const NONE: Self = Self(0);
    pub const INVALID_THREAD: Self = Self(10);
    pub const INVALID_CLASS: Self = Self(21);
    pub const INVALID_METHODID: Self = Self(23);
    pub const NOT_AVAILABLE: Self = Self(98);
    pub const MUST_POSSESS_CAPABILITY: Self = Self(99);
    pub const NULL_POINTER: Self = Self(100);
    pub const ABSENT_INFORMATION: Self = Self(101);
    pub const NATIVE_METHOD: Self = Self(104);
    pub const CLASS_LOADER_UNSUPPORTED: Self = Self(106);
    pub const OUT_OF_MEMORY: Self = Self(110);
    pub const ACCESS_DENIED: Self = Self(111);
    pub const WRONG_PHASE: Self = Self(112);
    pub const INTERNAL: Self = Self(113);
    pub const UNATTACHED_THREAD: Self = Self(115);
    pub const INVALID_ENVIRONMENT: Self = Self(116);

    /// Standard symbolic name, if this is a code jvmti.h defines here.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::NONE => "JVMTI_ERROR_NONE",
            Self::INVALID_THREAD => "JVMTI_ERROR_INVALID_THREAD",
            Self::INVALID_CLASS => "JVMTI_ERROR_INVALID_CLASS",
            Self::INVALID_METHODID => "JVMTI_ERROR_INVALID_METHODID",
            Self::NOT_AVAILABLE => "JVMTI_ERROR_NOT_AVAILABLE",
            Self::MUST_POSSESS_CAPABILITY => "JVMTI_ERROR_MUST_POSSESS_CAPABILITY",
            Self::NULL_POINTER => "JVMTI_ERROR_NULL_POINTER",
            Self::ABSENT_INFORMATION => "JVMTI_ERROR_ABSENT_INFORMATION",
            Self::NATIVE_METHOD => "JVMTI_ERROR_NATIVE_METHOD",
            Self::CLASS_LOADER_UNSUPPORTED => "JVMTI_ERROR_CLASS_LOADER_UNSUPPORTED",
            Self::OUT_OF_MEMORY => "JVMTI_ERROR_OUT_OF_MEMORY",
            Self::ACCESS_DENIED => "JVMTI_ERROR_ACCESS_DENIED",
            Self::WRONG_PHASE => "JVMTI_ERROR_WRONG_PHASE",
            Self::INTERNAL => "JVMTI_ERROR_INTERNAL",
            Self::UNATTACHED_THREAD => "JVMTI_ERROR_UNATTACHED_THREAD",
            Self::INVALID_ENVIRONMENT => "JVMTI_ERROR_INVALID_ENVIRONMENT",
            _ => return None,
        })
    }
}

impl fmt::Display for jvmtiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "JVMTI error {}", self.0),
        }
    }
}

pub type jlocation = jlong;

#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct jvmtiLineNumberEntry {
    pub start_location: jlocation,
    pub line_number: jint,
}

/// One row of a local variable table.
///
/// `name`, `signature` and `generic_signature` are separate JVMTI allocations
/// and must each be deallocated along with the table itself.
#[repr(C)]
#[derive(Debug)]
pub struct jvmtiLocalVariableEntry {
    pub start_location: jlocation,
    pub length: jint,
    pub name: *mut c_char,
    pub signature: *mut c_char,
    pub generic_signature: *mut c_char,
    pub slot: jint,
}

// --- Capabilities ---
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct jvmtiCapabilities {
    bits: [u32; 4],
}

impl Default for jvmtiCapabilities {
    fn default() -> Self { Self { bits: [0; 4] } }
}

impl jvmtiCapabilities {
    fn set_bit(&mut self, bit_offset: usize, value: bool) {
        let word_index = bit_offset / 32;
        let bit_index = bit_offset % 32;
        if value {
            self.bits[word_index] |= 1 << bit_index;
        } else {
            self.bits[word_index] &= !(1 << bit_index);
        }
    }

    fn get_bit(&self, bit_offset: usize) -> bool {
        let word_index = bit_offset / 32;
        let bit_index = bit_offset % 32;
        (self.bits[word_index] & (1 << bit_index)) != 0
    }

    // [11]
    pub fn set_can_get_source_file_name(&mut self, v: bool) { self.set_bit(11, v); }
    pub fn can_get_source_file_name(&self) -> bool { self.get_bit(11) }

    // [12]
    pub fn set_can_get_line_numbers(&mut self, v: bool) { self.set_bit(12, v); }
    pub fn can_get_line_numbers(&self) -> bool { self.get_bit(12) }

    // [14]
    pub fn set_can_access_local_variables(&mut self, v: bool) { self.set_bit(14, v); }
    pub fn can_access_local_variables(&self) -> bool { self.get_bit(14) }
}

// --- Function Pointer Types ---
pub type JvmtiDeallocateFn = unsafe extern "system" fn(env: *mut jvmtiEnv, mem: *mut c_uchar) -> jvmtiError;
pub type JvmtiGetSourceFileNameFn = unsafe extern "system" fn(env: *mut jvmtiEnv, klass: jclass, source_name_ptr: *mut *mut c_char) -> jvmtiError;
pub type JvmtiGetClassMethodsFn = unsafe extern "system" fn(env: *mut jvmtiEnv, klass: jclass, method_count_ptr: *mut jint, methods_ptr: *mut *mut jmethodID) -> jvmtiError;
pub type JvmtiGetMethodNameFn = unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, name_ptr: *mut *mut c_char, signature_ptr: *mut *mut c_char, generic_ptr: *mut *mut c_char) -> jvmtiError;
pub type JvmtiGetMethodModifiersFn = unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, modifiers_ptr: *mut jint) -> jvmtiError;
pub type JvmtiGetLineNumberTableFn = unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, entry_count_ptr: *mut jint, table_ptr: *mut *mut jvmtiLineNumberEntry) -> jvmtiError;
pub type JvmtiGetLocalVariableTableFn = unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, entry_count_ptr: *mut jint, table_ptr: *mut *mut jvmtiLocalVariableEntry) -> jvmtiError;
pub type JvmtiGetCapabilitiesFn = unsafe extern "system" fn(env: *mut jvmtiEnv, capabilities_ptr: *mut jvmtiCapabilities) -> jvmtiError;
pub type JvmtiGetErrorNameFn = unsafe extern "system" fn(env: *mut jvmtiEnv, error: jvmtiError, name_ptr: *mut *mut c_char) -> jvmtiError;
pub type JvmtiGetPotentialCapabilitiesFn = unsafe extern "system" fn(env: *mut jvmtiEnv, capabilities_ptr: *mut jvmtiCapabilities) -> jvmtiError;
pub type JvmtiAddCapabilitiesFn = unsafe extern "system" fn(env: *mut jvmtiEnv, capabilities_ptr: *const jvmtiCapabilities) -> jvmtiError;

type Slot = *mut c_void;

#[repr(C)]
pub struct jvmtiInterface_1_ {
    /*   1-46: events, threads, monitors, frames, heap, Allocate */
    _slot1: [Slot; 46],
    /*   47: Deallocate */
    pub Deallocate: Option<JvmtiDeallocateFn>,
    /*   48-49: Get Class Signature, Get Class Status */
    _slot48: [Slot; 2],
    /*   50: Get Source File Name */
    pub GetSourceFileName: Option<JvmtiGetSourceFileNameFn>,
    /*   51: Get Class Modifiers */
    _slot51: [Slot; 1],
    /*   52: Get Class Methods */
    pub GetClassMethods: Option<JvmtiGetClassMethodsFn>,
    /*   53-63: fields, interfaces, class loader, field info */
    _slot53: [Slot; 11],
    /*   64: Get Method Name (and Signature) */
    pub GetMethodName: Option<JvmtiGetMethodNameFn>,
    /*   65: Get Method Declaring Class */
    _slot65: [Slot; 1],
    /*   66: Get Method Modifiers */
    pub GetMethodModifiers: Option<JvmtiGetMethodModifiersFn>,
    /*   67-69: Clear All Frame Pops, Get Max Locals, Get Arguments Size */
    _slot67: [Slot; 3],
    /*   70: Get Line Number Table */
    pub GetLineNumberTable: Option<JvmtiGetLineNumberTableFn>,
    /*   71: Get Method Location */
    _slot71: [Slot; 1],
    /*   72: Get Local Variable Table */
    pub GetLocalVariableTable: Option<JvmtiGetLocalVariableTableFn>,
    /*   73-88: native prefixes, bytecodes, loaded classes, redefinition */
    _slot73: [Slot; 16],
    /*   89: Get Capabilities */
    pub GetCapabilities: Option<JvmtiGetCapabilitiesFn>,
    /*   90-127: monitors, timers, system properties, phase */
    _slot90: [Slot; 38],
    /*   128: Get Error Name */
    pub GetErrorName: Option<JvmtiGetErrorNameFn>,
    /*   129-139: JLocation format, properties, thread info */
    _slot129: [Slot; 11],
    /*   140: Get Potential Capabilities */
    pub GetPotentialCapabilities: Option<JvmtiGetPotentialCapabilitiesFn>,
    /*   141: RESERVED */
    _slot141: [Slot; 1],
    /*   142: Add Capabilities */
    pub AddCapabilities: Option<JvmtiAddCapabilitiesFn>,
}

#[repr(C)]
pub struct jvmtiEnv {
    pub functions: *const jvmtiInterface_1_,
}

const _: () = {
    use std::mem::{offset_of, size_of};
    let slot = size_of::<Slot>();
    assert!(offset_of!(jvmtiInterface_1_, Deallocate) == 46 * slot);
    assert!(offset_of!(jvmtiInterface_1_, GetClassMethods) == 51 * slot);
    assert!(offset_of!(jvmtiInterface_1_, GetMethodModifiers) == 65 * slot);
    assert!(offset_of!(jvmtiInterface_1_, GetLocalVariableTable) == 71 * slot);
    assert!(offset_of!(jvmtiInterface_1_, GetCapabilities) == 88 * slot);
    assert!(offset_of!(jvmtiInterface_1_, GetErrorName) == 127 * slot);
    assert!(offset_of!(jvmtiInterface_1_, AddCapabilities) == 141 * slot);
    assert!(size_of::<jvmtiCapabilities>() == 16);
};
