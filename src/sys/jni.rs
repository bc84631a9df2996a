// lambda-location/src/sys/jni.rs
//
// Raw JNI bindings for the slice of the JNI function table this library calls.
//
// The function tables are declared at full width up to the last slot we use.
// Slots we never call are opaque padding, so every named field still sits at
// the offset jni.h gives it (slot numbers are noted next to each field).

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::c_void;
use std::os::raw::c_char;

// =============================================================================
// Primitive Types
// =============================================================================

pub type jint = i32;
pub type jlong = i64;
pub type jbyte = i8;
pub type jboolean = u8;
pub type jchar = u16;
pub type jshort = i16;
pub type jfloat = f32;
pub type jdouble = f64;
pub type jsize = jint;

// =============================================================================
// Reference Types (opaque pointers)
// =============================================================================

pub type jobject = *mut c_void;
pub type jclass = jobject;
pub type jstring = jobject;
pub type jthrowable = jobject;

pub type jmethodID = *mut c_void;

// =============================================================================
// jvalue Union
// =============================================================================

#[repr(C)]
#[derive(Copy, Clone)]
pub union jvalue {
    pub z: jboolean,
    pub b: jbyte,
    pub c: jchar,
    pub s: jshort,
    pub i: jint,
    pub j: jlong,
    pub f: jfloat,
    pub d: jdouble,
    pub l: jobject,
}

// =============================================================================
// Constants
// =============================================================================

pub const JNI_OK: jint = 0;
pub const JNI_ERR: jint = -1;
pub const JNI_EDETACHED: jint = -2;
pub const JNI_EVERSION: jint = -3;

pub const JNI_TRUE: jboolean = 1;
pub const JNI_FALSE: jboolean = 0;

pub const JNI_VERSION_1_2: jint = 0x00010002;
pub const JNI_VERSION_1_6: jint = 0x00010006;

/// Unused function-table slot.
type Slot = *mut c_void;

// =============================================================================
// JNINativeInterface_ - The JNI function table (vtable)
// =============================================================================

#[repr(C)]
pub struct JNINativeInterface_ {
    // 0-3
    pub reserved: [Slot; 4],

    // 4
    pub GetVersion: unsafe extern "system" fn(env: *mut JNIEnv) -> jint,
    // 5: DefineClass
    _slot5: [Slot; 1],
    // 6
    pub FindClass: unsafe extern "system" fn(env: *mut JNIEnv, name: *const c_char) -> jclass,
    // 7-15: reflection, hierarchy, Throw/ThrowNew, ExceptionOccurred
    _slot7: [Slot; 9],
    // 16-17
    pub ExceptionDescribe: unsafe extern "system" fn(env: *mut JNIEnv),
    pub ExceptionClear: unsafe extern "system" fn(env: *mut JNIEnv),
    // 18-20: FatalError, Push/PopLocalFrame
    _slot18: [Slot; 3],

    // 21-23
    pub NewGlobalRef: unsafe extern "system" fn(env: *mut JNIEnv, lobj: jobject) -> jobject,
    pub DeleteGlobalRef: unsafe extern "system" fn(env: *mut JNIEnv, gref: jobject),
    pub DeleteLocalRef: unsafe extern "system" fn(env: *mut JNIEnv, obj: jobject),
    // 24-29: IsSameObject .. NewObjectV
    _slot24: [Slot; 6],

    // 30
    pub NewObjectA: unsafe extern "system" fn(
        env: *mut JNIEnv,
        clazz: jclass,
        methodID: jmethodID,
        args: *const jvalue,
    ) -> jobject,
    // 31-32: GetObjectClass, IsInstanceOf
    _slot31: [Slot; 2],
    // 33
    pub GetMethodID: unsafe extern "system" fn(
        env: *mut JNIEnv,
        clazz: jclass,
        name: *const c_char,
        sig: *const c_char,
    ) -> jmethodID,

    // 34-166: Call*/field/static accessors, NewString .. GetStringChars
    _slot34: [Slot; 133],
    // 167
    pub NewStringUTF: unsafe extern "system" fn(env: *mut JNIEnv, utf: *const c_char) -> jstring,

    // 168-218: string/array accessors, RegisterNatives, monitors
    _slot168: [Slot; 51],
    // 219
    pub GetJavaVM: unsafe extern "system" fn(env: *mut JNIEnv, vm: *mut *mut JavaVM) -> jint,

    // 220-227: regions, critical sections, weak refs
    _slot220: [Slot; 8],
    // 228
    pub ExceptionCheck: unsafe extern "system" fn(env: *mut JNIEnv) -> jboolean,
}

/// JNIEnv is directly the vtable pointer (C ABI definition)
pub type JNIEnv = *const JNINativeInterface_;

// =============================================================================
// JNIInvokeInterface_ - The JavaVM function table
// =============================================================================

#[repr(C)]
pub struct JNIInvokeInterface_ {
    pub reserved: [Slot; 3],

    // 3-5: DestroyJavaVM, AttachCurrentThread, DetachCurrentThread
    _slot3: [Slot; 3],
    // 6
    pub GetEnv:
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, version: jint) -> jint,
}

/// JavaVM is directly the vtable pointer (C ABI definition)
pub type JavaVM = *const JNIInvokeInterface_;

const _: () = {
    use std::mem::{offset_of, size_of};
    let slot = size_of::<Slot>();
    assert!(offset_of!(JNINativeInterface_, FindClass) == 6 * slot);
    assert!(offset_of!(JNINativeInterface_, NewGlobalRef) == 21 * slot);
    assert!(offset_of!(JNINativeInterface_, NewObjectA) == 30 * slot);
    assert!(offset_of!(JNINativeInterface_, GetMethodID) == 33 * slot);
    assert!(offset_of!(JNINativeInterface_, NewStringUTF) == 167 * slot);
    assert!(offset_of!(JNINativeInterface_, GetJavaVM) == 219 * slot);
    assert!(offset_of!(JNINativeInterface_, ExceptionCheck) == 228 * slot);
    assert!(offset_of!(JNIInvokeInterface_, GetEnv) == 6 * slot);
};
