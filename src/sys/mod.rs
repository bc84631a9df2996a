//! Raw `#[repr(C)]` JNI and JVMTI definitions.
//!
//! Everything here mirrors `jni.h` / `jvmti.h` and is only as wide as the
//! crate needs. Higher layers should go through [`crate::env`].

pub mod jni;
pub mod jvmti;
