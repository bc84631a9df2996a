//! Safe wrapper around the JNI environment.
//!
//! Only the handful of calls the resolve entry point makes: class and
//! constructor lookup, object construction, reference management and
//! exception state.
//!
//! # Example
//!
//! ```rust,ignore
//! let env = unsafe { JniEnv::from_raw(raw_env) };
//! let cls = LocalRef::new(&env, env.find_class("java/lang/String")?);
//! if env.exception_check() {
//!     env.exception_clear();
//! }
//! ```

use crate::mutf8;
use crate::sys::jni;
use std::ffi::CString;
use std::ptr;

/// The calling thread's `JNIEnv*`.
///
/// Not `Send`: a JNI environment belongs to the thread the VM handed it to.
pub struct JniEnv {
    env: *mut jni::JNIEnv,
}

impl JniEnv {
    /// # Safety
    ///
    /// `env` must be the live `JNIEnv*` of the calling thread.
    pub unsafe fn from_raw(env: *mut jni::JNIEnv) -> Self {
        JniEnv { env }
    }

    pub fn raw(&self) -> *mut jni::JNIEnv {
        self.env
    }

    /// The VM this environment belongs to.
    pub fn get_java_vm(&self) -> Option<*mut jni::JavaVM> {
        let mut vm: *mut jni::JavaVM = ptr::null_mut();
        unsafe {
            let vtable = *self.env;
            let res = ((*vtable).GetJavaVM)(self.env, &mut vm);
            if res != jni::JNI_OK || vm.is_null() { None } else { Some(vm) }
        }
    }

    // =========================================================================
    // Classes & Methods
    // =========================================================================

    /// Finds a class by its internal name (e.g., "java/lang/String").
    ///
    /// A failed lookup leaves `NoClassDefFoundError` pending.
    pub fn find_class(&self, name: &str) -> Option<jni::jclass> {
        let c_name = CString::new(name).ok()?;
        unsafe {
            let vtable = *self.env;
            let cls = ((*vtable).FindClass)(self.env, c_name.as_ptr());
            if cls.is_null() { None } else { Some(cls) }
        }
    }

    /// Gets the method ID for an instance method or constructor.
    ///
    /// A failed lookup leaves `NoSuchMethodError` pending.
    pub fn get_method_id(&self, cls: jni::jclass, name: &str, sig: &str) -> Option<jni::jmethodID> {
        let c_name = CString::new(name).ok()?;
        let c_sig = CString::new(sig).ok()?;
        unsafe {
            let vtable = *self.env;
            let mid = ((*vtable).GetMethodID)(self.env, cls, c_name.as_ptr(), c_sig.as_ptr());
            if mid.is_null() { None } else { Some(mid) }
        }
    }

    // =========================================================================
    // Objects & Strings
    // =========================================================================

    /// `NewObjectA`; `args` in constructor parameter order. `None` if the
    /// constructor threw.
    pub fn new_object(&self, cls: jni::jclass, method_id: jni::jmethodID, args: &[jni::jvalue]) -> Option<jni::jobject> {
        unsafe {
            let vtable = *self.env;
            let obj = ((*vtable).NewObjectA)(self.env, cls, method_id, args.as_ptr());
            if obj.is_null() { None } else { Some(obj) }
        }
    }

    /// Java string with the contents of `s`, passed to the VM as modified
    /// UTF-8 so NULs and supplementary characters survive.
    pub fn new_string_utf(&self, s: &str) -> Option<jni::jstring> {
        let c_str = CString::new(mutf8::encode(s)).ok()?;
        unsafe {
            let vtable = *self.env;
            let jstr = ((*vtable).NewStringUTF)(self.env, c_str.as_ptr());
            if jstr.is_null() { None } else { Some(jstr) }
        }
    }

    // =========================================================================
    // References
    // =========================================================================

    /// Creates a new global reference. Returns `None` when the VM is out of memory.
    pub fn new_global_ref(&self, obj: jni::jobject) -> Option<jni::jobject> {
        unsafe {
            let vtable = *self.env;
            let global = ((*vtable).NewGlobalRef)(self.env, obj);
            if global.is_null() { None } else { Some(global) }
        }
    }

    pub fn delete_local_ref(&self, obj: jni::jobject) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).DeleteLocalRef)(self.env, obj);
        }
    }

    // =========================================================================
    // Exceptions
    // =========================================================================

    pub fn exception_check(&self) -> bool {
        unsafe {
            let vtable = *self.env;
            ((*vtable).ExceptionCheck)(self.env) != jni::JNI_FALSE
        }
    }

    pub fn exception_clear(&self) {
        unsafe {
            let vtable = *self.env;
            ((*vtable).ExceptionClear)(self.env);
        }
    }

    /// Clears a pending exception, reporting whether there was one.
    pub fn clear_pending_exception(&self) -> bool {
        let pending = self.exception_check();
        if pending {
            self.exception_clear();
        }
        pending
    }
}

/// Local reference deleted on drop, for references made outside a native
/// frame's automatic cleanup (long loops, cached lookups).
pub struct LocalRef<'a> {
    env: &'a JniEnv,
    obj: jni::jobject,
}

impl<'a> LocalRef<'a> {
    pub fn new(env: &'a JniEnv, obj: jni::jobject) -> Self {
        LocalRef { env, obj }
    }

    pub fn get(&self) -> jni::jobject {
        self.obj
    }

    /// Hands the reference to the caller without deleting it.
    pub fn into_inner(self) -> jni::jobject {
        let obj = self.obj;
        std::mem::forget(self);
        obj
    }
}

impl<'a> Drop for LocalRef<'a> {
    fn drop(&mut self) {
        if !self.obj.is_null() {
            self.env.delete_local_ref(self.obj);
        }
    }
}
