// lambda-location/src/jvmti_wrapper.rs
use crate::buffer::{Deallocator, JvmtiBuf, JvmtiString, LocalVariableTable};
use crate::introspect::LineEntry;
use crate::sys::jni;
use crate::sys::jvmti;
use std::ptr;

/// A safe wrapper around the raw JVMTI Environment pointer.
///
/// Queries that hand back VM memory return guards from [`crate::buffer`]
/// borrowing this environment; the memory goes back through `Deallocate`
/// when they drop.
pub struct Jvmti {
    env: *mut jvmti::jvmtiEnv,
}

// A jvmtiEnv may be used from any thread.
unsafe impl Send for Jvmti {}
unsafe impl Sync for Jvmti {}

impl Jvmti {
    /// Connects to the JVM and retrieves a JVMTI 1.2 environment.
    pub fn new(vm: *mut jni::JavaVM) -> Result<Self, jni::jint> {
        let mut env_ptr: *mut std::ffi::c_void = ptr::null_mut();

        unsafe {
            // vm: *mut JavaVM = *mut *const JNIInvokeInterface_
            let get_env_fn = (**vm).GetEnv;
            let res = get_env_fn(vm, &mut env_ptr, jvmti::JVMTI_VERSION_1_2);

            if res != jni::JNI_OK {
                return Err(res);
            }
        }

        if env_ptr.is_null() {
            return Err(jni::JNI_ERR);
        }

        Ok(Jvmti {
            env: env_ptr as *mut jvmti::jvmtiEnv,
        })
    }

    /// Create a Jvmti wrapper from a raw jvmtiEnv pointer
    ///
    /// # Safety
    /// The caller must ensure the pointer is valid for the duration of use.
    pub unsafe fn from_raw(env: *mut jvmti::jvmtiEnv) -> Self {
        Jvmti { env }
    }

    /// Get the raw jvmtiEnv pointer
    pub fn raw(&self) -> *mut jvmti::jvmtiEnv {
        self.env
    }

    fn functions(&self) -> &jvmti::jvmtiInterface_1_ {
        unsafe { &*(*self.env).functions }
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    pub fn get_potential_capabilities(&self) -> Result<jvmti::jvmtiCapabilities, jvmti::jvmtiError> {
        let mut caps = jvmti::jvmtiCapabilities::default();
        let get_fn = self.functions().GetPotentialCapabilities.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        let err = unsafe { get_fn(self.env, &mut caps) };
        if err != jvmti::jvmtiError::NONE {
            return Err(err);
        }
        Ok(caps)
    }

    pub fn add_capabilities(&self, new_caps: &jvmti::jvmtiCapabilities) -> Result<(), jvmti::jvmtiError> {
        let add_fn = self.functions().AddCapabilities.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        let err = unsafe { add_fn(self.env, new_caps) };
        if err != jvmti::jvmtiError::NONE {
            return Err(err);
        }
        Ok(())
    }

    pub fn get_capabilities(&self) -> Result<jvmti::jvmtiCapabilities, jvmti::jvmtiError> {
        let mut caps = jvmti::jvmtiCapabilities::default();
        let get_fn = self.functions().GetCapabilities.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        let err = unsafe { get_fn(self.env, &mut caps) };
        if err != jvmti::jvmtiError::NONE {
            return Err(err);
        }
        Ok(caps)
    }

    // =========================================================================
    // Class & Method metadata
    // =========================================================================

    pub fn get_class_methods(&self, klass: jni::jclass) -> Result<JvmtiBuf<jni::jmethodID, &Self>, jvmti::jvmtiError> {
        let mut count: jni::jint = 0;
        let mut methods_ptr: *mut jni::jmethodID = ptr::null_mut();
        let get_fn = self.functions().GetClassMethods.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        unsafe {
            let err = get_fn(self.env, klass, &mut count, &mut methods_ptr);
            if err != jvmti::jvmtiError::NONE {
                return Err(err);
            }
            Ok(JvmtiBuf::from_raw(methods_ptr, count.max(0) as usize, self))
        }
    }

    pub fn get_method_modifiers(&self, method: jni::jmethodID) -> Result<jni::jint, jvmti::jvmtiError> {
        let mut modifiers: jni::jint = 0;
        let get_fn = self.functions().GetMethodModifiers.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        let err = unsafe { get_fn(self.env, method, &mut modifiers) };
        if err != jvmti::jvmtiError::NONE {
            return Err(err);
        }
        Ok(modifiers)
    }

    /// Method name only; signature and generic signature are not requested.
    pub fn get_method_name(&self, method: jni::jmethodID) -> Result<JvmtiString<&Self>, jvmti::jvmtiError> {
        let mut name_ptr: *mut std::os::raw::c_char = ptr::null_mut();
        let get_fn = self.functions().GetMethodName.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        unsafe {
            let err = get_fn(self.env, method, &mut name_ptr, ptr::null_mut(), ptr::null_mut());
            if err != jvmti::jvmtiError::NONE {
                return Err(err);
            }
            Ok(JvmtiString::from_raw(name_ptr, self))
        }
    }

    pub fn get_local_variable_table(&self, method: jni::jmethodID) -> Result<LocalVariableTable<&Self>, jvmti::jvmtiError> {
        let mut count: jni::jint = 0;
        let mut table_ptr: *mut jvmti::jvmtiLocalVariableEntry = ptr::null_mut();
        let get_fn = self.functions().GetLocalVariableTable.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        unsafe {
            let err = get_fn(self.env, method, &mut count, &mut table_ptr);
            if err != jvmti::jvmtiError::NONE {
                return Err(err);
            }
            Ok(LocalVariableTable::from_raw(table_ptr, count.max(0) as usize, self))
        }
    }

    /// The table is read in place as [`LineEntry`] rows.
    pub fn get_line_number_table(&self, method: jni::jmethodID) -> Result<JvmtiBuf<LineEntry, &Self>, jvmti::jvmtiError> {
        let mut count: jni::jint = 0;
        let mut table_ptr: *mut jvmti::jvmtiLineNumberEntry = ptr::null_mut();
        let get_fn = self.functions().GetLineNumberTable.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        unsafe {
            let err = get_fn(self.env, method, &mut count, &mut table_ptr);
            if err != jvmti::jvmtiError::NONE {
                return Err(err);
            }
            Ok(JvmtiBuf::from_raw(table_ptr as *mut LineEntry, count.max(0) as usize, self))
        }
    }

    pub fn get_source_file_name(&self, klass: jni::jclass) -> Result<JvmtiString<&Self>, jvmti::jvmtiError> {
        let mut name_ptr: *mut std::os::raw::c_char = ptr::null_mut();
        let get_fn = self.functions().GetSourceFileName.ok_or(jvmti::jvmtiError::NOT_AVAILABLE)?;

        unsafe {
            let err = get_fn(self.env, klass, &mut name_ptr);
            if err != jvmti::jvmtiError::NONE {
                return Err(err);
            }
            Ok(JvmtiString::from_raw(name_ptr, self))
        }
    }

    // =========================================================================
    // Misc
    // =========================================================================

    /// The VM's name for `error`, falling back to the built-in table.
    pub fn get_error_name(&self, error: jvmti::jvmtiError) -> String {
        let Some(get_fn) = self.functions().GetErrorName else {
            return error.to_string();
        };
        let mut name_ptr: *mut std::os::raw::c_char = ptr::null_mut();

        unsafe {
            if get_fn(self.env, error, &mut name_ptr) != jvmti::jvmtiError::NONE {
                return error.to_string();
            }
            JvmtiString::from_raw(name_ptr, self).to_string_lossy()
        }
    }
}

impl std::fmt::Debug for Jvmti {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Jvmti").field(&self.raw()).finish()
    }
}

impl Deallocator for Jvmti {
    unsafe fn deallocate(&self, mem: *mut u8) {
        if let Some(dealloc_fn) = self.functions().Deallocate {
            dealloc_fn(self.env, mem);
        }
    }
}

const _: () = {
    use std::mem::{align_of, size_of};
    assert!(size_of::<LineEntry>() == size_of::<jvmti::jvmtiLineNumberEntry>());
    assert!(align_of::<LineEntry>() == align_of::<jvmti::jvmtiLineNumberEntry>());
};
