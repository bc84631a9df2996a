//! Owning guards for memory handed out by JVMTI.
//!
//! Every JVMTI query that returns a table or string transfers ownership of a
//! VM allocation to the caller, which must give it back through
//! `Deallocate`. The guards here tie that release to `Drop`, so buffers are
//! returned exactly once on every exit path: normal return, `?` propagation,
//! and moving on to the next loop iteration.
//!
//! The [`Deallocator`] seam exists so the same guards can wrap memory that
//! did not come from a VM (tests count releases through it).

use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::os::raw::c_char;
use std::slice;

use crate::introspect::LocalVariable;
use crate::mutf8;
use crate::sys::jvmti::jvmtiLocalVariableEntry;

/// Returns memory to whoever allocated it.
pub trait Deallocator {
    /// # Safety
    /// `mem` must be non-null and have been allocated by this deallocator's
    /// allocator, and must not be used afterwards.
    unsafe fn deallocate(&self, mem: *mut u8);
}

impl<D: Deallocator + ?Sized> Deallocator for &D {
    unsafe fn deallocate(&self, mem: *mut u8) {
        (**self).deallocate(mem)
    }
}

// =============================================================================
// JvmtiBuf
// =============================================================================

/// One allocation viewed as `[T]`.
pub struct JvmtiBuf<T, D: Deallocator> {
    ptr: *mut T,
    len: usize,
    dealloc: D,
    _owns: PhantomData<T>,
}

impl<T, D: Deallocator> JvmtiBuf<T, D> {
    /// # Safety
    /// `ptr` must be null or point to `len` initialized `T`s allocated by
    /// `dealloc`'s allocator. Ownership moves into the guard.
    pub unsafe fn from_raw(ptr: *mut T, len: usize, dealloc: D) -> Self {
        Self { ptr, len, dealloc, _owns: PhantomData }
    }

    pub fn deallocator(&self) -> &D {
        &self.dealloc
    }
}

impl<T, D: Deallocator> Deref for JvmtiBuf<T, D> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        if self.ptr.is_null() || self.len == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.ptr, self.len) }
        }
    }
}

impl<T: fmt::Debug, D: Deallocator> fmt::Debug for JvmtiBuf<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, D: Deallocator> Drop for JvmtiBuf<T, D> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { self.dealloc.deallocate(self.ptr as *mut u8) };
        }
    }
}

// =============================================================================
// JvmtiString
// =============================================================================

/// A NUL-terminated modified UTF-8 string allocated by the VM.
pub struct JvmtiString<D: Deallocator> {
    ptr: *mut c_char,
    dealloc: D,
}

impl<D: Deallocator> JvmtiString<D> {
    /// # Safety
    /// `ptr` must be null or a NUL-terminated string allocated by
    /// `dealloc`'s allocator. Ownership moves into the guard.
    pub unsafe fn from_raw(ptr: *mut c_char, dealloc: D) -> Self {
        Self { ptr, dealloc }
    }

    pub fn as_bytes(&self) -> &[u8] {
        unsafe { c_bytes(self.ptr) }
    }

    /// Decoded from modified UTF-8; malformed input becomes U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        mutf8::decode(self.as_bytes())
    }
}

impl<D: Deallocator> AsRef<[u8]> for JvmtiString<D> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<D: Deallocator> fmt::Debug for JvmtiString<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl<D: Deallocator> Drop for JvmtiString<D> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { self.dealloc.deallocate(self.ptr as *mut u8) };
        }
    }
}

// =============================================================================
// LocalVariableTable
// =============================================================================

/// A row of a VM-owned local variable table.
#[repr(transparent)]
pub struct JvmtiLocalVariable(jvmtiLocalVariableEntry);

impl JvmtiLocalVariable {
    pub fn slot(&self) -> i32 {
        self.0.slot
    }

    pub fn signature(&self) -> &[u8] {
        unsafe { c_bytes(self.0.signature) }
    }
}

impl LocalVariable for JvmtiLocalVariable {
    fn name(&self) -> &[u8] {
        unsafe { c_bytes(self.0.name) }
    }

    fn start_location(&self) -> i64 {
        self.0.start_location
    }

    fn length(&self) -> i32 {
        self.0.length
    }
}

impl fmt::Debug for JvmtiLocalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JvmtiLocalVariable")
            .field("name", &mutf8::decode(self.name()))
            .field("start_location", &self.0.start_location)
            .field("length", &self.0.length)
            .field("slot", &self.0.slot)
            .finish()
    }
}

/// A local variable table together with the strings each row points at.
///
/// The strings are freed before the table itself.
pub struct LocalVariableTable<D: Deallocator> {
    entries: JvmtiBuf<JvmtiLocalVariable, D>,
}

impl<D: Deallocator> LocalVariableTable<D> {
    /// # Safety
    /// Same contract as [`JvmtiBuf::from_raw`]; additionally every non-null
    /// string pointer in the rows must be a separate allocation of the same
    /// allocator.
    pub unsafe fn from_raw(ptr: *mut jvmtiLocalVariableEntry, len: usize, dealloc: D) -> Self {
        Self { entries: JvmtiBuf::from_raw(ptr as *mut JvmtiLocalVariable, len, dealloc) }
    }
}

impl<D: Deallocator> Deref for LocalVariableTable<D> {
    type Target = [JvmtiLocalVariable];

    fn deref(&self) -> &[JvmtiLocalVariable] {
        &self.entries
    }
}

impl<D: Deallocator> Drop for LocalVariableTable<D> {
    fn drop(&mut self) {
        let dealloc = self.entries.deallocator();
        for entry in self.entries.iter() {
            for s in [entry.0.name, entry.0.signature, entry.0.generic_signature] {
                if !s.is_null() {
                    unsafe { dealloc.deallocate(s as *mut u8) };
                }
            }
        }
        // `entries` releases the table block when it drops after this.
    }
}

/// Bytes of a C string, without the terminator. Null reads as empty.
unsafe fn c_bytes<'a>(p: *const c_char) -> &'a [u8] {
    if p.is_null() {
        &[]
    } else {
        CStr::from_ptr(p).to_bytes()
    }
}
