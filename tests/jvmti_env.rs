use std::cell::{Cell, RefCell};
use std::ffi::{c_char, c_uchar, c_void, CString};
use std::mem::MaybeUninit;
use std::ptr;

use lambda_location::cache::StickyState;
use lambda_location::capability::CapabilityProvider;
use lambda_location::env::Jvmti;
use lambda_location::error::{IntrospectError, ResolveError};
use lambda_location::native::Agent_OnLoad;
use lambda_location::sys::jni::{self, jclass, jint, jmethodID, JNIInvokeInterface_, JavaVM};
use lambda_location::sys::jvmti::{
    jvmtiCapabilities, jvmtiEnv, jvmtiError, jvmtiInterface_1_, jvmtiLineNumberEntry,
    jvmtiLocalVariableEntry,
};
use lambda_location::{ResolvedLocation, Resolver};

// =============================================================================
// Fake VM
//
// State is per thread, so each test sees its own VM.
// =============================================================================

thread_local! {
    static GET_ENV_STATUS: Cell<jint> = const { Cell::new(jni::JNI_OK) };
    static GET_ENV_CALLS: Cell<usize> = const { Cell::new(0) };
    static ENV: Cell<*mut jvmtiEnv> = const { Cell::new(ptr::null_mut()) };
    static GRANT_LINE_NUMBERS: Cell<bool> = const { Cell::new(true) };
    static ADDED: Cell<Option<jvmtiCapabilities>> = const { Cell::new(None) };
    static LVT_STATUS: Cell<jvmtiError> = const { Cell::new(jvmtiError::NONE) };
    static ALLOCATED: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
    static FREED: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

const LAMBDA_CLASS: usize = 0x1000;
const INIT: usize = 1;
const BRIDGE_INVOKE: usize = 2;
const INVOKE: usize = 3;

fn alloc_str(s: &str) -> *mut c_char {
    let p = CString::new(s).unwrap().into_raw();
    ALLOCATED.with(|a| a.borrow_mut().push(p as usize));
    p
}

fn alloc_slice<T>(items: Vec<T>) -> *mut T {
    let p = Box::into_raw(items.into_boxed_slice()) as *mut T;
    ALLOCATED.with(|a| a.borrow_mut().push(p as usize));
    p
}

fn assert_all_released() {
    let mut allocated = ALLOCATED.with(|a| a.borrow().clone());
    let mut freed = FREED.with(|f| f.borrow().clone());
    allocated.sort_unstable();
    freed.sort_unstable();
    assert!(!allocated.is_empty());
    assert_eq!(allocated, freed);
}

unsafe extern "system" fn get_env(_vm: *mut JavaVM, penv: *mut *mut c_void, version: jint) -> jint {
    GET_ENV_CALLS.with(|c| c.set(c.get() + 1));
    assert_eq!(version, lambda_location::sys::jvmti::JVMTI_VERSION_1_2);
    let status = GET_ENV_STATUS.with(Cell::get);
    if status == jni::JNI_OK {
        *penv = ENV.with(Cell::get) as *mut c_void;
    }
    status
}

unsafe extern "system" fn get_potential_capabilities(_env: *mut jvmtiEnv, caps: *mut jvmtiCapabilities) -> jvmtiError {
    let mut potential = jvmtiCapabilities::default();
    potential.set_can_get_source_file_name(true);
    potential.set_can_get_line_numbers(GRANT_LINE_NUMBERS.with(Cell::get));
    potential.set_can_access_local_variables(true);
    *caps = potential;
    jvmtiError::NONE
}

unsafe extern "system" fn add_capabilities(_env: *mut jvmtiEnv, caps: *const jvmtiCapabilities) -> jvmtiError {
    ADDED.with(|a| a.set(Some(*caps)));
    jvmtiError::NONE
}

unsafe extern "system" fn get_capabilities(_env: *mut jvmtiEnv, caps: *mut jvmtiCapabilities) -> jvmtiError {
    *caps = ADDED.with(Cell::get).unwrap_or_default();
    jvmtiError::NONE
}

unsafe extern "system" fn deallocate(_env: *mut jvmtiEnv, mem: *mut c_uchar) -> jvmtiError {
    FREED.with(|f| f.borrow_mut().push(mem as usize));
    jvmtiError::NONE
}

unsafe extern "system" fn get_class_methods(
    _env: *mut jvmtiEnv,
    klass: jclass,
    count: *mut jint,
    methods: *mut *mut jmethodID,
) -> jvmtiError {
    if klass as usize != LAMBDA_CLASS {
        return jvmtiError::INVALID_CLASS;
    }
    let ids: Vec<jmethodID> = [INIT, BRIDGE_INVOKE, INVOKE].iter().map(|&id| id as jmethodID).collect();
    *count = ids.len() as jint;
    *methods = alloc_slice(ids);
    jvmtiError::NONE
}

unsafe extern "system" fn get_method_modifiers(_env: *mut jvmtiEnv, method: jmethodID, modifiers: *mut jint) -> jvmtiError {
    *modifiers = match method as usize {
        INIT => 0x0001,
        BRIDGE_INVOKE => 0x1041,
        INVOKE => 0x0011,
        _ => return jvmtiError::INVALID_METHODID,
    };
    jvmtiError::NONE
}

unsafe extern "system" fn get_method_name(
    _env: *mut jvmtiEnv,
    method: jmethodID,
    name: *mut *mut c_char,
    signature: *mut *mut c_char,
    generic: *mut *mut c_char,
) -> jvmtiError {
    let method_name = match method as usize {
        INIT => "<init>",
        BRIDGE_INVOKE | INVOKE => "invoke",
        _ => return jvmtiError::INVALID_METHODID,
    };
    if !name.is_null() {
        *name = alloc_str(method_name);
    }
    if !signature.is_null() {
        *signature = alloc_str("()V");
    }
    if !generic.is_null() {
        *generic = ptr::null_mut();
    }
    jvmtiError::NONE
}

unsafe extern "system" fn get_local_variable_table(
    _env: *mut jvmtiEnv,
    method: jmethodID,
    count: *mut jint,
    table: *mut *mut jvmtiLocalVariableEntry,
) -> jvmtiError {
    assert_eq!(method as usize, INVOKE, "only the real invoke is inspected");
    let status = LVT_STATUS.with(Cell::get);
    if status != jvmtiError::NONE {
        return status;
    }
    let entry = |name: &str, start_location: i64, length: jint, slot: jint| jvmtiLocalVariableEntry {
        start_location,
        length,
        name: alloc_str(name),
        signature: alloc_str("I"),
        generic_signature: ptr::null_mut(),
        slot,
    };
    let entries = vec![entry("this", 0, 12, 0), entry("$i$f$helper", 4, 4, 1)];
    *count = entries.len() as jint;
    *table = alloc_slice(entries);
    jvmtiError::NONE
}

unsafe extern "system" fn get_line_number_table(
    _env: *mut jvmtiEnv,
    _method: jmethodID,
    count: *mut jint,
    table: *mut *mut jvmtiLineNumberEntry,
) -> jvmtiError {
    let rows: Vec<jvmtiLineNumberEntry> = [(0, 10), (4, 42), (8, 11)]
        .iter()
        .map(|&(start_location, line_number)| jvmtiLineNumberEntry { start_location, line_number })
        .collect();
    *count = rows.len() as jint;
    *table = alloc_slice(rows);
    jvmtiError::NONE
}

unsafe extern "system" fn get_source_file_name(_env: *mut jvmtiEnv, _klass: jclass, name: *mut *mut c_char) -> jvmtiError {
    *name = alloc_str("Main.kt");
    jvmtiError::NONE
}

/// A function table with only the capability calls filled in.
fn capability_table() -> jvmtiInterface_1_ {
    // Every JVMTI slot is an `Option` or opaque padding, so all-zero is a
    // table with nothing implemented.
    let mut table: jvmtiInterface_1_ = unsafe { MaybeUninit::zeroed().assume_init() };
    table.GetPotentialCapabilities = Some(get_potential_capabilities);
    table.AddCapabilities = Some(add_capabilities);
    table.GetCapabilities = Some(get_capabilities);
    table.Deallocate = Some(deallocate);
    table
}

fn full_table() -> jvmtiInterface_1_ {
    let mut table = capability_table();
    table.GetClassMethods = Some(get_class_methods);
    table.GetMethodModifiers = Some(get_method_modifiers);
    table.GetMethodName = Some(get_method_name);
    table.GetLocalVariableTable = Some(get_local_variable_table);
    table.GetLineNumberTable = Some(get_line_number_table);
    table.GetSourceFileName = Some(get_source_file_name);
    table
}

fn leak_env(table: jvmtiInterface_1_) -> *mut jvmtiEnv {
    let functions: &'static jvmtiInterface_1_ = Box::leak(Box::new(table));
    Box::into_raw(Box::new(jvmtiEnv { functions }))
}

fn fake_vm(table: jvmtiInterface_1_) -> *mut JavaVM {
    ENV.with(|e| e.set(leak_env(table)));

    let mut invoke = MaybeUninit::<JNIInvokeInterface_>::zeroed();
    // `GetEnv` is a non-nullable fn pointer; it must be set before the
    // table is treated as initialized.
    let invoke = unsafe {
        ptr::addr_of_mut!((*invoke.as_mut_ptr()).GetEnv).write(get_env);
        invoke.assume_init()
    };
    let invoke: &'static JNIInvokeInterface_ = Box::leak(Box::new(invoke));
    Box::into_raw(Box::new(invoke as *const JNIInvokeInterface_))
}

// =============================================================================
// Capability negotiation
// =============================================================================

#[test]
fn null_vm_is_unavailable() {
    let provider = CapabilityProvider::new();
    assert_eq!(provider.state(), StickyState::Uninitialized);

    assert!(provider.acquire(ptr::null_mut()).is_none());
    assert_eq!(provider.state(), StickyState::Unavailable);
}

#[test]
fn get_env_failure_is_remembered() {
    GET_ENV_STATUS.with(|s| s.set(jni::JNI_EVERSION));
    let vm = fake_vm(capability_table());
    let provider = CapabilityProvider::new();

    for _ in 0..3 {
        assert!(provider.acquire(vm).is_none());
    }
    assert_eq!(GET_ENV_CALLS.with(Cell::get), 1, "negotiation is attempted once");
    assert_eq!(provider.state(), StickyState::Unavailable);
    assert!(provider.get().is_none());
}

#[test]
fn missing_line_number_capability_is_unavailable() {
    GRANT_LINE_NUMBERS.with(|g| g.set(false));
    let vm = fake_vm(capability_table());
    let provider = CapabilityProvider::new();

    assert!(provider.acquire(vm).is_none());
    assert!(provider.acquire(vm).is_none());
    assert_eq!(GET_ENV_CALLS.with(Cell::get), 1);
    assert_eq!(provider.state(), StickyState::Unavailable);
}

#[test]
fn missing_capability_calls_are_unavailable() {
    let mut table = capability_table();
    table.GetPotentialCapabilities = None;
    let vm = fake_vm(table);

    assert!(CapabilityProvider::new().acquire(vm).is_none());
}

#[test]
fn negotiation_requests_all_potential_capabilities() {
    let vm = fake_vm(capability_table());
    let provider = CapabilityProvider::new();

    let first = provider.acquire(vm).expect("negotiated").raw();
    let second = provider.acquire(vm).expect("cached").raw();
    assert_eq!(first, second);
    assert_eq!(first, ENV.with(Cell::get));
    assert_eq!(GET_ENV_CALLS.with(Cell::get), 1);
    assert_eq!(provider.state(), StickyState::Ready);

    let added = ADDED.with(Cell::get).expect("AddCapabilities called");
    assert!(added.can_get_line_numbers());
    assert!(added.can_get_source_file_name());
    assert!(added.can_access_local_variables());
}

#[test]
fn agent_load_leaves_capabilities_for_the_live_phase() {
    let vm = fake_vm(capability_table());
    let options = CString::new("log=warn").unwrap();

    let status = unsafe { Agent_OnLoad(vm, options.as_ptr() as *mut c_char, ptr::null_mut()) };

    assert_eq!(status, jni::JNI_OK);
    assert_eq!(GET_ENV_CALLS.with(Cell::get), 0, "no environment is taken during OnLoad");
    assert!(ADDED.with(Cell::get).is_none(), "no capabilities are added during OnLoad");
}

#[test]
fn agent_load_rejects_options_that_are_not_utf8() {
    let vm = fake_vm(capability_table());
    let options: &[u8] = b"log=\xff\0";

    let status = unsafe { Agent_OnLoad(vm, options.as_ptr() as *mut c_char, ptr::null_mut()) };

    assert_eq!(status, jni::JNI_ERR);
    assert!(ADDED.with(Cell::get).is_none());
}

// =============================================================================
// Queries through a live environment
// =============================================================================

#[test]
fn resolves_through_jvmti_and_releases_every_buffer() {
    let jvmti = unsafe { Jvmti::from_raw(leak_env(full_table())) };

    {
        let location = Resolver::new(&jvmti).resolve(LAMBDA_CLASS as jclass);
        assert_eq!(
            location,
            Ok(ResolvedLocation { source_file: "Main.kt".to_string(), start_line: 10, end_line: 11 })
        );
    }

    // methods array, two names (the bridge is skipped on its modifiers),
    // the variable table plus two strings per row, the line table and the
    // source file name
    assert_eq!(ALLOCATED.with(|a| a.borrow().len()), 1 + 2 + 1 + 4 + 1 + 1);
    assert_all_released();
}

#[test]
fn absent_variable_table_aborts_and_releases() {
    LVT_STATUS.with(|s| s.set(jvmtiError::ABSENT_INFORMATION));
    let jvmti = unsafe { Jvmti::from_raw(leak_env(full_table())) };

    let err = Resolver::new(&jvmti).resolve(LAMBDA_CLASS as jclass).unwrap_err();
    assert_eq!(
        err,
        ResolveError::Introspection(IntrospectError::AbsentInformation { call: "GetLocalVariableTable" })
    );
    assert_all_released();
}

#[test]
fn unknown_class_is_an_invalid_handle() {
    let jvmti = unsafe { Jvmti::from_raw(leak_env(full_table())) };

    let err = Resolver::new(&jvmti).resolve(0x2000 as jclass).unwrap_err();
    assert_eq!(err, ResolveError::Introspection(IntrospectError::InvalidHandle { call: "GetClassMethods" }));
}

#[test]
fn missing_function_slot_is_not_available() {
    let jvmti = unsafe { Jvmti::from_raw(leak_env(capability_table())) };

    assert_eq!(
        jvmti.get_line_number_table(INVOKE as jmethodID).unwrap_err(),
        jvmtiError::NOT_AVAILABLE
    );
    // no GetErrorName slot: the built-in name is used
    assert_eq!(jvmti.get_error_name(jvmtiError::NOT_AVAILABLE), "JVMTI_ERROR_NOT_AVAILABLE (98)");
}

#[test]
fn line_table_is_read_in_place() {
    let jvmti = unsafe { Jvmti::from_raw(leak_env(full_table())) };

    let lines = jvmti.get_line_number_table(INVOKE as jmethodID).unwrap();
    let rows: Vec<(i64, i32)> = lines.iter().map(|l| (l.start_location, l.line_number)).collect();
    assert_eq!(rows, [(0, 10), (4, 42), (8, 11)]);
    drop(lines);
    assert_all_released();
}
