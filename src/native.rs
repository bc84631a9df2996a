//! Symbols exported to the VM.
//!
//! Nothing here lets a Rust panic unwind into the VM, and no Java exception
//! is left pending: every failure is logged and reported as `null` (or as a
//! JNI status code for the load hooks).

use std::ffi::{c_char, c_void, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use tracing::{debug, error, info, warn};

use crate::config::{self, AgentOptions};
use crate::context;
use crate::error::ResolveError;
use crate::jni_wrapper::JniEnv;
use crate::logging;
use crate::sys::jni;

/// `LambdaLocation.resolve(Class<?>)`: location of the lambda class, or `null`.
#[no_mangle]
pub unsafe extern "system" fn Java_androidx_compose_ui_inspection_inspector_LambdaLocation_resolve(
    env: *mut jni::JNIEnv,
    _caller: jni::jclass,
    lambda_class: jni::jclass,
) -> jni::jobject {
    if env.is_null() || lambda_class.is_null() {
        return ptr::null_mut();
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let env = JniEnv::from_raw(env);
        let result = context::global().resolve_class(&env, lambda_class);
        env.clear_pending_exception();
        result
    }));

    match outcome {
        Ok(Ok(location)) => location,
        Ok(Err(err @ ResolveError::NoResolvableMethod { .. })) => {
            debug!(target: "lambda_location", "{err}");
            ptr::null_mut()
        }
        Ok(Err(err)) => {
            warn!(target: "lambda_location", "lambda location unavailable: {err}");
            ptr::null_mut()
        }
        Err(_) => {
            error!(target: "lambda_location", "panic while resolving lambda location");
            ptr::null_mut()
        }
    }
}

/// Loaded through `System.loadLibrary`.
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: *mut jni::JavaVM, _reserved: *mut c_void) -> jni::jint {
    logging::init(None);
    debug!(target: "lambda_location", "library loaded");
    jni::JNI_VERSION_1_6
}

/// Loaded with `-agentpath`.
#[no_mangle]
pub unsafe extern "system" fn Agent_OnLoad(
    vm: *mut jni::JavaVM,
    options: *mut c_char,
    _reserved: *mut c_void,
) -> jni::jint {
    start_agent(vm, options, "Agent_OnLoad")
}

/// Loaded through dynamic attach.
#[no_mangle]
pub unsafe extern "system" fn Agent_OnAttach(
    vm: *mut jni::JavaVM,
    options: *mut c_char,
    _reserved: *mut c_void,
) -> jni::jint {
    start_agent(vm, options, "Agent_OnAttach")
}

#[no_mangle]
pub extern "system" fn Agent_OnUnload(_vm: *mut jni::JavaVM) {
    info!(target: "lambda_location", "agent unloaded");
}

unsafe fn start_agent(_vm: *mut jni::JavaVM, options: *mut c_char, hook: &'static str) -> jni::jint {
    let options_str = if options.is_null() {
        Ok("")
    } else {
        CStr::from_ptr(options).to_str()
    };

    let outcome = panic::catch_unwind(|| {
        let Ok(options_str) = options_str else {
            logging::init(None);
            error!(target: "lambda_location", hook, "agent options are not valid UTF-8");
            return jni::JNI_ERR;
        };
        let parsed = match AgentOptions::parse(options_str) {
            Ok(parsed) => parsed,
            Err(err) => {
                logging::init(None);
                error!(target: "lambda_location", hook, "invalid agent options: {err}");
                return jni::JNI_ERR;
            }
        };

        logging::init(parsed.log.as_deref());
        if !config::install(parsed) {
            warn!(target: "lambda_location", hook, "agent options already installed; ignoring");
        }

        // Capabilities are negotiated by the first resolve call, in the live
        // phase. During OnLoad the potential set also holds onload-only
        // capabilities (breakpoints, field watches, pop frame) that would be
        // kept from other agents for the life of the VM.
        info!(target: "lambda_location", hook, "agent started");
        jni::JNI_OK
    });

    outcome.unwrap_or(jni::JNI_ERR)
}
