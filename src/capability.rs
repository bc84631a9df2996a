//! One-time JVMTI capability negotiation.

use tracing::{debug, warn};

use crate::cache::{Sticky, StickyState};
use crate::jvmti_wrapper::Jvmti;
use crate::sys::jni;

/// Lazily acquires a JVMTI environment that can read line number tables.
///
/// Negotiation happens on the first [`acquire`](Self::acquire) and its
/// outcome is kept for the life of the process; a VM that refused once is
/// never asked again.
#[derive(Debug, Default)]
pub struct CapabilityProvider {
    handle: Sticky<Jvmti>,
}

impl CapabilityProvider {
    pub const fn new() -> Self {
        Self { handle: Sticky::new() }
    }

    pub fn acquire(&self, vm: *mut jni::JavaVM) -> Option<&Jvmti> {
        self.handle.get_or_init(|| negotiate(vm))
    }

    /// The negotiated environment, if negotiation already succeeded.
    pub fn get(&self) -> Option<&Jvmti> {
        self.handle.get()
    }

    pub fn state(&self) -> StickyState {
        self.handle.state()
    }
}

/// Get an environment, ask for every potential capability and confirm that
/// line numbers are among those granted.
pub fn negotiate(vm: *mut jni::JavaVM) -> Option<Jvmti> {
    if vm.is_null() {
        warn!(target: "lambda_location", "no JavaVM available; line numbers disabled");
        return None;
    }

    let jvmti = match Jvmti::new(vm) {
        Ok(jvmti) => jvmti,
        Err(code) => {
            warn!(target: "lambda_location", code, "GetEnv(JVMTI_VERSION_1_2) failed");
            return None;
        }
    };

    let potential = match jvmti.get_potential_capabilities() {
        Ok(caps) => caps,
        Err(err) => {
            warn!(target: "lambda_location", error = %jvmti.get_error_name(err), "GetPotentialCapabilities failed");
            return None;
        }
    };

    if let Err(err) = jvmti.add_capabilities(&potential) {
        warn!(target: "lambda_location", error = %jvmti.get_error_name(err), "AddCapabilities failed");
        return None;
    }

    let granted = match jvmti.get_capabilities() {
        Ok(caps) => caps,
        Err(err) => {
            warn!(target: "lambda_location", error = %jvmti.get_error_name(err), "GetCapabilities failed");
            return None;
        }
    };

    if !granted.can_get_line_numbers() {
        warn!(target: "lambda_location", "VM does not grant can_get_line_numbers");
        return None;
    }

    debug!(
        target: "lambda_location",
        source_file_name = granted.can_get_source_file_name(),
        local_variables = granted.can_access_local_variables(),
        "JVMTI capabilities negotiated"
    );
    Some(jvmti)
}
