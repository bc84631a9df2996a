//! The Java result type and how to build it.

use tracing::{debug, warn};

use crate::cache::{Sticky, StickyState};
use crate::config::RESULT_CONSTRUCTOR_SIG;
use crate::jni_wrapper::{JniEnv, LocalRef};
use crate::resolve::ResolvedLocation;
use crate::sys::jni;

/// Global reference to the result class and its `(String, int, int)`
/// constructor.
///
/// The global reference is never deleted; it lives as long as the library.
#[derive(Debug)]
pub struct ResultBinding {
    class: jni::jclass,
    ctor: jni::jmethodID,
}

// Global references and method IDs are valid on every thread.
unsafe impl Send for ResultBinding {}
unsafe impl Sync for ResultBinding {}

impl ResultBinding {
    pub fn class(&self) -> jni::jclass {
        self.class
    }

    /// New result object as a local reference.
    pub fn construct(&self, env: &JniEnv, location: &ResolvedLocation) -> Option<jni::jobject> {
        let file_name = LocalRef::new(env, env.new_string_utf(&location.source_file)?);
        let args = [
            jni::jvalue { l: file_name.get() },
            jni::jvalue { i: location.start_line },
            jni::jvalue { i: location.end_line },
        ];

        let obj = env.new_object(self.class, self.ctor, &args);
        if obj.is_none() {
            env.clear_pending_exception();
        }
        obj
    }
}

/// Resolves the result class on first use and remembers the outcome.
#[derive(Debug)]
pub struct ResultBinder {
    class_name: String,
    binding: Sticky<ResultBinding>,
}

impl ResultBinder {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self { class_name: class_name.into(), binding: Sticky::new() }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn bind(&self, env: &JniEnv) -> Option<&ResultBinding> {
        self.binding.get_or_init(|| lookup(env, &self.class_name))
    }

    pub fn state(&self) -> StickyState {
        self.binding.state()
    }
}

fn lookup(env: &JniEnv, class_name: &str) -> Option<ResultBinding> {
    let Some(local) = env.find_class(class_name) else {
        env.clear_pending_exception();
        warn!(target: "lambda_location", class = class_name, "result class not found");
        return None;
    };
    let local = LocalRef::new(env, local);

    let Some(ctor) = env.get_method_id(local.get(), "<init>", RESULT_CONSTRUCTOR_SIG) else {
        env.clear_pending_exception();
        warn!(
            target: "lambda_location",
            class = class_name,
            signature = RESULT_CONSTRUCTOR_SIG,
            "result constructor not found"
        );
        return None;
    };

    let Some(class) = env.new_global_ref(local.get()) else {
        env.clear_pending_exception();
        warn!(target: "lambda_location", class = class_name, "NewGlobalRef failed");
        return None;
    };

    debug!(target: "lambda_location", class = class_name, "result type bound");
    Some(ResultBinding { class, ctor })
}
