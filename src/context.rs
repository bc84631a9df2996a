use std::ptr;
use std::sync::OnceLock;

use crate::binding::ResultBinder;
use crate::capability::CapabilityProvider;
use crate::config::{self, AgentOptions};
use crate::error::ResolveError;
use crate::jni_wrapper::JniEnv;
use crate::resolve::resolve;
use crate::sys::jni;

/// Everything a resolve call shares with other calls: the negotiated JVMTI
/// environment and the bound result type.
#[derive(Debug)]
pub struct ResolverContext {
    capability: CapabilityProvider,
    binder: ResultBinder,
    entry_method: String,
}

impl ResolverContext {
    pub fn new(options: &AgentOptions) -> Self {
        Self {
            capability: CapabilityProvider::new(),
            binder: ResultBinder::new(options.result_class.clone()),
            entry_method: options.entry_method.clone(),
        }
    }

    pub fn capability(&self) -> &CapabilityProvider {
        &self.capability
    }

    pub fn binder(&self) -> &ResultBinder {
        &self.binder
    }

    /// Resolve `class` and wrap the answer in a new result object (a local
    /// reference owned by the caller).
    pub fn resolve_class(&self, env: &JniEnv, class: jni::jclass) -> Result<jni::jobject, ResolveError> {
        let vm = env.get_java_vm().unwrap_or(ptr::null_mut());
        let jvmti = self.capability.acquire(vm).ok_or(ResolveError::CapabilityUnavailable)?;
        let binding = self.binder.bind(env).ok_or(ResolveError::BindingUnavailable)?;

        let location = resolve(jvmti, class, &self.entry_method)?;

        binding.construct(env, &location).ok_or(ResolveError::ResultConstruction)
    }
}

static CONTEXT: OnceLock<ResolverContext> = OnceLock::new();

/// The process-wide context, built from [`config::current`] on first use.
pub fn global() -> &'static ResolverContext {
    CONTEXT.get_or_init(|| ResolverContext::new(config::current()))
}
