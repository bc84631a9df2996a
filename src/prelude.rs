//! Common imports for resolving lambda locations.
//!
//! This prelude is intentionally small: the resolver, the introspection seam
//! and the environment wrappers.

pub use crate::classfile::ClassFileIntrospector;
pub use crate::env::{JniEnv, Jvmti, LocalRef};
pub use crate::error::{IntrospectError, ResolveError};
pub use crate::introspect::{ClassIntrospector, LineEntry, LocalVariable};
pub use crate::resolve::{resolve, ResolvedLocation, Resolver};
pub use crate::sys::{jni, jvmti};
